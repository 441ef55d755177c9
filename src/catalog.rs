//! Product sharing: referral codes, referral links, and social share links.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::warn;

use crate::gateway::Gateway;

/// Response of `POST /products/{id}/referral`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCode {
    pub code: String,
}

/// Share-intent URLs for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub facebook: String,
    pub twitter: String,
    pub instagram: String,
}

impl ShareLinks {
    pub fn for_product(product_name: &str, product_url: &str) -> Result<Self> {
        let facebook = Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", product_url)],
        )?;
        let twitter = Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("text", product_name), ("url", product_url)],
        )?;
        let instagram =
            Url::parse_with_params("https://www.instagram.com/share", &[("url", product_url)])?;

        Ok(Self {
            facebook: facebook.into(),
            twitter: twitter.into(),
            instagram: instagram.into(),
        })
    }
}

/// `product_url` with `ref=<code>` appended to its query.
pub fn referral_link(product_url: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(product_url)
        .with_context(|| format!("invalid product URL: {}", product_url))?;
    url.query_pairs_mut().append_pair("ref", code);
    Ok(url.into())
}

/// Referral state for one open share panel.
///
/// The code is requested lazily and at most once successfully; a failed
/// request is logged and retried on the next call.
pub struct ReferralSession {
    gateway: Gateway,
    product_id: String,
    product_url: String,
    code: OnceCell<String>,
}

impl ReferralSession {
    pub fn new(gateway: Gateway, product_id: &str, product_url: &str) -> Self {
        Self {
            gateway,
            product_id: product_id.to_string(),
            product_url: product_url.to_string(),
            code: OnceCell::new(),
        }
    }

    /// The code if one has been obtained already.
    pub fn code(&self) -> Option<&str> {
        self.code.get().map(String::as_str)
    }

    /// Request a code unless one is already held.
    pub async fn ensure_code(&self) -> Option<&str> {
        let result = self
            .code
            .get_or_try_init(|| async {
                self.gateway
                    .create_referral(&self.product_id)
                    .await
                    .map(|r| r.code)
            })
            .await;

        match result {
            Ok(code) => Some(code.as_str()),
            Err(e) => {
                warn!(product_id = %self.product_id, error = %e, "failed to generate referral code");
                None
            }
        }
    }

    /// Referral link, or `None` while no code is available.
    pub async fn referral_link(&self) -> Result<Option<String>> {
        match self.ensure_code().await {
            Some(code) => referral_link(&self.product_url, code).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_links_encode_params() {
        let links =
            ShareLinks::for_product("Carved Wooden Bowl", "https://shop.example/products/1")
                .unwrap();
        assert_eq!(
            links.facebook,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fshop.example%2Fproducts%2F1"
        );
        assert_eq!(
            links.twitter,
            "https://twitter.com/intent/tweet?text=Carved+Wooden+Bowl&url=https%3A%2F%2Fshop.example%2Fproducts%2F1"
        );
        assert!(links
            .instagram
            .starts_with("https://www.instagram.com/share?url=https%3A%2F%2F"));
    }

    #[test]
    fn test_referral_link() {
        assert_eq!(
            referral_link("https://shop.example/products/7", "AB12").unwrap(),
            "https://shop.example/products/7?ref=AB12"
        );
        assert_eq!(
            referral_link("https://shop.example/products/7?color=dark", "AB12").unwrap(),
            "https://shop.example/products/7?color=dark&ref=AB12"
        );
        assert!(referral_link("not a url", "AB12").is_err());
    }
}
