//! Remote data gateway: the only component that talks to the backend.
//!
//! Every request goes to `{base_url}{path}` with a default
//! `Content-Type: application/json` header, an optional bearer credential,
//! and the caller's own headers applied last (caller headers win on
//! conflict, compared case-insensitively).
//!
//! # Error Contract
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx, body parses as `T` | `Ok(T)` |
//! | 2xx, body does not parse | [`GatewayError::Decode`] |
//! | non-2xx | [`GatewayError::Status`] |
//! | send failed (DNS, refused, timeout) | [`GatewayError::Transport`] |
//!
//! The gateway never retries and keeps no state between calls; retry
//! policy belongs to the caller.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::catalog::ReferralCode;
use crate::config::ApiConfig;
use crate::dashboard::{DashboardStats, RecentActivity};
use crate::error::GatewayError;
use crate::models::ProductRecord;

/// Bearer token supplied by the surrounding application.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Per-request overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl Gateway {
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        credential: Option<Credential>,
    ) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.base_url,
            config.timeout(),
            config.token.clone().map(Credential::bearer),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Defaults first, then the caller's headers on top.
    pub(crate) fn merged_headers(
        &self,
        options: &RequestOptions,
    ) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(Credential(token)) = &self.credential {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GatewayError::InvalidRequest(format!("credential: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GatewayError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Issue one request and decode the JSON body as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        let headers = self.merged_headers(&options)?;

        let mut builder = self
            .client
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        debug!(method = %options.method, url = %url, "gateway request");
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), url = %url, "gateway request failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `GET /user/furniture`, undecoded (array or `{data: array}`).
    pub async fn fetch_furniture(&self) -> Result<Value, GatewayError> {
        self.request("/user/furniture", RequestOptions::get()).await
    }

    /// `GET /products/{id}`. A 404 is `Ok(None)`.
    pub async fn fetch_product(&self, id: &str) -> Result<Option<ProductRecord>, GatewayError> {
        let path = segment_path(&["products", id])?;
        match self.request(&path, RequestOptions::get()).await {
            Ok(product) => Ok(Some(product)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `POST /products/{id}/referral`.
    pub async fn create_referral(&self, product_id: &str) -> Result<ReferralCode, GatewayError> {
        let path = segment_path(&["products", product_id, "referral"])?;
        self.request(&path, RequestOptions::post()).await
    }

    pub async fn admin_stats(&self) -> Result<DashboardStats, GatewayError> {
        self.request("/admin/stats", RequestOptions::get()).await
    }

    pub async fn admin_activities(&self) -> Result<Vec<RecentActivity>, GatewayError> {
        self.request("/admin/activities", RequestOptions::get()).await
    }
}

/// Absolute path built from `segments`, each percent-encoded as a single
/// segment so an id containing `/`, `?` or `#` cannot change the route.
pub(crate) fn segment_path(segments: &[&str]) -> Result<String, GatewayError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| GatewayError::InvalidRequest(format!("path: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| GatewayError::InvalidRequest("path: base cannot hold segments".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}
