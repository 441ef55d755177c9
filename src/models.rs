//! Core data models used throughout the storefront data layer.
//!
//! These types represent the product records returned by the backend, the
//! ranked summaries derived from them, and the load state exposed to the
//! presentation layer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::ShapeError;

/// A product listed on the marketplace, as decoded from the backend.
///
/// Records are not schema-checked: missing fields fall back to empty values,
/// an `id` sent as a JSON number is stringified, and a price sent as display
/// text (`"$180"`) is parsed, defaulting to 0 when it cannot be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, alias = "image")]
    pub image_url: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

/// The vendor account that owns a product, when the backend embeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub business_name: Option<String>,
}

impl ProductRecord {
    /// Display vendor: the `vendor` field, falling back to the owner's business name.
    pub fn vendor_name(&self) -> Option<&str> {
        non_blank(self.vendor.as_deref()).or_else(|| {
            self.owner
                .as_ref()
                .and_then(|o| non_blank(o.business_name.as_deref()))
        })
    }

    /// Value of `field` used for grouping, or `None` when the record has no
    /// usable value (missing, null, or whitespace only).
    pub fn field_value(&self, field: SummaryField) -> Option<&str> {
        match field {
            SummaryField::Material => non_blank(self.material.as_deref()),
            SummaryField::Category => non_blank(Some(self.category.as_str())),
            SummaryField::Vendor => self.vendor_name(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Record field a summary is ranked over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryField {
    #[default]
    Material,
    Category,
    Vendor,
}

impl SummaryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryField::Material => "material",
            SummaryField::Category => "category",
            SummaryField::Vendor => "vendor",
        }
    }
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "material" => Ok(SummaryField::Material),
            "category" => Ok(SummaryField::Category),
            "vendor" => Ok(SummaryField::Vendor),
            other => anyhow::bail!(
                "Unknown summary field: '{}'. Must be material, category, or vendor.",
                other
            ),
        }
    }
}

/// One ranked entry of a frequency summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialSummary {
    pub name: String,
    pub count: u64,
    pub description: String,
}

/// Load status of an asynchronous fetch, as seen by the presentation layer.
///
/// Within one activation the state only moves forward
/// (`Pending` → `Ready` or `Pending` → `Failed`); a new activation resets it
/// to `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "payload", rename_all = "lowercase")]
pub enum LoadState<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Failure reason, if the load failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            LoadState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short label used in CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Pending
    }
}

/// Decode the product collection payload.
///
/// The backend answers either with a bare JSON array or with an object that
/// wraps the array under `data`. Anything else is a [`ShapeError`]. Elements
/// that are not product objects at all are skipped with a warning; the rest
/// of the collection is kept.
pub fn decode_collection(payload: Value) -> Result<Vec<ProductRecord>, ShapeError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => return Err(ShapeError::UnexpectedShape(json_kind(&other))),
            None => return Err(ShapeError::MissingData),
        },
        other => return Err(ShapeError::UnexpectedShape(json_kind(&other))),
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed product record");
                None
            }
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(serde_json::Number),
}

/// Accept identifiers sent either as JSON strings or JSON numbers. `null`
/// becomes the empty string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Text(s)) => s,
        Some(IdRepr::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match Option::<PriceRepr>::deserialize(deserializer)? {
        Some(PriceRepr::Number(n)) => n,
        Some(PriceRepr::Text(text)) => parse_price(&text).unwrap_or(0.0),
        None => 0.0,
    };
    Ok(if price.is_finite() && price >= 0.0 {
        price
    } else {
        0.0
    })
}

/// `"$1,250.50"` -> 1250.5
fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_array() {
        let records = decode_collection(json!([
            {"id": "a1", "name": "Carved Bowl", "price": 45.0, "material": "Mahogany"},
            {"id": 2, "name": "Coffee Table", "imageUrl": "/t.png"}
        ]))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].material.as_deref(), Some("Mahogany"));
        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].image_url, "/t.png");
        assert_eq!(records[1].material, None);
    }

    #[test]
    fn test_decode_wrapped_data_matches_bare_array() {
        let items = json!([{"id": "1", "material": "Oak"}, {"id": "2", "material": "Pine"}]);
        let bare = decode_collection(items.clone()).unwrap();
        let wrapped = decode_collection(json!({ "data": items, "total": 2 })).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            decode_collection(json!({"items": []})),
            Err(ShapeError::MissingData)
        ));
        assert!(matches!(
            decode_collection(json!({"data": "nope"})),
            Err(ShapeError::UnexpectedShape("a string"))
        ));
        assert!(matches!(
            decode_collection(json!(null)),
            Err(ShapeError::UnexpectedShape("null"))
        ));
    }

    #[test]
    fn test_decode_tolerates_sparse_records() {
        let records = decode_collection(json!([
            {"material": "Oak"},
            {"id": null, "name": "Table", "price": "$180"},
            {"id": "3", "price": "$1,250.50"},
            {"id": "4", "price": "call us"},
            {"id": "5", "price": -3}
        ]))
        .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].id, "");
        assert_eq!(records[0].material.as_deref(), Some("Oak"));
        assert_eq!(records[1].id, "");
        assert_eq!(records[1].price, 180.0);
        assert_eq!(records[2].price, 1250.5);
        assert_eq!(records[3].price, 0.0);
        assert_eq!(records[4].price, 0.0);
    }

    #[test]
    fn test_decode_skips_malformed_elements() {
        let records = decode_collection(json!([
            {"id": "1", "material": "Oak"},
            "not a product",
            {"id": "2", "price": {"amount": 5}},
            {"id": {"nested": true}},
            {"id": "3", "material": "Pine"}
        ]))
        .unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_image_alias() {
        let record: ProductRecord =
            serde_json::from_value(json!({"id": "1", "image": "/icon2.png"})).unwrap();
        assert_eq!(record.image_url, "/icon2.png");
    }

    #[test]
    fn test_vendor_falls_back_to_owner() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": "1",
            "vendor": "  ",
            "owner": {"businessName": "Addis Woodworks"}
        }))
        .unwrap();
        assert_eq!(record.vendor_name(), Some("Addis Woodworks"));
        assert_eq!(record.field_value(SummaryField::Vendor), Some("Addis Woodworks"));
    }

    #[test]
    fn test_blank_material_has_no_value() {
        let record: ProductRecord =
            serde_json::from_value(json!({"id": "1", "material": "   "})).unwrap();
        assert_eq!(record.field_value(SummaryField::Material), None);
        assert_eq!(record.field_value(SummaryField::Category), None);
    }

    #[test]
    fn test_summary_field_parse() {
        assert_eq!("Material".parse::<SummaryField>().unwrap(), SummaryField::Material);
        assert_eq!(" vendor ".parse::<SummaryField>().unwrap(), SummaryField::Vendor);
        assert!("colour".parse::<SummaryField>().is_err());
    }

    #[test]
    fn test_load_state_accessors() {
        let ready: LoadState<u32> = LoadState::Ready(3);
        assert_eq!(ready.ready(), Some(&3));
        assert_eq!(ready.label(), "ready");

        let failed: LoadState<u32> = LoadState::Failed("boom".to_string());
        assert_eq!(failed.failure(), Some("boom"));
        assert!(LoadState::<u32>::default().is_pending());
    }
}
