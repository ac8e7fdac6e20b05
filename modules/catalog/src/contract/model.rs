use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A live (not soft-deleted) catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub category_id: i64,
}

/// Partial update; `None` keeps the stored value.
///
/// `description` is tri-state: absent keeps it, `null` (`Some(None)`) clears it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub category_id: Option<i64>,
}

/// A field that is present maps to `Some`, even when its value is `null`.
fn present_or_null<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_description_is_tri_state() {
        let keep: ProductPatch = serde_json::from_str(r#"{"price": 2.0}"#).unwrap();
        assert_eq!(keep.description, None);
        assert_eq!(keep.price, Some(2.0));

        let clear: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(clear.description, Some(None));

        let set: ProductPatch = serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert_eq!(set.description, Some(Some("new".to_string())));

        let json = serde_json::to_value(&clear).unwrap();
        assert!(json["description"].is_null());
        assert!(json.as_object().unwrap().contains_key("description"));
        let json = serde_json::to_value(&keep).unwrap();
        assert!(!json.as_object().unwrap().contains_key("description"));
    }
}
