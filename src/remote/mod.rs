//! Remote collection access.
//!
//! Each entity screen talks to one REST collection through a
//! [`CollectionClient`]. Every call is a single request/response round trip:
//! no caching, no retries.

pub mod auth;
pub mod error;
pub mod http;
pub mod memory;

use std::future::Future;

use serde_json::Value;

use crate::error::{AdminError, Result};
use crate::types::{FieldMap, Record, RecordId, RecordStatus};

pub use auth::{AuthClient, LoginResponse};
pub use http::HttpCollectionClient;
pub use memory::InMemoryClient;

/// Common interface for one entity's REST collection
pub trait CollectionClient: Send + Sync {
    /// Fetch the full collection
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Create a record and return it as stored by the server
    fn create(&self, fields: &FieldMap) -> impl Future<Output = Result<Record>> + Send;

    /// Replace a record's editable fields
    fn update(
        &self,
        id: &RecordId,
        fields: &FieldMap,
    ) -> impl Future<Output = Result<Record>> + Send;

    /// Change a record's status
    fn set_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a record
    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<()>> + Send;
}

/// Normalise a list response into records.
///
/// Accepts `{"items": [...]}`, `{"data": [...]}` or a bare array. Entries
/// that are not valid records are skipped with a warning rather than failing
/// the whole list.
pub fn records_from_list(body: Value) -> Result<Vec<Record>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(AdminError::InvalidRecord(
                    "list response 'items' is not an array".to_string(),
                ));
            }
        },
        _ => {
            return Err(AdminError::InvalidRecord(
                "list response is neither an array nor an object".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match Record::from_json(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping malformed record in list response: {e}"),
        }
    }
    Ok(records)
}

/// Normalise a single-record response.
///
/// Accepts the record itself or a wrapper such as `{"data": {...}}`,
/// `{"item": {...}}`, `{"project": {...}}` or `{"blog": {...}}`.
pub fn record_from_body(body: Value) -> Result<Record> {
    if let Value::Object(map) = &body
        && !map.contains_key("id")
        && !map.contains_key("_id")
    {
        for key in ["data", "item", "record", "project", "blog"] {
            if let Some(inner @ Value::Object(_)) = map.get(key) {
                return Record::from_json(inner.clone());
            }
        }
    }
    Record::from_json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_shape() {
        let records = records_from_list(json!({"items": [{"id": "1"}, {"id": "2"}]})).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_data_shape() {
        let records = records_from_list(json!({"success": true, "data": [{"_id": "a"}]})).unwrap();
        assert_eq!(records[0].id.as_str(), "a");
    }

    #[test]
    fn test_bare_array_and_null() {
        assert_eq!(records_from_list(json!([{"id": 1}])).unwrap().len(), 1);
        assert!(records_from_list(json!({"data": null})).unwrap().is_empty());
        assert!(records_from_list(json!("nope")).is_err());
        assert!(records_from_list(json!({"items": 3})).is_err());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let records = records_from_list(json!({"items": [{"id": "1"}, {"name": "no id"}]})).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_single_record_wrappers() {
        assert_eq!(
            record_from_body(json!({"data": {"_id": "x"}})).unwrap().id.as_str(),
            "x"
        );
        assert_eq!(
            record_from_body(json!({"_id": "y", "data": {"_id": "z"}}))
                .unwrap()
                .id
                .as_str(),
            "y"
        );
        assert!(record_from_body(json!({"message": "ok"})).is_err());
    }
}
