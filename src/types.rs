//! Record model shared by every entity screen.
//!
//! Records mirror server state: they are created, mutated and destroyed by
//! the remote API and only ever replaced wholesale by a re-fetch.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AdminError, Result};

/// Field map sent with create/update requests and kept on every record.
pub type FieldMap = Map<String, Value>;

/// Server-assigned record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Deactive,
    Pending,
}

enum_display_fromstr!(
    RecordStatus,
    AdminError::invalid_status,
    {
        Active => "active",
        Deactive => "deactive" | "inactive",
        Pending => "pending",
    }
);

impl RecordStatus {
    pub const ALL: [RecordStatus; 3] = [
        RecordStatus::Active,
        RecordStatus::Deactive,
        RecordStatus::Pending,
    ];

    /// Status a single-record toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            RecordStatus::Active => RecordStatus::Deactive,
            RecordStatus::Deactive | RecordStatus::Pending => RecordStatus::Active,
        }
    }
}

/// One entity instance mirrored from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub status: Option<RecordStatus>,
    pub fields: FieldMap,
}

impl Record {
    /// Build a record from a JSON object returned by the API.
    ///
    /// The id is read from `id` or `_id` (string or number). An unknown
    /// `status` string leaves `status` absent but keeps the raw field.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(AdminError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let id = ["id", "_id"]
            .iter()
            .find_map(|key| match fields.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| AdminError::InvalidRecord("missing 'id' or '_id'".to_string()))?;

        let status = fields
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());

        Ok(Self {
            id: RecordId(id),
            status,
            fields,
        })
    }

    /// Resolve a dotted field path (`user.fullname`) through nested objects.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Field rendered as display text; `None` for missing, null, arrays and objects.
    pub fn field_text(&self, path: &str) -> Option<String> {
        if path == "status"
            && let Some(status) = self.status
        {
            return Some(status.to_string());
        }
        self.field(path).and_then(value_text)
    }

    /// JSON form of the record, with the resolved `id` always present.
    pub fn to_json(&self) -> Value {
        let mut fields = self.fields.clone();
        fields
            .entry("id")
            .or_insert_with(|| Value::String(self.id.to_string()));
        Value::Object(fields)
    }
}

/// Scalar JSON value as text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
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
