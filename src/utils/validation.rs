//! Client-side validation run before any request is sent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::entity::EntityProfile;
use crate::error::{AdminError, Result};
use crate::types::FieldMap;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

/// Validates login credentials.
///
/// Rules:
/// - Email is required and must look like `local@domain.tld`
/// - Password is required
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AdminError::Validation("Email is required".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AdminError::Validation("Email is invalid".to_string()));
    }
    if password.is_empty() {
        return Err(AdminError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// True when a field value counts as filled in.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

/// Validates the fields of a create request against the entity's required fields.
pub fn validate_create(profile: &EntityProfile, fields: &FieldMap) -> Result<()> {
    profile.require_edit()?;
    let missing: Vec<&str> = profile
        .required_fields
        .iter()
        .filter(|name| !is_present(fields.get(name.as_str())))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AdminError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Validates an update: at least one field, and no required field blanked out.
pub fn validate_update(profile: &EntityProfile, fields: &FieldMap) -> Result<()> {
    profile.require_edit()?;
    if fields.is_empty() {
        return Err(AdminError::Validation("no fields to update".to_string()));
    }
    let blanked: Vec<&str> = profile
        .required_fields
        .iter()
        .filter(|name| fields.contains_key(name.as_str()) && !is_present(fields.get(name.as_str())))
        .map(String::as_str)
        .collect();
    if !blanked.is_empty() {
        return Err(AdminError::Validation(format!(
            "required fields cannot be empty: {}",
            blanked.join(", ")
        )));
    }
    Ok(())
}

/// Parse `key=value` pairs into a field map.
///
/// Values that parse as JSON (numbers, booleans, arrays, objects, quoted
/// strings) keep their JSON type; anything else is stored as a string.
/// Dotted keys (`ownershipPlan.firstInstallment=10`) build nested objects.
pub fn parse_field_args(args: &[String]) -> Result<FieldMap> {
    let mut fields = FieldMap::new();
    for arg in args {
        let (key, raw) = arg.split_once('=').ok_or_else(|| {
            AdminError::Validation(format!("invalid field '{arg}', expected key=value"))
        })?;
        let key = key.trim();
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(AdminError::Validation(format!(
                "invalid field name in '{arg}'"
            )));
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        insert_path(&mut fields, key, value)?;
    }
    Ok(fields)
}

fn insert_path(fields: &mut FieldMap, path: &str, value: Value) -> Result<()> {
    let mut parts = path.split('.').peekable();
    let mut current = fields;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return Ok(());
        }
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(FieldMap::new()));
        current = entry.as_object_mut().ok_or_else(|| {
            AdminError::Validation(format!("field '{part}' in '{path}' is not an object"))
        })?;
    }
    Ok(())
}
