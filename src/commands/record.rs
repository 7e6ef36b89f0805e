//! Single-record commands: show, create, update, status, toggle, delete.
//!
//! Every mutation is followed by a re-fetch inside the store; the printed
//! record is the one the server returned.

use serde_json::json;

use super::interactive::TerminalConfirm;
use super::{CommandOutput, load_store};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::render_record;
use crate::entity::EntityKind;
use crate::error::{AdminError, Result};
use crate::list::{AssumeYes, ConfirmGate};
use crate::types::{RecordId, RecordStatus};
use crate::utils::parse_field_args;

/// Show one record
pub async fn cmd_show(entity: EntityKind, id: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let store = load_store(&config, entity).await?;
    let id = RecordId::from(id);
    let record = store
        .find(&id)
        .ok_or_else(|| AdminError::RecordNotFound(format!("{entity} {id}")))?;

    CommandOutput::new(record.to_json())
        .with_text(render_record(record, store.profile()))
        .print(output)
}

/// Create a record from `key=value` fields
pub async fn cmd_create(entity: EntityKind, fields: &[String], output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let fields = parse_field_args(fields)?;
    // Fail on unsupported entities and missing fields before any request
    crate::utils::validate_create(&config.profile_for(entity), &fields)?;

    let mut store = load_store(&config, entity).await?;
    let record = store.create(&fields).await?;

    CommandOutput::new(json!({
        "action": "created",
        "entity": entity.to_string(),
        "id": record.id,
        "record": record.to_json(),
    }))
    .with_text(format!("Created {entity} {}", record.id))
    .print(output)
}

/// Update fields of a record
pub async fn cmd_update(
    entity: EntityKind,
    id: &str,
    fields: &[String],
    output: OutputOptions,
) -> Result<()> {
    let config = Config::load()?;
    let fields = parse_field_args(fields)?;
    crate::utils::validate_update(&config.profile_for(entity), &fields)?;

    let mut store = load_store(&config, entity).await?;
    let id = RecordId::from(id);
    let record = store.update(&id, &fields).await?;

    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    CommandOutput::new(json!({
        "action": "updated",
        "entity": entity.to_string(),
        "id": id,
        "fields": keys,
        "record": record.to_json(),
    }))
    .with_text(format!("Updated {entity} {id}: {}", keys.join(", ")))
    .print(output)
}

/// Set the status of a record
pub async fn cmd_status(
    entity: EntityKind,
    id: &str,
    status: RecordStatus,
    output: OutputOptions,
) -> Result<()> {
    let config = Config::load()?;
    config.profile_for(entity).require_status()?;

    let mut store = load_store(&config, entity).await?;
    let id = RecordId::from(id);
    let previous = store.find(&id).and_then(|r| r.status);
    store.set_status(&id, status).await?;

    CommandOutput::new(json!({
        "action": "status_changed",
        "entity": entity.to_string(),
        "id": id,
        "previous_status": previous.map(|s| s.to_string()),
        "new_status": status.to_string(),
    }))
    .with_text(format!("{entity} {id} is now {status}"))
    .print(output)
}

/// Flip a record between active and deactive
pub async fn cmd_toggle(entity: EntityKind, id: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    config.profile_for(entity).require_status()?;

    let mut store = load_store(&config, entity).await?;
    let id = RecordId::from(id);
    let status = store.toggle_status(&id).await?;

    CommandOutput::new(json!({
        "action": "status_changed",
        "entity": entity.to_string(),
        "id": id,
        "new_status": status.to_string(),
    }))
    .with_text(format!("{entity} {id} is now {status}"))
    .print(output)
}

/// Delete a record after confirmation
pub async fn cmd_delete(entity: EntityKind, id: &str, yes: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let mut store = load_store(&config, entity).await?;
    let id = RecordId::from(id);
    if store.find(&id).is_none() {
        return Err(AdminError::RecordNotFound(format!("{entity} {id}")));
    }

    let gate: &dyn ConfirmGate = if yes { &AssumeYes } else { &TerminalConfirm };
    store.delete(&id, gate).await?;

    CommandOutput::new(json!({
        "action": "deleted",
        "entity": entity.to_string(),
        "id": id,
        "success": true,
    }))
    .with_text(format!("Deleted {entity} {id}"))
    .print(output)
}
