use serde_json::json;

use super::interactive::TerminalConfirm;
use super::{CommandOutput, apply_view_args, load_store};
use crate::cli::{OutputOptions, ViewArgs};
use crate::config::Config;
use crate::entity::EntityKind;
use crate::error::{AdminError, Result};
use crate::list::{AssumeYes, BulkAction, ConfirmGate};
use crate::types::RecordId;

/// Apply a bulk action to records selected on one page of the view
pub async fn cmd_bulk(
    entity: EntityKind,
    action: BulkAction,
    ids: &[String],
    all_on_page: bool,
    view: &ViewArgs,
    yes: bool,
    output: OutputOptions,
) -> Result<()> {
    if ids.is_empty() && !all_on_page {
        return Err(AdminError::EmptySelection);
    }

    let config = Config::load()?;
    let mut store = load_store(&config, entity).await?;
    apply_view_args(&mut store, view)?;

    if all_on_page {
        store.select_all_on_page();
    } else {
        for id in ids {
            store.toggle_selected(&RecordId::from(id.as_str()))?;
        }
    }

    let gate: &dyn ConfirmGate = if yes { &AssumeYes } else { &TerminalConfirm };
    let outcome = store.run_bulk(action, gate).await?;

    let mut text = outcome.summary(action);
    for failure in &outcome.failed {
        text.push_str(&format!("\n  {}: {}", failure.id, failure.error));
    }
    CommandOutput::new(json!({
        "action": action.to_string(),
        "entity": entity.to_string(),
        "succeeded": outcome.succeeded,
        "failed": outcome.failed,
    }))
    .with_text(text)
    .print(output)?;

    if outcome.is_complete_success() {
        Ok(())
    } else {
        Err(AdminError::Other(format!(
            "{} of {} {action} requests failed",
            outcome.failed.len(),
            outcome.total()
        )))
    }
}
