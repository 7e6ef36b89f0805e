use std::path::PathBuf;

use serde_json::json;

use super::{CommandOutput, apply_view_args, load_store};
use crate::cli::{OutputOptions, ViewArgs};
use crate::config::Config;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::export::{export_filename, write_export};
use crate::utils::today;

/// Export the filtered and sorted view of an entity to CSV
pub async fn cmd_export(entity: EntityKind, view: &ViewArgs, output: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let mut store = load_store(&config, entity).await?;
    apply_view_args(&mut store, view)?;

    let path = output.unwrap_or_else(|| config.export_dir().join(export_filename(entity, today())));
    let records = store.filtered_records();
    let file = write_export(&path, &records, &store.profile().columns)?;

    CommandOutput::new(json!({
        "action": "exported",
        "entity": entity.to_string(),
        "path": file.path.display().to_string(),
        "rows": file.rows,
        "filtered": store.view().is_filtered(),
    }))
    .with_text(format!(
        "Exported {} {} to {}",
        file.rows,
        entity.collection(),
        file.path.display()
    ))
    .print(OutputOptions::default())
}
