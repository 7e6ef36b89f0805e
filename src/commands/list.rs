use serde_json::json;

use super::{CommandOutput, apply_view_args, load_store};
use crate::cli::{OutputOptions, ViewArgs};
use crate::config::Config;
use crate::display::render_page;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::types::Record;

/// List one page of an entity
pub async fn cmd_list(entity: EntityKind, view: &ViewArgs, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let mut store = load_store(&config, entity).await?;
    apply_view_args(&mut store, view)?;

    let page = store.current_page();
    let json_output = json!({
        "entity": entity.to_string(),
        "page": page.page,
        "page_size": store.view().page_size,
        "total_pages": page.total_pages,
        "total_count": page.total_count,
        "records": records_json(&page.records),
    });

    CommandOutput::new(json_output)
        .with_text(render_page(&page, store.profile(), None))
        .print(output)
}

fn records_json(records: &[&Record]) -> serde_json::Value {
    serde_json::Value::Array(records.iter().map(|r| r.to_json()).collect())
}
