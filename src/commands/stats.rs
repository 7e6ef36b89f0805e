use serde_json::{Map, Value, json};

use super::{CommandOutput, load_store};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::render_stats;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::stats::CollectionStats;

/// Dashboard counts for every entity
pub async fn cmd_stats(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let mut json_output = Map::new();
    let mut text_output = String::new();
    for kind in EntityKind::ALL {
        let store = load_store(&config, kind).await?;
        let stats = CollectionStats::from_records(store.collection(), store.profile());
        text_output.push_str(&render_stats(kind.collection(), &stats));
        json_output.insert(kind.collection().to_string(), json!(stats));
    }

    CommandOutput::new(Value::Object(json_output))
        .with_text(text_output.trim_end().to_string())
        .print(output)
}
