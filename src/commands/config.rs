//! Configuration commands for managing admin settings.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{CONFIG_KEYS, Config};
use crate::error::Result;
use crate::session::TokenStore;

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let authenticated = super::load_session()?.is_authenticated();

    let mut values = serde_json::Map::new();
    for key in CONFIG_KEYS {
        values.insert(key.to_string(), json!(config.get(key)?));
    }

    let json_output = json!({
        "config": values,
        "endpoints": config.endpoints,
        "authenticated": authenticated,
        "config_file": Config::config_path()?.to_string_lossy(),
        "session_file": TokenStore::default_location()?.path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    for key in CONFIG_KEYS {
        let value = match config.get(key)? {
            Some(value) => value,
            None => "not set".dimmed().to_string(),
        };
        text_output.push_str(&format!("{}: {value}\n", key.cyan()));
    }

    if !config.endpoints.is_empty() {
        text_output.push_str(&format!("\n{}:\n", "endpoints".cyan()));
        for (entity, overrides) in &config.endpoints {
            let fields = [
                ("list", &overrides.list),
                ("create", &overrides.create),
                ("update", &overrides.update),
                ("status", &overrides.status),
                ("delete", &overrides.delete),
            ];
            for (op, value) in fields {
                if let Some(value) = value {
                    text_output.push_str(&format!("  {entity}.{op}: {value}\n"));
                }
            }
        }
    }

    let session_status = if authenticated {
        "logged in".green().to_string()
    } else {
        "not logged in".dimmed().to_string()
    };
    text_output.push_str(&format!("\n{}: {session_status}\n\n", "session".cyan()));
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path()?.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Print one configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(value.unwrap_or_else(|| "not set".to_string()))
    .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    let text = match &stored {
        Some(stored) => format!("Set {} = {stored}", key.cyan()),
        None => format!("Unset {}", key.cyan()),
    };
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "success": true,
    }))
    .with_text(text)
    .print(output)
}
