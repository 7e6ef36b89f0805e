//! Command handlers for the `ownifie` binary.
//!
//! Each handler loads configuration and the session, builds a
//! [`ListStore`] over the HTTP client for the requested entity, and prints
//! either text or JSON.

mod auth;
mod browse;
mod bulk;
mod config;
mod export;
pub mod interactive;
mod list;
mod record;
mod stats;

pub use auth::{cmd_login, cmd_logout};
pub use browse::cmd_browse;
pub use bulk::cmd_bulk;
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use export::cmd_export;
pub use list::cmd_list;
pub use record::{cmd_create, cmd_delete, cmd_show, cmd_status, cmd_toggle, cmd_update};
pub use stats::cmd_stats;

use std::sync::Arc;

use serde_json::Value;

use crate::cli::{OutputOptions, ViewArgs};
use crate::config::Config;
use crate::entity::EntityKind;
use crate::error::Result;
use crate::list::ListStore;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::query::{SortSpec, parse_filter_arg, parse_status_filter};
use crate::remote::HttpCollectionClient;
use crate::session::{Session, TokenStore};

/// Output of a command in both JSON and text form.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when requested, else the text form (pretty JSON if none).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match (output.json, self.text) {
            (false, Some(text)) => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Session restored from the default token store.
pub(crate) fn load_session() -> Result<Session> {
    Session::hydrate(TokenStore::default_location()?)
}

/// A store for `kind`, authenticated and configured, not yet fetched.
pub(crate) fn open_store(
    config: &Config,
    kind: EntityKind,
    notifier: Arc<dyn Notifier>,
) -> Result<ListStore<HttpCollectionClient>> {
    let session = load_session()?;
    let token = session.require_token()?;
    let profile = config.profile_for(kind);
    let client = HttpCollectionClient::with_timeout(
        &config.base_url(),
        profile.endpoints.clone(),
        token,
        config.request_timeout(),
    )?;
    ListStore::new(client, profile)
        .with_notifier(notifier)
        .with_search_debounce(config.search_debounce())
        .with_page_size(config.page_size)
}

/// Open and fetch the store for a one-shot command.
pub(crate) async fn load_store(
    config: &Config,
    kind: EntityKind,
) -> Result<ListStore<HttpCollectionClient>> {
    let mut store = open_store(config, kind, Arc::new(ConsoleNotifier::quiet()))?;
    store.refresh().await?;
    Ok(store)
}

/// Apply view options in pipeline order; the page is set last so it is
/// clamped against the filtered count.
pub(crate) fn apply_view_args<C>(store: &mut ListStore<C>, args: &ViewArgs) -> Result<()>
where
    C: crate::remote::CollectionClient,
{
    if let Some(size) = args.page_size {
        store.set_page_size(size)?;
    }
    if let Some(search) = &args.search {
        store.set_search(search.as_str());
    }
    store.set_status_filter(parse_status_filter(&args.status)?);
    store.set_category_filter(parse_filter_arg(&args.category));
    if let Some(key) = &args.sort {
        store.set_sort(Some(if args.desc {
            SortSpec::descending(key.as_str())
        } else {
            SortSpec::ascending(key.as_str())
        }));
    }
    store.set_page(args.page);
    Ok(())
}
