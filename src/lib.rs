#[macro_use]
mod macros;

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod entity;
pub mod error;
pub mod export;
pub mod list;
pub mod notify;
pub mod query;
pub mod remote;
pub mod session;
pub mod stats;
pub mod types;
pub mod utils;

pub use entity::{Column, EntityKind, EntityProfile};
pub use error::{AdminError, Result};
pub use list::{BulkAction, BulkOutcome, ListStore, LoadState};
pub use query::{PageView, SortDirection, SortSpec, ViewState};
pub use remote::{CollectionClient, HttpCollectionClient, InMemoryClient};
pub use types::{FieldMap, Record, RecordId, RecordStatus};
