//! Dashboard summary counts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::EntityProfile;
use crate::types::{Record, RecordStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    /// Count per status; only filled for entities with a status.
    pub by_status: BTreeMap<String, usize>,
    /// Records whose status is missing or not recognised.
    pub without_status: usize,
    /// Count per category value, sorted by value.
    pub by_category: BTreeMap<String, usize>,
}

impl CollectionStats {
    pub fn from_records(records: &[Record], profile: &EntityProfile) -> Self {
        let mut stats = CollectionStats {
            total: records.len(),
            ..Default::default()
        };

        if profile.supports_status {
            for status in RecordStatus::ALL {
                stats.by_status.insert(status.to_string(), 0);
            }
            for record in records {
                match record.status {
                    Some(status) => *stats.by_status.entry(status.to_string()).or_default() += 1,
                    None => stats.without_status += 1,
                }
            }
        }

        if let Some(field) = &profile.category_field {
            for record in records {
                let value = record
                    .field_text(field)
                    .map(|v| v.trim().to_lowercase())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "other".to_string());
                *stats.by_category.entry(value).or_default() += 1;
            }
        }

        stats
    }

    pub fn status_count(&self, status: RecordStatus) -> usize {
        self.by_status.get(&status.to_string()).copied().unwrap_or(0)
    }
}
