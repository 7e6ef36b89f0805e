//! Bulk actions over a selection.
//!
//! Items are processed one at a time in selection order. A failing item is
//! recorded and the batch moves on; nothing is retried. Deletes must pass a
//! [`ConfirmGate`] before the first request is sent.

use serde::Serialize;

use crate::entity::EntityProfile;
use crate::error::{AdminError, Result};
use crate::remote::CollectionClient;
use crate::types::{RecordId, RecordStatus};

/// Action applied to every selected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

enum_display_fromstr!(
    BulkAction,
    AdminError::invalid_bulk_action,
    {
        Activate => "activate",
        Deactivate => "deactivate",
        Delete => "delete",
    }
);

impl BulkAction {
    /// Whether the action destroys records and needs confirmation.
    pub fn is_destructive(self) -> bool {
        matches!(self, BulkAction::Delete)
    }

    /// Target status for status-changing actions.
    pub fn target_status(self) -> Option<RecordStatus> {
        match self {
            BulkAction::Activate => Some(RecordStatus::Active),
            BulkAction::Deactivate => Some(RecordStatus::Deactive),
            BulkAction::Delete => None,
        }
    }
}

/// Confirmation step for destructive actions.
pub trait ConfirmGate {
    /// Ask whether `action` may proceed on `count` records.
    fn confirm(&self, action: BulkAction, count: usize) -> Result<bool>;
}

/// Gate that always proceeds (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl ConfirmGate for AssumeYes {
    fn confirm(&self, _action: BulkAction, _count: usize) -> Result<bool> {
        Ok(true)
    }
}

/// Gate that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDecline;

impl ConfirmGate for AlwaysDecline {
    fn confirm(&self, _action: BulkAction, _count: usize) -> Result<bool> {
        Ok(false)
    }
}

/// One item that failed within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub id: RecordId,
    pub error: String,
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line report, e.g. `deleted 2 of 3 (1 failed)`.
    pub fn summary(&self, action: BulkAction) -> String {
        let verb = match action {
            BulkAction::Activate => "activated",
            BulkAction::Deactivate => "deactivated",
            BulkAction::Delete => "deleted",
        };
        if self.failed.is_empty() {
            format!("{verb} {} of {}", self.succeeded, self.total())
        } else {
            format!(
                "{verb} {} of {} ({} failed)",
                self.succeeded,
                self.total(),
                self.failed.len()
            )
        }
    }
}

/// Apply `action` to each id in order.
///
/// Preconditions are checked before any request: a non-empty selection, an
/// entity that supports the action, and confirmation for deletes.
pub async fn apply_bulk<C: CollectionClient>(
    action: BulkAction,
    ids: &[RecordId],
    profile: &EntityProfile,
    client: &C,
    gate: &dyn ConfirmGate,
) -> Result<BulkOutcome> {
    if ids.is_empty() {
        return Err(AdminError::EmptySelection);
    }
    if action.target_status().is_some() {
        profile.require_status()?;
    }
    if action.is_destructive() && !gate.confirm(action, ids.len())? {
        return Err(AdminError::Cancelled(format!(
            "{action} of {} {} declined",
            ids.len(),
            profile.kind.collection()
        )));
    }

    let mut outcome = BulkOutcome::default();
    for id in ids {
        let result = match action.target_status() {
            Some(status) => client.set_status(id, status).await,
            None => client.delete(id).await,
        };
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(e) => {
                tracing::debug!("{action} failed for {id}: {e}");
                outcome.failed.push(BulkFailure {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "bulk {action} on {}: {} succeeded, {} failed",
        profile.kind.collection(),
        outcome.succeeded,
        outcome.failed.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::remote::InMemoryClient;
    use crate::types::Record;
    use serde_json::json;
    use std::cell::Cell;

    fn client(ids: &[&str]) -> InMemoryClient {
        InMemoryClient::with_records(
            ids.iter()
                .map(|id| Record::from_json(json!({"id": id, "status": "pending"})).unwrap())
                .collect(),
        )
    }

    fn ids(ids: &[&str]) -> Vec<RecordId> {
        ids.iter().map(|id| RecordId::from(*id)).collect()
    }

    struct CountingGate {
        answer: bool,
        asked: Cell<usize>,
    }

    impl ConfirmGate for CountingGate {
        fn confirm(&self, _action: BulkAction, _count: usize) -> Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn test_delete_continues_past_failure() {
        let client = client(&["a", "b", "c"]);
        client.fail_on("b");
        let profile = EntityKind::Project.profile();

        let outcome = apply_bulk(BulkAction::Delete, &ids(&["a", "b", "c"]), &profile, &client, &AssumeYes)
            .await
            .unwrap();

        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id.as_str(), "b");
        assert_eq!(client.mutation_log(), ids(&["a", "b", "c"]));
        let remaining: Vec<_> = client.records().into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, ids(&["b"]));
        assert_eq!(outcome.summary(BulkAction::Delete), "deleted 2 of 3 (1 failed)");
    }

    #[tokio::test]
    async fn test_activate_sets_status() {
        let client = client(&["a", "b"]);
        let profile = EntityKind::Blog.profile();
        let gate = CountingGate { answer: false, asked: Cell::new(0) };

        let outcome = apply_bulk(BulkAction::Activate, &ids(&["a", "b"]), &profile, &client, &gate)
            .await
            .unwrap();

        assert!(outcome.is_complete_success());
        assert_eq!(gate.asked.get(), 0);
        assert!(client
            .records()
            .iter()
            .all(|r| r.status == Some(RecordStatus::Active)));
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let client = client(&["a"]);
        let profile = EntityKind::Project.profile();
        let gate = CountingGate { answer: false, asked: Cell::new(0) };

        let err = apply_bulk(BulkAction::Delete, &ids(&["a"]), &profile, &client, &gate)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Cancelled(_)));
        assert_eq!(gate.asked.get(), 1);
        assert_eq!(client.calls().delete, 0);
    }

    #[tokio::test]
    async fn test_preconditions() {
        let client = client(&["a"]);
        let err = apply_bulk(
            BulkAction::Delete,
            &[],
            &EntityKind::Project.profile(),
            &client,
            &AssumeYes,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdminError::EmptySelection));

        let err = apply_bulk(
            BulkAction::Deactivate,
            &ids(&["a"]),
            &EntityKind::Contact.profile(),
            &client,
            &AssumeYes,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AdminError::Unsupported { .. }));
        assert_eq!(client.calls().set_status, 0);
    }

    #[test]
    fn test_parse_action() {
        assert_eq!("Delete".parse::<BulkAction>().unwrap(), BulkAction::Delete);
        assert!("archive".parse::<BulkAction>().is_err());
        assert_eq!(BulkAction::Deactivate.to_string(), "deactivate");
    }
}
