//! List state store.
//!
//! A [`ListStore`] owns one entity's fetched collection and the view over
//! it. Every view mutator leaves the store consistent: the page is clamped
//! into range and the selection only holds ids visible on the current page.
//! Remote failures are reported through the [`Notifier`] and leave the last
//! good collection in place.
//!
//! Fetches are numbered. Only the response to the most recent
//! [`ListStore::begin_fetch`] is applied; earlier ones are discarded when
//! they complete.

pub mod bulk;
pub mod debounce;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::entity::EntityProfile;
use crate::error::{AdminError, Result};
use crate::notify::{ConsoleNotifier, Notice, Notifier};
use crate::query::{self, PageView, SortSpec, ViewState, clamp_page};
use crate::remote::CollectionClient;
use crate::types::{FieldMap, Record, RecordId, RecordStatus};
use crate::utils::{validate_create, validate_update};

pub use bulk::{
    AlwaysDecline, AssumeYes, BulkAction, BulkFailure, BulkOutcome, ConfirmGate, apply_bulk,
};
pub use debounce::Debouncer;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collection fetch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet.
    Idle,
    Loading,
    Loaded,
    /// Last fetch failed; the previous collection is still shown.
    Error(String),
}

/// Identifies one fetch; see [`ListStore::finish_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

pub struct ListStore<C> {
    client: C,
    profile: EntityProfile,
    collection: Vec<Record>,
    view: ViewState,
    load_state: LoadState,
    generation: u64,
    applied_fetches: usize,
    search: Debouncer<String>,
    notifier: Arc<dyn Notifier>,
}

impl<C: CollectionClient> ListStore<C> {
    pub fn new(client: C, profile: EntityProfile) -> Self {
        Self {
            client,
            profile,
            collection: Vec::new(),
            view: ViewState::default(),
            load_state: LoadState::Idle,
            generation: 0,
            applied_fetches: 0,
            search: Debouncer::new(DEFAULT_SEARCH_DEBOUNCE),
            notifier: Arc::new(ConsoleNotifier::default()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        self.set_page_size(page_size)?;
        Ok(self)
    }

    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search = Debouncer::new(delay);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn profile(&self) -> &EntityProfile {
        &self.profile
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn collection(&self) -> &[Record] {
        &self.collection
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Number of fetch responses applied to the collection so far.
    pub fn applied_fetches(&self) -> usize {
        self.applied_fetches
    }

    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.collection.iter().find(|r| &r.id == id)
    }

    // Fetching

    /// Start a fetch; any response for an older ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.load_state = LoadState::Loading;
        FetchTicket(self.generation)
    }

    /// Apply a fetch response.
    ///
    /// Returns `Ok(false)` when the ticket is stale and the response was
    /// dropped. A failed fetch is reported, keeps the previous collection and
    /// returns the error.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Record>>) -> Result<bool> {
        if ticket.0 != self.generation {
            tracing::debug!(
                "discarding stale {} fetch #{} (latest #{})",
                self.profile.kind,
                ticket.0,
                self.generation
            );
            return Ok(false);
        }

        match result {
            Ok(records) => {
                tracing::debug!("loaded {} {}", records.len(), self.profile.kind.collection());
                self.collection = records;
                self.view.selection.clear();
                self.load_state = LoadState::Loaded;
                self.applied_fetches += 1;
                self.normalize();
                Ok(true)
            }
            Err(e) => {
                self.load_state = LoadState::Error(e.to_string());
                self.notifier.notify(Notice::from_error(
                    &format!("Failed to load {}", self.profile.kind.collection()),
                    &e,
                ));
                Err(e)
            }
        }
    }

    /// Re-read the whole collection from the server.
    pub async fn refresh(&mut self) -> Result<()> {
        let ticket = self.begin_fetch();
        let result = self.client.fetch_all().await;
        self.finish_fetch(ticket, result).map(|_| ())
    }

    // View

    /// Apply a search term immediately, discarding any queued term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search.flush();
        self.apply_search(term.into());
    }

    /// Queue a search term; it is applied once typing pauses.
    pub fn queue_search(&mut self, term: impl Into<String>, now: Instant) {
        self.search.push(term.into(), now);
    }

    /// Apply the queued search term if its quiet period has passed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.poll_ready(now) {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    /// When the queued search term becomes due.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    fn apply_search(&mut self, term: String) {
        if term == self.view.search {
            return;
        }
        self.view.search = term;
        self.reset_page();
    }

    pub fn set_status_filter(&mut self, status: Option<RecordStatus>) {
        self.view.status = status;
        self.reset_page();
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.view.category = category;
        self.reset_page();
    }

    /// Sort by `key`, flipping direction if it is already the sort key.
    pub fn toggle_sort(&mut self, key: &str) {
        self.view.sort = Some(SortSpec::toggle(self.view.sort.as_ref(), key));
        self.normalize();
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.view.sort = sort;
        self.normalize();
    }

    /// Go to a page; out-of-range pages are clamped.
    pub fn set_page(&mut self, page: usize) {
        self.view.page = page;
        self.normalize();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.view.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.view.page.saturating_sub(1));
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(AdminError::InvalidPageSize(page_size));
        }
        self.view.page_size = page_size;
        self.normalize();
        Ok(())
    }

    fn reset_page(&mut self) {
        self.view.page = 1;
        self.normalize();
    }

    /// Clamp the page and drop selected ids no longer on it.
    fn normalize(&mut self) {
        let count = query::filtered(&self.collection, &self.view, &self.profile).len();
        self.view.page = clamp_page(self.view.page, count, self.view.page_size);
        let visible: BTreeSet<RecordId> = self.current_page().ids().into_iter().collect();
        self.view.selection.retain(|id| visible.contains(id));
    }

    // Selection

    /// Toggle one id on the current page; returns whether it is now selected.
    pub fn toggle_selected(&mut self, id: &RecordId) -> Result<bool> {
        if !self.current_page().records.iter().any(|r| &r.id == id) {
            return Err(AdminError::RecordNotFound(format!(
                "{id} is not on the current page"
            )));
        }
        if self.view.selection.remove(id) {
            Ok(false)
        } else {
            self.view.selection.insert(id.clone());
            Ok(true)
        }
    }

    /// Select every record on the current page (not the whole filtered list).
    pub fn select_all_on_page(&mut self) {
        self.view.selection = self.current_page().ids().into_iter().collect();
    }

    pub fn clear_selection(&mut self) {
        self.view.selection.clear();
    }

    /// Selected ids in display order.
    pub fn selected_ids(&self) -> Vec<RecordId> {
        self.current_page()
            .records
            .iter()
            .filter(|r| self.view.selection.contains(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    // Derived output

    pub fn current_page(&self) -> PageView<'_> {
        query::apply(&self.collection, &self.view, &self.profile)
    }

    /// Every record matching the view, sorted, without the page slice.
    pub fn filtered_records(&self) -> Vec<&Record> {
        query::filtered(&self.collection, &self.view, &self.profile)
    }

    // Mutations

    /// Run a bulk action on the selection, then refresh once.
    ///
    /// Per-item failures are part of the outcome. The selection is cleared
    /// whenever the batch ran, whatever its result.
    pub async fn run_bulk(&mut self, action: BulkAction, gate: &dyn ConfirmGate) -> Result<BulkOutcome> {
        let ids = self.selected_ids();
        let outcome = match apply_bulk(action, &ids, &self.profile, &self.client, gate).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.notifier
                    .notify(Notice::from_error(&format!("Bulk {action} not run"), &e));
                return Err(e);
            }
        };

        // A failed refresh is already reported; the outcome still stands.
        let _ = self.refresh().await;
        self.view.selection.clear();

        let summary = outcome.summary(action);
        if outcome.is_complete_success() {
            self.notifier.notify(Notice::success(summary));
        } else {
            for failure in &outcome.failed {
                self.notifier
                    .notify(Notice::error(format!("{}: {}", failure.id, failure.error)));
            }
            self.notifier.notify(Notice::warning(summary));
        }
        Ok(outcome)
    }

    pub async fn create(&mut self, fields: &FieldMap) -> Result<Record> {
        validate_create(&self.profile, fields)?;
        let record = self.report(self.client.create(fields).await, "create")?;
        self.notifier.notify(Notice::success(format!(
            "Created {} {}",
            self.profile.kind,
            record.id
        )));
        let _ = self.refresh().await;
        Ok(record)
    }

    pub async fn update(&mut self, id: &RecordId, fields: &FieldMap) -> Result<Record> {
        validate_update(&self.profile, fields)?;
        let record = self.report(self.client.update(id, fields).await, "update")?;
        self.notifier
            .notify(Notice::success(format!("Updated {} {id}", self.profile.kind)));
        let _ = self.refresh().await;
        Ok(record)
    }

    pub async fn set_status(&mut self, id: &RecordId, status: RecordStatus) -> Result<()> {
        self.profile.require_status()?;
        self.report(self.client.set_status(id, status).await, "update status")?;
        self.notifier.notify(Notice::success(format!(
            "{} {id} is now {status}",
            self.profile.kind
        )));
        let _ = self.refresh().await;
        Ok(())
    }

    /// Flip a record between active and deactive based on the fetched state.
    pub async fn toggle_status(&mut self, id: &RecordId) -> Result<RecordStatus> {
        self.profile.require_status()?;
        let current = self
            .find(id)
            .ok_or_else(|| AdminError::RecordNotFound(id.to_string()))?
            .status
            .unwrap_or(RecordStatus::Deactive);
        let next = current.toggled();
        self.set_status(id, next).await?;
        Ok(next)
    }

    /// Delete one record after confirmation.
    pub async fn delete(&mut self, id: &RecordId, gate: &dyn ConfirmGate) -> Result<()> {
        if !gate.confirm(BulkAction::Delete, 1)? {
            return Err(AdminError::Cancelled(format!(
                "delete of {} {id} declined",
                self.profile.kind
            )));
        }
        self.report(self.client.delete(id).await, "delete")?;
        self.notifier
            .notify(Notice::success(format!("Deleted {} {id}", self.profile.kind)));
        let _ = self.refresh().await;
        Ok(())
    }

    fn report<T>(&self, result: Result<T>, operation: &str) -> Result<T> {
        result.inspect_err(|e| {
            self.notifier.notify(Notice::from_error(
                &format!("Failed to {operation} {}", self.profile.kind),
                e,
            ));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::notify::{MemoryNotifier, NoticeLevel};
    use crate::remote::InMemoryClient;
    use serde_json::json;

    fn project(i: usize, status: &str) -> Record {
        Record::from_json(json!({
            "_id": format!("p{i:02}"),
            "projectName": format!("Project {i}"),
            "projectAddress": if i % 2 == 0 { "Goa" } else { "Pune" },
            "type": "villa",
            "status": status,
        }))
        .unwrap()
    }

    async fn store_with(
        records: Vec<Record>,
    ) -> (ListStore<InMemoryClient>, InMemoryClient, MemoryNotifier) {
        let client = InMemoryClient::with_records(records);
        let notifier = MemoryNotifier::new();
        let mut store = ListStore::new(client.clone(), EntityKind::Project.profile())
            .with_notifier(Arc::new(notifier.clone()));
        store.refresh().await.unwrap();
        (store, client, notifier)
    }

    fn many(n: usize) -> Vec<Record> {
        (1..=n).map(|i| project(i, "active")).collect()
    }

    #[tokio::test]
    async fn test_refresh_loads_collection() {
        let (store, client, _) = store_with(many(3)).await;
        assert_eq!(store.load_state(), &LoadState::Loaded);
        assert_eq!(store.collection().len(), 3);
        assert_eq!(client.calls().fetch_all, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_collection() {
        let (mut store, client, notifier) = store_with(many(3)).await;
        client.fail_fetch("connection refused");

        assert!(store.refresh().await.is_err());
        assert_eq!(store.collection().len(), 3);
        assert!(matches!(store.load_state(), LoadState::Error(_)));
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (mut store, _, _) = store_with(many(2)).await;

        let slow = store.begin_fetch();
        let fresh = store.begin_fetch();
        assert!(store.finish_fetch(fresh, Ok(many(5))).unwrap());
        assert!(!store.finish_fetch(slow, Ok(many(1))).unwrap());
        assert_eq!(store.collection().len(), 5);

        // A stale failure is not reported either
        let older = store.begin_fetch();
        let newer = store.begin_fetch();
        assert!(store.finish_fetch(newer, Ok(many(4))).unwrap());
        assert!(
            !store
                .finish_fetch(older, Err(AdminError::Network("late".into())))
                .unwrap()
        );
        assert_eq!(store.load_state(), &LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_filter_change_resets_page() {
        let mut records = many(25);
        records[0] = project(1, "pending");
        let (mut store, _, _) = store_with(records).await;

        store.set_page(3);
        assert_eq!(store.current_page().records.len(), 5);

        store.set_status_filter(Some(RecordStatus::Active));
        assert_eq!(store.view().page, 1);
        assert_eq!(store.current_page().total_count, 24);
    }

    #[tokio::test]
    async fn test_page_size_change_clamps_page() {
        let (mut store, _, _) = store_with(many(25)).await;
        store.set_page(3);
        store.set_page_size(50).unwrap();
        assert_eq!(store.view().page, 1);
        assert!(store.set_page_size(0).is_err());
        assert_eq!(store.view().page_size, 50);

        store.set_page(99);
        assert_eq!(store.view().page, 1);
    }

    #[tokio::test]
    async fn test_select_all_is_page_scoped() {
        let (mut store, _, _) = store_with(many(25)).await;
        store.select_all_on_page();
        assert_eq!(store.selected_ids().len(), 10);

        store.set_search("Goa");
        assert!(store.view().selection.len() <= 10);
        store.select_all_on_page();
        let page_ids = store.current_page().ids();
        assert_eq!(store.selected_ids(), page_ids);

        store.next_page();
        assert!(store.view().selection.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_selected_rejects_offpage_ids() {
        let (mut store, _, _) = store_with(many(15)).await;
        let first = RecordId::from("p01");
        assert!(store.toggle_selected(&first).unwrap());
        assert!(!store.toggle_selected(&first).unwrap());
        assert!(store.toggle_selected(&RecordId::from("p15")).is_err());
    }

    #[tokio::test]
    async fn test_debounced_search_applies_once() {
        let (mut store, _, _) = store_with(many(12)).await;
        let start = Instant::now();
        store.set_page(2);

        store.queue_search("P", start);
        store.queue_search("Pu", start + Duration::from_millis(100));
        store.queue_search("Pune", start + Duration::from_millis(200));
        assert!(!store.poll_search(start + Duration::from_millis(400)));
        assert_eq!(store.view().search, "");
        assert_eq!(store.view().page, 2);

        assert!(store.poll_search(start + Duration::from_millis(500)));
        assert_eq!(store.view().search, "Pune");
        assert_eq!(store.view().page, 1);
        assert_eq!(store.current_page().total_count, 6);
    }

    #[tokio::test]
    async fn test_bulk_refreshes_once_and_clears_selection() {
        let (mut store, client, notifier) = store_with(many(3)).await;
        client.fail_on("p02");
        store.select_all_on_page();

        let outcome = store.run_bulk(BulkAction::Delete, &AssumeYes).await.unwrap();
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(client.calls().fetch_all, 2);
        assert!(store.view().selection.is_empty());
        assert_eq!(store.collection().len(), 1);
        assert_eq!(notifier.count(NoticeLevel::Warning), 1);
    }

    #[tokio::test]
    async fn test_bulk_without_selection() {
        let (mut store, client, notifier) = store_with(many(3)).await;
        let err = store.run_bulk(BulkAction::Activate, &AssumeYes).await.unwrap_err();
        assert!(matches!(err, AdminError::EmptySelection));
        assert_eq!(client.calls().fetch_all, 1);
        assert_eq!(notifier.count(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_toggle_status_uses_fetched_state() {
        let (mut store, client, _) = store_with(vec![project(1, "active")]).await;
        let id = RecordId::from("p01");
        assert_eq!(store.toggle_status(&id).await.unwrap(), RecordStatus::Deactive);
        assert_eq!(store.find(&id).unwrap().status, Some(RecordStatus::Deactive));
        assert_eq!(client.calls().set_status, 1);
        assert!(store.toggle_status(&RecordId::from("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_create_validates_before_request() {
        let (mut store, client, _) = store_with(many(1)).await;
        let mut fields = FieldMap::new();
        fields.insert("projectName".into(), json!("Palm Grove"));
        assert!(store.create(&fields).await.unwrap_err().is_validation());
        assert_eq!(client.calls().create, 0);

        fields.insert("projectAddress".into(), json!("Alibaug"));
        store.create(&fields).await.unwrap();
        assert_eq!(store.collection().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (mut store, client, _) = store_with(many(2)).await;
        let id = RecordId::from("p01");
        assert!(matches!(
            store.delete(&id, &AlwaysDecline).await,
            Err(AdminError::Cancelled(_))
        ));
        assert_eq!(client.calls().delete, 0);

        store.delete(&id, &AssumeYes).await.unwrap();
        assert!(store.find(&id).is_none());
    }
}
