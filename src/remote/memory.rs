//! In-memory collection client.
//!
//! Behaves like a REST collection held in process memory. Individual ids or
//! the list call can be made to fail, and every call is counted, which makes
//! it the backend for offline demos and for exercising bulk actions.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{AdminError, Result};
use crate::types::{FieldMap, Record, RecordId, RecordStatus};

use super::CollectionClient;

/// Number of calls made per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_all: usize,
    pub create: usize,
    pub update: usize,
    pub set_status: usize,
    pub delete: usize,
}

#[derive(Default)]
struct MemoryState {
    records: Vec<Record>,
    next_id: u64,
    failing: HashSet<RecordId>,
    fetch_failure: Option<String>,
    calls: CallCounts,
    /// Ids in the order mutations were attempted.
    mutation_log: Vec<RecordId>,
}

/// Shared-state in-memory client; clones observe the same collection.
#[derive(Clone, Default)]
pub struct InMemoryClient {
    inner: Arc<Mutex<MemoryState>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let client = Self::new();
        client.inner.lock().records = records;
        client
    }

    /// Make every mutation of `id` fail with a server error.
    pub fn fail_on(&self, id: impl Into<RecordId>) -> &Self {
        self.inner.lock().failing.insert(id.into());
        self
    }

    /// Make `fetch_all` fail until cleared.
    pub fn fail_fetch(&self, message: impl Into<String>) -> &Self {
        self.inner.lock().fetch_failure = Some(message.into());
        self
    }

    pub fn clear_fetch_failure(&self) {
        self.inner.lock().fetch_failure = None;
    }

    pub fn calls(&self) -> CallCounts {
        self.inner.lock().calls
    }

    /// Ids passed to mutations, in call order.
    pub fn mutation_log(&self) -> Vec<RecordId> {
        self.inner.lock().mutation_log.clone()
    }

    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().records.clone()
    }

    pub fn replace_records(&self, records: Vec<Record>) {
        self.inner.lock().records = records;
    }
}

fn check_mutation(state: &mut MemoryState, id: &RecordId) -> Result<usize> {
    state.mutation_log.push(id.clone());
    if state.failing.contains(id) {
        return Err(AdminError::Server {
            status: 500,
            message: format!("failed to update {id}"),
        });
    }
    state
        .records
        .iter()
        .position(|r| &r.id == id)
        .ok_or_else(|| AdminError::Server {
            status: 404,
            message: format!("record {id} not found"),
        })
}

impl CollectionClient for InMemoryClient {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let mut state = self.inner.lock();
        state.calls.fetch_all += 1;
        if let Some(message) = &state.fetch_failure {
            return Err(AdminError::Network(message.clone()));
        }
        Ok(state.records.clone())
    }

    async fn create(&self, fields: &FieldMap) -> Result<Record> {
        let mut state = self.inner.lock();
        state.calls.create += 1;
        state.next_id += 1;
        let mut fields = fields.clone();
        fields.insert(
            "id".to_string(),
            Value::String(format!("mem-{}", state.next_id)),
        );
        let record = Record::from_json(Value::Object(fields))?;
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, fields: &FieldMap) -> Result<Record> {
        let mut state = self.inner.lock();
        state.calls.update += 1;
        let index = check_mutation(&mut state, id)?;
        let record = &mut state.records[index];
        for (key, value) in fields {
            record.fields.insert(key.clone(), value.clone());
        }
        let updated = Record::from_json(Value::Object(record.fields.clone()))?;
        *record = updated.clone();
        Ok(updated)
    }

    async fn set_status(&self, id: &RecordId, status: RecordStatus) -> Result<()> {
        let mut state = self.inner.lock();
        state.calls.set_status += 1;
        let index = check_mutation(&mut state, id)?;
        let record = &mut state.records[index];
        record.status = Some(status);
        record
            .fields
            .insert("status".to_string(), Value::String(status.to_string()));
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let mut state = self.inner.lock();
        state.calls.delete += 1;
        let index = check_mutation(&mut state, id)?;
        state.records.remove(index);
        Ok(())
    }
}
