//! Candidate history store: the ordered, in-memory collection of résumé
//! submissions shared by the candidate and HR surfaces.
//!
//! Cloning a `HistoryStore` is cheap and yields a handle to the same data.
//! Each mutation takes the write lock for exactly one create or update, so
//! readers never observe a half-applied change.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::history::{EntryFields, EntryId, HistoryEntry, NewHistoryEntry, Status};

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("entry {0} not found")]
    NotFound(EntryId),

    #[error("entry {id} is {actual}, expected {expected}")]
    Mismatch {
        id: EntryId,
        expected: Status,
        actual: Status,
    },
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<HistoryEntry>,
    last_id: EntryId,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new entry and returns its id. Ids start at 1 and are never reused.
    pub async fn create(&self, entry: NewHistoryEntry) -> EntryId {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        info!(
            "History entry {id} created for user {} ({})",
            entry.user_id, entry.filename
        );
        inner.entries.push(HistoryEntry::from_new(id, entry));
        id
    }

    /// Merges `fields` into entry `id` and overwrites its status.
    ///
    /// Unknown ids are a no-op; the return value tells the caller whether an
    /// entry was touched. Transitions are not validated.
    pub async fn update_status(&self, id: EntryId, status: Status, fields: EntryFields) -> bool {
        let mut inner = self.inner.write().await;
        match inner.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                let previous = entry.status;
                entry.merge(fields);
                entry.status = status;
                info!("History entry {id}: {previous} -> {status}");
                true
            }
            None => {
                debug!("update_status ignored for unknown entry {id}");
                false
            }
        }
    }

    /// Like `update_status`, but only applies when the entry is currently
    /// `expected`. The check and the write happen under one lock.
    pub async fn update_status_if(
        &self,
        id: EntryId,
        expected: Status,
        status: Status,
        fields: EntryFields,
    ) -> Result<HistoryEntry, TransitionError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(TransitionError::NotFound(id))?;
        if entry.status != expected {
            return Err(TransitionError::Mismatch {
                id,
                expected,
                actual: entry.status,
            });
        }
        entry.merge(fields);
        entry.status = status;
        info!("History entry {id}: {expected} -> {status}");
        Ok(entry.clone())
    }

    /// Snapshot of the full collection in creation order.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.read().await.entries.clone()
    }

    pub async fn get(&self, id: EntryId) -> Option<HistoryEntry> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }
}
