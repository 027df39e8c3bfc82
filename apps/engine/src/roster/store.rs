//! Candidate Store: the single source of truth for all derived views.
//!
//! A versioned snapshot container with one writer path. Readers clone an
//! `Arc` of the current collection, so replacement is atomic from their
//! perspective and a reader never observes a half-installed roster.
//!
//! Concurrent `load()` calls are last-write-wins: each load takes a monotonic
//! ticket before issuing the fetch, and a response is installed only if its
//! ticket is newer than the installed version. A stale response (issued
//! earlier, resolved later) is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::api_client::ScreenerApi;
use crate::errors::EngineError;
use crate::models::candidate::CandidateRecord;

struct Snapshot {
    records: Arc<Vec<CandidateRecord>>,
    /// Ticket of the last accepted load. Compared against incoming load
    /// tickets only, so tag mutations cannot mask a newer fetch.
    load_ticket: u64,
    /// Bumps on every visible change (accepted load or tag mutation).
    version: u64,
}

pub struct CandidateStore {
    api: Arc<dyn ScreenerApi>,
    inner: RwLock<Snapshot>,
    load_seq: AtomicU64,
}

impl CandidateStore {
    pub fn new(api: Arc<dyn ScreenerApi>) -> Self {
        Self {
            api,
            inner: RwLock::new(Snapshot {
                records: Arc::new(Vec::new()),
                load_ticket: 0,
                version: 0,
            }),
            load_seq: AtomicU64::new(0),
        }
    }

    /// Current roster snapshot. Cheap: clones the `Arc`, not the records.
    pub fn records(&self) -> Arc<Vec<CandidateRecord>> {
        self.read().records.clone()
    }

    /// Version of the installed snapshot; bumps on every accepted load and
    /// tag mutation.
    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Fetches the full candidate collection and replaces the prior one
    /// wholesale (snapshot semantics, no incremental merge). On failure the
    /// prior collection is retained and the error propagates to the caller.
    pub async fn load(&self) -> Result<Arc<Vec<CandidateRecord>>, EngineError> {
        let ticket = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = self.api.fetch_candidates().await?;

        let mut guard = self.write();
        if ticket > guard.load_ticket {
            info!(
                "Roster load #{ticket} installed ({} candidates)",
                fetched.len()
            );
            guard.records = Arc::new(fetched);
            guard.load_ticket = ticket;
            guard.version += 1;
        } else {
            debug!(
                "Roster load #{ticket} resolved after #{}, stale, discarded",
                guard.load_ticket
            );
        }
        Ok(guard.records.clone())
    }

    /// Optimistically appends `tag` to each matching record after a
    /// successful tag dispatch. Clone-on-write: the current snapshot is
    /// copied, mutated, and swapped in, so concurrent readers keep a
    /// consistent view. Duplicate tags are skipped.
    pub fn apply_tag_mutation(&self, ids: &[Uuid], tag: &str) {
        let mut guard = self.write();
        let mut records: Vec<CandidateRecord> = guard.records.as_ref().clone();
        let mut touched = 0usize;
        for record in records.iter_mut() {
            if ids.contains(&record.id) && !record.tags.iter().any(|t| t == tag) {
                record.tags.push(tag.to_string());
                touched += 1;
            }
        }
        if touched > 0 {
            debug!("Tag '{tag}' appended to {touched} candidates");
            guard.records = Arc::new(records);
            guard.version += 1;
        }
    }

    // A poisoned lock means a panic mid-write of plain data; recover the
    // guard rather than cascade the panic into every reader.
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
