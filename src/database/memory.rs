// In-memory RecordStore used by the test suites.
//
// A scope stages its deletes and applies them to the shared row set only on
// commit, so a dropped or rolled-back scope leaves the rows untouched.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, RecordStore, StoreScope};

#[derive(Default)]
struct Shared {
    rows: Mutex<HashSet<Uuid>>,
    scopes_opened: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    fail_deletes: AtomicBool,
    fail_begin: AtomicBool,
    latency_ms: AtomicU64,
    commit_latency_ms: AtomicU64,
}

impl Shared {
    fn rows(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        // A poisoned lock only means another test thread panicked mid-update
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected_failure(&self, flag: &AtomicBool, what: &str) -> Result<(), DatabaseError> {
        if flag.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError(format!("injected {} failure", what)));
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        pause(&self.latency_ms).await;
    }
}

async fn pause(millis: &AtomicU64) {
    let millis = millis.load(Ordering::SeqCst);
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[derive(Clone)]
pub struct MemoryStore {
    collection: Collection,
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn with_rows(collection: Collection, ids: impl IntoIterator<Item = Uuid>) -> Self {
        let store = Self::new(collection);
        store.insert(ids);
        store
    }

    pub fn insert(&self, ids: impl IntoIterator<Item = Uuid>) {
        self.shared.rows().extend(ids);
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.shared.rows().contains(id)
    }

    pub fn len(&self) -> usize {
        self.shared.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent delete statement fail
    pub fn fail_deletes(&self, fail: bool) {
        self.shared.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `begin` fail
    pub fn fail_begin(&self, fail: bool) {
        self.shared.fail_begin.store(fail, Ordering::SeqCst);
    }

    /// Delay every delete statement by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.shared
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay every scope commit by `latency`
    pub fn set_commit_latency(&self, latency: Duration) {
        self.shared
            .commit_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn scopes_opened(&self) -> usize {
        self.shared.scopes_opened.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn begin(&self) -> Result<Box<dyn StoreScope>, DatabaseError> {
        self.shared.injected_failure(&self.shared.fail_begin, "begin")?;
        self.shared.scopes_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryScope {
            shared: Arc::clone(&self.shared),
            staged: HashSet::new(),
        }))
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        self.shared.simulate_latency().await;
        self.shared.injected_failure(&self.shared.fail_deletes, "delete")?;
        let mut rows = self.shared.rows();
        let removed = ids.iter().filter(|id| rows.remove(*id)).count();
        Ok(removed as u64)
    }
}

struct MemoryScope {
    shared: Arc<Shared>,
    staged: HashSet<Uuid>,
}

#[async_trait]
impl StoreScope for MemoryScope {
    async fn probe(&mut self, ids: &[Uuid]) -> Result<HashSet<Uuid>, DatabaseError> {
        let rows = self.shared.rows();
        Ok(ids
            .iter()
            .filter(|id| rows.contains(*id) && !self.staged.contains(*id))
            .copied()
            .collect())
    }

    async fn delete_many(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        self.shared.simulate_latency().await;
        self.shared.injected_failure(&self.shared.fail_deletes, "delete")?;
        let rows = self.shared.rows();
        let mut removed = 0;
        for id in ids {
            if rows.contains(id) && self.staged.insert(*id) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        pause(&self.shared.commit_latency_ms).await;
        let mut rows = self.shared.rows();
        for id in &self.staged {
            rows.remove(id);
        }
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
