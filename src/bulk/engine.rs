use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::identifier;
use super::outcome::{BulkDeleteOutcome, PartialOutcome};
use super::request::{DeletionRequest, Strategy};
use super::BulkDeleteError;
use crate::config::BulkConfig;
use crate::database::store::{RecordStore, StoreScope};

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Roll back an atomic delete unless every distinct requested id matched.
    pub strict_atomic: bool,
    /// Upper bound for the work before commit. Expiry drops the open scope;
    /// a commit that has started is allowed to finish.
    pub timeout: Option<Duration>,
}

impl From<&BulkConfig> for EngineOptions {
    fn from(config: &BulkConfig) -> Self {
        Self {
            strict_atomic: config.strict_atomic,
            timeout: (config.timeout_secs > 0).then(|| config.timeout()),
        }
    }
}

/// Runs bulk deletes against one injected store
#[derive(Clone)]
pub struct BulkDeleteEngine {
    store: Arc<dyn RecordStore>,
    options: EngineOptions,
}

impl BulkDeleteEngine {
    pub fn new(store: Arc<dyn RecordStore>, options: EngineOptions) -> Self {
        Self { store, options }
    }

    pub async fn execute(
        &self,
        request: DeletionRequest,
    ) -> Result<BulkDeleteOutcome, BulkDeleteError> {
        let collection = self.store.collection();
        info!(
            "Bulk delete on {}: {} ids, strategy={}",
            collection,
            request.ids.len(),
            request.strategy
        );

        let staged = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, self.stage(request))
                .await
                .map_err(|_elapsed| {
                    warn!("Bulk delete on {} timed out after {:?}", collection, limit);
                    BulkDeleteError::TimedOut(limit)
                })?,
            None => self.stage(request).await,
        }?;
        let outcome = staged.commit().await?;

        info!(
            "Bulk delete on {} finished: strategy={}, deleted={}",
            collection,
            outcome.strategy(),
            outcome.deleted_count()
        );
        Ok(outcome)
    }

    async fn stage(&self, request: DeletionRequest) -> Result<Staged, BulkDeleteError> {
        match request.strategy {
            Strategy::Atomic => {
                let (scope, deleted_count) = self.stage_atomic(&request.ids).await?;
                Ok(Staged {
                    scope: Some(scope),
                    outcome: BulkDeleteOutcome::Atomic { deleted_count },
                })
            }
            Strategy::Partial => {
                let (scope, outcome) = self.stage_partial(&request.ids).await?;
                Ok(Staged {
                    scope,
                    outcome: BulkDeleteOutcome::Partial(outcome),
                })
            }
            Strategy::BestEffort => {
                let deleted_count = self.best_effort(&request.ids).await?;
                Ok(Staged {
                    scope: None,
                    outcome: BulkDeleteOutcome::BestEffort { deleted_count },
                })
            }
        }
    }

    /// All-or-nothing: any malformed id rejects the request before the store is touched,
    /// and a delete that matches nothing is rolled back.
    pub async fn atomic(&self, ids: &[String]) -> Result<u64, BulkDeleteError> {
        let (scope, removed) = self.stage_atomic(ids).await?;
        scope.commit().await?;
        Ok(removed)
    }

    async fn stage_atomic(
        &self,
        ids: &[String],
    ) -> Result<(Box<dyn StoreScope>, u64), BulkDeleteError> {
        let (valid, malformed) = identifier::partition(ids);
        if let Some(first) = malformed.into_iter().next() {
            return Err(BulkDeleteError::InvalidIdentifier(first));
        }

        let mut scope = self.store.begin().await?;

        let removed = match scope.delete_many(&valid).await {
            Ok(removed) => removed,
            Err(e) => return Err(abandon(scope, e.into()).await),
        };

        if removed == 0 {
            return Err(abandon(scope, BulkDeleteError::NoMatchingRecords).await);
        }

        let requested = valid.len();
        if removed != requested as u64 {
            if self.options.strict_atomic {
                let err = BulkDeleteError::IncompleteMatch {
                    requested,
                    matched: removed,
                };
                return Err(abandon(scope, err).await);
            }
            debug!(
                "Atomic delete matched {} of {} ids; committing",
                removed, requested
            );
        }

        Ok((scope, removed))
    }

    /// Remove what can be removed and classify every id as deleted or failed.
    pub async fn partial(&self, ids: &[String]) -> Result<PartialOutcome, BulkDeleteError> {
        let (scope, outcome) = self.stage_partial(ids).await?;
        if let Some(scope) = scope {
            scope.commit().await?;
        }
        Ok(outcome)
    }

    /// Every probed id counts as deleted, even when the statement reports fewer rows.
    async fn stage_partial(
        &self,
        ids: &[String],
    ) -> Result<(Option<Box<dyn StoreScope>>, PartialOutcome), BulkDeleteError> {
        let (valid, malformed) = identifier::partition(ids);
        if valid.is_empty() {
            debug!("Partial delete: no well-formed ids, store untouched");
            return Ok((None, PartialOutcome::new(Vec::new(), malformed, Vec::new())));
        }

        let mut scope = self.store.begin().await?;

        let existing = match scope.probe(&valid).await {
            Ok(existing) => existing,
            Err(e) => return Err(abandon(scope, e.into()).await),
        };

        let (present, missing): (Vec<Uuid>, Vec<Uuid>) =
            valid.into_iter().partition(|id| existing.contains(id));

        if !present.is_empty() {
            match scope.delete_many(&present).await {
                Ok(removed) if removed != present.len() as u64 => debug!(
                    "Partial delete removed {} rows for {} probed ids",
                    removed,
                    present.len()
                ),
                Ok(_) => {}
                Err(e) => return Err(abandon(scope, e.into()).await),
            }
        }

        Ok((Some(scope), PartialOutcome::new(present, malformed, missing)))
    }

    /// Skip malformed ids and delete the rest in one statement; nothing to delete is success.
    pub async fn best_effort(&self, ids: &[String]) -> Result<u64, BulkDeleteError> {
        let (valid, malformed) = identifier::partition(ids);
        if !malformed.is_empty() {
            debug!("Best-effort delete skipping {} malformed ids", malformed.len());
        }
        if valid.is_empty() {
            return Ok(0);
        }

        Ok(self.store.delete_many(&valid).await?)
    }
}

/// A strategy run whose scope, if any, is still waiting to commit
struct Staged {
    scope: Option<Box<dyn StoreScope>>,
    outcome: BulkDeleteOutcome,
}

impl Staged {
    async fn commit(self) -> Result<BulkDeleteOutcome, BulkDeleteError> {
        if let Some(scope) = self.scope {
            scope.commit().await?;
        }
        Ok(self.outcome)
    }
}

/// Roll back and hand back `err`. A failed rollback is only logged; the scope is
/// dropped either way and the store discards the transaction.
async fn abandon(scope: Box<dyn StoreScope>, err: BulkDeleteError) -> BulkDeleteError {
    if let Err(rollback_err) = scope.rollback().await {
        warn!("Rollback failed after '{}': {}", err, rollback_err);
    } else {
        debug!("Rolled back bulk delete: {}", err);
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use async_trait::async_trait;

    use crate::database::manager::DatabaseError;
    use crate::database::memory::MemoryStore;
    use crate::database::store::Collection;

    const FIRST: &str = "11111111-1111-1111-1111-111111111111";
    const SECOND: &str = "22222222-2222-2222-2222-222222222222";
    const ABSENT: &str = "33333333-3333-3333-3333-333333333333";

    fn uuid(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_rows(Collection::Restaurants, [uuid(FIRST), uuid(SECOND)])
    }

    fn engine(store: &MemoryStore) -> BulkDeleteEngine {
        BulkDeleteEngine::new(Arc::new(store.clone()), EngineOptions::default())
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn request(raw: &[&str], strategy: Strategy) -> DeletionRequest {
        DeletionRequest::new(ids(raw), strategy).unwrap()
    }

    #[tokio::test]
    async fn atomic_removes_all_existing_ids() {
        let store = seeded();
        let removed = engine(&store).atomic(&ids(&[FIRST, SECOND])).await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.is_empty());
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn atomic_rejects_malformed_before_opening_a_scope() {
        let store = seeded();
        let err = engine(&store)
            .atomic(&ids(&[FIRST, "not-a-uuid"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BulkDeleteError::InvalidIdentifier(ref id) if id == "not-a-uuid"));
        assert_eq!(store.scopes_opened(), 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn atomic_with_no_matches_rolls_back_with_not_found() {
        let store = seeded();
        let err = engine(&store).atomic(&ids(&[ABSENT])).await.unwrap_err();

        assert!(matches!(err, BulkDeleteError::NoMatchingRecords));
        assert_eq!(store.rollbacks(), 1);
        assert_eq!(store.commits(), 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn atomic_commits_a_partial_match_by_default() {
        let store = seeded();
        let removed = engine(&store).atomic(&ids(&[FIRST, ABSENT])).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!store.contains(&uuid(FIRST)));
        assert!(store.contains(&uuid(SECOND)));
    }

    #[tokio::test]
    async fn strict_atomic_rolls_back_a_partial_match() {
        let store = seeded();
        let strict = BulkDeleteEngine::new(
            Arc::new(store.clone()),
            EngineOptions {
                strict_atomic: true,
                timeout: None,
            },
        );

        let err = strict.atomic(&ids(&[FIRST, ABSENT])).await.unwrap_err();
        assert!(matches!(
            err,
            BulkDeleteError::IncompleteMatch { requested: 2, matched: 1 }
        ));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn atomic_store_error_rolls_back() {
        let store = seeded();
        store.fail_deletes(true);

        let err = engine(&store).atomic(&ids(&[FIRST])).await.unwrap_err();
        assert!(matches!(err, BulkDeleteError::Store(_)));
        assert_eq!(store.rollbacks(), 1);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn atomic_counts_duplicates_once() {
        let store = seeded();
        let upper = FIRST.to_uppercase();
        let removed = engine(&store)
            .atomic(&ids(&[FIRST, FIRST, upper.as_str()]))
            .await
            .unwrap();

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn partial_classifies_malformed_and_deletes_the_rest() {
        let store = seeded();
        let outcome = engine(&store)
            .partial(&ids(&[FIRST, "not-a-uuid"]))
            .await
            .unwrap();

        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.failed_count, 1);
        assert_eq!(outcome.deleted_ids, vec![FIRST.to_string()]);
        assert_eq!(outcome.failed_ids, vec!["not-a-uuid".to_string()]);
        assert!(!store.contains(&uuid(FIRST)));
    }

    #[tokio::test]
    async fn partial_reports_missing_ids_as_not_found() {
        let store = seeded();
        let outcome = engine(&store)
            .partial(&ids(&[FIRST, ABSENT, "bad"]))
            .await
            .unwrap();

        assert_eq!(outcome.deleted_ids, vec![FIRST.to_string()]);
        assert_eq!(outcome.failures.not_found, vec![ABSENT.to_string()]);
        assert_eq!(outcome.failures.malformed, vec!["bad".to_string()]);
        assert_eq!(outcome.failed_count, 2);
    }

    #[tokio::test]
    async fn partial_with_only_malformed_ids_never_opens_a_scope() {
        let store = seeded();
        let outcome = engine(&store).partial(&ids(&["a", "b", "a"])).await.unwrap();

        assert_eq!(outcome.deleted_count, 0);
        assert_eq!(outcome.failed_ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.scopes_opened(), 0);
    }

    #[tokio::test]
    async fn partial_store_error_discards_all_accounting() {
        let store = seeded();
        store.fail_deletes(true);

        let err = engine(&store)
            .partial(&ids(&[FIRST, SECOND]))
            .await
            .unwrap_err();
        assert!(matches!(err, BulkDeleteError::Store(_)));
        assert_eq!(store.rollbacks(), 1);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn partial_is_idempotent() {
        let store = seeded();
        let engine = engine(&store);
        let raw = ids(&[FIRST, SECOND]);

        let first = engine.partial(&raw).await.unwrap();
        assert_eq!(first.deleted_count, 2);
        assert_eq!(first.failed_count, 0);

        let second = engine.partial(&raw).await.unwrap();
        assert_eq!(second.deleted_count, 0);
        assert_eq!(second.failed_count, 2);
    }

    #[tokio::test]
    async fn best_effort_ignores_malformed_and_missing() {
        let store = seeded();
        let removed = engine(&store)
            .best_effort(&ids(&[FIRST, "junk", ABSENT]))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.scopes_opened(), 0);
    }

    #[tokio::test]
    async fn best_effort_with_nothing_valid_is_zero_not_error() {
        let store = seeded();
        assert_eq!(engine(&store).best_effort(&ids(&["junk"])).await.unwrap(), 0);
        assert_eq!(engine(&store).best_effort(&ids(&[ABSENT])).await.unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn best_effort_store_error_surfaces() {
        let store = seeded();
        store.fail_deletes(true);

        let err = engine(&store).best_effort(&ids(&[FIRST])).await.unwrap_err();
        assert!(matches!(err, BulkDeleteError::Store(_)));
    }

    #[tokio::test]
    async fn execute_dispatches_on_strategy() {
        let store = seeded();
        let engine = engine(&store);

        let outcome = engine
            .execute(request(&[FIRST], Strategy::BestEffort))
            .await
            .unwrap();
        assert_eq!(outcome, BulkDeleteOutcome::BestEffort { deleted_count: 1 });

        let outcome = engine
            .execute(request(&[SECOND], Strategy::Atomic))
            .await
            .unwrap();
        assert_eq!(outcome, BulkDeleteOutcome::Atomic { deleted_count: 1 });

        let outcome = engine
            .execute(request(&[FIRST], Strategy::Partial))
            .await
            .unwrap();
        assert!(matches!(outcome, BulkDeleteOutcome::Partial(ref p) if p.failed_count == 1));
    }

    #[tokio::test]
    async fn timeout_drops_the_scope_without_committing() {
        let store = seeded();
        store.set_latency(Duration::from_millis(200));
        let engine = BulkDeleteEngine::new(
            Arc::new(store.clone()),
            EngineOptions {
                strict_atomic: false,
                timeout: Some(Duration::from_millis(20)),
            },
        );

        let err = engine
            .execute(request(&[FIRST, SECOND], Strategy::Atomic))
            .await
            .unwrap_err();

        assert!(matches!(err, BulkDeleteError::TimedOut(_)));
        assert_eq!(store.commits(), 0);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn slow_commit_is_not_cut_off_by_the_deadline() {
        let store = seeded();
        store.set_commit_latency(Duration::from_millis(100));
        let engine = BulkDeleteEngine::new(
            Arc::new(store.clone()),
            EngineOptions {
                strict_atomic: false,
                timeout: Some(Duration::from_millis(20)),
            },
        );

        let outcome = engine
            .execute(request(&[FIRST, ABSENT], Strategy::Partial))
            .await
            .unwrap();

        assert_eq!(outcome.deleted_count(), 1);
        assert_eq!(store.commits(), 1);
        assert!(!store.contains(&uuid(FIRST)));
    }

    /// Finds every id but reports a single row per delete statement.
    struct ShortCountStore;

    struct ShortCountScope;

    #[async_trait]
    impl RecordStore for ShortCountStore {
        fn collection(&self) -> Collection {
            Collection::Restaurants
        }

        async fn begin(&self) -> Result<Box<dyn StoreScope>, DatabaseError> {
            Ok(Box::new(ShortCountScope))
        }

        async fn delete_many(&self, _ids: &[Uuid]) -> Result<u64, DatabaseError> {
            Ok(1)
        }
    }

    #[async_trait]
    impl StoreScope for ShortCountScope {
        async fn probe(&mut self, ids: &[Uuid]) -> Result<HashSet<Uuid>, DatabaseError> {
            Ok(ids.iter().copied().collect())
        }

        async fn delete_many(&mut self, _ids: &[Uuid]) -> Result<u64, DatabaseError> {
            Ok(1)
        }

        async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn partial_counts_probed_ids_when_row_count_comes_up_short() {
        let engine = BulkDeleteEngine::new(Arc::new(ShortCountStore), EngineOptions::default());

        let outcome = engine.partial(&ids(&[FIRST, SECOND])).await.unwrap();

        assert_eq!(outcome.deleted_count, 2);
        assert_eq!(outcome.deleted_ids, ids(&[FIRST, SECOND]));
        assert_eq!(outcome.failed_count, 0);
        assert!(outcome.failed_ids.is_empty());
        assert_eq!(outcome.status(), axum::http::StatusCode::OK);
    }
}
