use std::sync::{Arc, Mutex};

use course_core::model::{ProgressDocument, UnitId};
use course_core::Clock;
use storage::{LessonStatus, ProgressBridge};

use crate::catalog_service::CatalogService;
use crate::error::ProgressServiceError;

/// Aggregated completion state for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressView {
    pub completed: usize,
    pub total: usize,
    pub is_complete: bool,
}

/// Outcome of marking a unit complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The unit was newly completed; `all_complete` reports whether that
    /// finished the whole catalog.
    Newly { all_complete: bool },
    /// The unit had been completed before; nothing was written.
    AlreadyCompleted,
}

/// The completion workflow: owns the progress document, persists every
/// mutation through the bridge, and flips the lesson status to completed
/// once the whole catalog is done.
///
/// Persistence is best effort: a failed save is logged and the in-memory
/// document stays authoritative for the rest of the session.
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<CatalogService>,
    bridge: Arc<ProgressBridge>,
    document: Mutex<ProgressDocument>,
}

impl ProgressService {
    /// Build the service, loading the persisted document once.
    ///
    /// The session must already be initialized (or have failed to); the
    /// load path depends on its connection state.
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<CatalogService>, bridge: Arc<ProgressBridge>) -> Self {
        let document = bridge.load(clock.now());
        Self {
            clock,
            catalog,
            bridge,
            document: Mutex::new(document),
        }
    }

    /// Mark a unit complete and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUnit` for an id outside the
    /// catalog. Persistence failures are logged, not returned.
    pub fn mark_completed(&self, id: UnitId) -> Result<CompletionOutcome, ProgressServiceError> {
        if self.catalog.get(id).is_none() {
            return Err(ProgressServiceError::UnknownUnit(id));
        }

        let now = self.clock.now();
        let (document, newly) = {
            let mut guard = self
                .document
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let newly = guard.mark_completed(id, now);
            (guard.clone(), newly)
        };
        if !newly {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        if let Err(err) = self.bridge.save(&document) {
            tracing::warn!(%err, unit = %id, "progress save failed");
        }
        if let Err(err) = self
            .bridge
            .save_location(&format!("unit_{id}_completed"))
        {
            tracing::debug!(%err, "location save failed");
        }

        let all_complete = document.completed_count() == self.catalog.len();
        if all_complete {
            if let Err(err) = self.bridge.save_status(LessonStatus::Completed) {
                tracing::warn!(%err, "completed-status save failed");
            }
        }

        Ok(CompletionOutcome::Newly { all_complete })
    }

    #[must_use]
    pub fn is_completed(&self, id: UnitId) -> bool {
        self.document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_completed(id)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressView {
        let completed = self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .completed_count();
        let total = self.catalog.len();
        ProgressView {
            completed,
            total,
            is_complete: total > 0 && completed == total,
        }
    }

    /// Snapshot of the current document.
    #[must_use]
    pub fn document(&self) -> ProgressDocument {
        self.document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::fixed_clock;
    use storage::{keys, LocalStore, MemoryStore, NullSession};

    fn service() -> (ProgressService, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let bridge = Arc::new(ProgressBridge::new(Arc::new(NullSession), local.clone()));
        let catalog = Arc::new(CatalogService::builtin());
        (ProgressService::new(fixed_clock(), catalog, bridge), local)
    }

    #[test]
    fn marking_persists_and_updates_the_view() {
        let (service, local) = service();

        let outcome = service.mark_completed(UnitId::new(3)).unwrap();
        assert_eq!(outcome, CompletionOutcome::Newly { all_complete: false });
        assert!(service.is_completed(UnitId::new(3)));
        assert_eq!(service.progress().completed, 1);

        let raw = local.get(keys::PROGRESS).unwrap().unwrap();
        assert!(raw.contains("\"completedUnits\":[3]"));
        assert_eq!(
            local.get(keys::LOCATION).unwrap().as_deref(),
            Some("unit_3_completed")
        );
    }

    #[test]
    fn remarking_is_a_quiet_no_op() {
        let (service, local) = service();
        service.mark_completed(UnitId::new(1)).unwrap();
        local.remove(keys::PROGRESS).unwrap();

        let outcome = service.mark_completed(UnitId::new(1)).unwrap();
        assert_eq!(outcome, CompletionOutcome::AlreadyCompleted);
        // No rewrite happened.
        assert_eq!(local.get(keys::PROGRESS).unwrap(), None);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let (service, _) = service();
        assert_eq!(
            service.mark_completed(UnitId::new(42)).unwrap_err(),
            ProgressServiceError::UnknownUnit(UnitId::new(42))
        );
    }

    #[test]
    fn finishing_the_catalog_records_completed_status() {
        let (service, local) = service();
        for id in 1..=7 {
            let outcome = service.mark_completed(UnitId::new(id)).unwrap();
            let expect_all = id == 7;
            assert_eq!(
                outcome,
                CompletionOutcome::Newly {
                    all_complete: expect_all
                }
            );
        }
        assert!(service.progress().is_complete);
        assert_eq!(local.get(keys::STATUS).unwrap().as_deref(), Some("completed"));
    }

    #[test]
    fn picks_up_previously_persisted_progress() {
        let local = Arc::new(MemoryStore::new());
        local
            .set(keys::PROGRESS, r#"{"completedUnits":[2,5]}"#)
            .unwrap();
        let bridge = Arc::new(ProgressBridge::new(Arc::new(NullSession), local));
        let service =
            ProgressService::new(fixed_clock(), Arc::new(CatalogService::builtin()), bridge);

        assert_eq!(service.progress().completed, 2);
        assert!(service.is_completed(UnitId::new(5)));
    }
}
