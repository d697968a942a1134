use std::sync::Arc;

use course_core::Clock;
use storage::{connect_or_null, FrameHost, LessonSession, LocalStore, ProgressBridge};

use crate::catalog_service::CatalogService;
use crate::contact_service::ContactService;
use crate::progress_service::ProgressService;
use crate::recommendation::RecommendationService;

/// What the one-time startup badge shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// A host LMS accepted the session; progress goes through SCORM.
    Connected,
    /// No usable host; progress goes to local storage.
    Demo,
}

impl ConnectionMode {
    #[must_use]
    pub fn badge(self) -> &'static str {
        match self {
            Self::Connected => "SCORM: connected",
            Self::Demo => "SCORM: demo mode",
        }
    }
}

/// Everything the presenting layer needs, wired in the right order.
///
/// Construction initializes the session synchronously before anything
/// reads progress, since `load`'s source selection depends on the
/// connection state.
pub struct AppServices {
    mode: ConnectionMode,
    session: Arc<dyn LessonSession>,
    pub catalog: Arc<CatalogService>,
    pub progress: Arc<ProgressService>,
    pub contact: Arc<ContactService>,
    pub recommendations: Arc<RecommendationService>,
}

impl AppServices {
    /// Bootstrap against a window tree (embedded in an LMS) or none
    /// (standalone), with the given local-store fallback.
    #[must_use]
    pub fn start(
        frame: Option<Arc<dyn FrameHost>>,
        local: Arc<dyn LocalStore>,
        clock: Clock,
    ) -> Self {
        let session = connect_or_null(frame);
        let mode = match session.initialize() {
            Ok(()) => ConnectionMode::Connected,
            Err(err) => {
                tracing::info!(%err, "no LMS session, running in demo mode");
                ConnectionMode::Demo
            }
        };

        let bridge = Arc::new(ProgressBridge::new(Arc::clone(&session), local));
        let catalog = Arc::new(CatalogService::builtin());
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&bridge),
        ));
        let contact = Arc::new(ContactService::new(clock, Arc::clone(&bridge)));
        let recommendations = Arc::new(RecommendationService::new(bridge));

        Self {
            mode,
            session,
            catalog,
            progress,
            contact,
            recommendations,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Page-unload mirror: flush and close the session when one exists.
    pub fn shutdown(&self) {
        if self.session.is_connected() {
            let _ = self.session.commit();
            let _ = self.session.finish();
        }
    }
}
