use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use course_core::model::ProgressDocument;

use crate::envelope::SuspendEnvelope;
use crate::local::{keys, LocalStore, StorageError};
use crate::runtime::{DataModelElement, LessonStatus};
use crate::session::{LessonSession, SessionError};

/// Errors surfaced by the bridge. Persistence is best effort: callers log
/// and move on, they never retry or show these to the learner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StorageError),

    #[error("progress serialization failed: {0}")]
    Serialization(String),
}

/// Persists the progress document through whichever backing store exists.
///
/// Connected sessions write into the suspend-data envelope's `progress`
/// field (read-merge-write, so the `contact` field is preserved);
/// otherwise the document goes to the dedicated local key. Reads try the
/// SCORM side first and fall through to local storage; that precedence
/// is fixed.
pub struct ProgressBridge {
    session: Arc<dyn LessonSession>,
    local: Arc<dyn LocalStore>,
}

impl ProgressBridge {
    #[must_use]
    pub fn new(session: Arc<dyn LessonSession>, local: Arc<dyn LocalStore>) -> Self {
        Self { session, local }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn LessonSession> {
        &self.session
    }

    #[must_use]
    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Write the document to the active backing store.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` when the write fails; nothing is retried.
    pub fn save(&self, document: &ProgressDocument) -> Result<(), BridgeError> {
        if self.session.is_connected() {
            // An unreadable envelope is treated as empty rather than
            // blocking the save.
            let raw = self.session.suspend_data().unwrap_or_default();
            let mut envelope = SuspendEnvelope::parse(&raw);
            envelope.set_progress(document);
            self.session.set_suspend_data(&envelope.to_json())?;
            self.session.commit()?;
            return Ok(());
        }

        let raw = serde_json::to_string(document)
            .map_err(|e| BridgeError::Serialization(e.to_string()))?;
        self.local.set(keys::PROGRESS, &raw)?;
        Ok(())
    }

    /// Read the document back, starting empty when neither source has a
    /// usable one.
    ///
    /// SCORM takes precedence: a connected session's envelope is adopted
    /// when its `progress` field holds a valid completed-units array, and
    /// only otherwise does the local key get a look.
    #[must_use]
    pub fn load(&self, now: DateTime<Utc>) -> ProgressDocument {
        if self.session.is_connected() {
            let raw = self.session.suspend_data().unwrap_or_default();
            if let Some(document) = SuspendEnvelope::parse(&raw).progress() {
                return document;
            }
            tracing::debug!("suspend data held no usable progress, trying local store");
        }

        self.load_local()
            .unwrap_or_else(|| ProgressDocument::empty(now))
    }

    fn load_local(&self) -> Option<ProgressDocument> {
        let raw = self.local.get(keys::PROGRESS).ok().flatten()?;
        let value = serde_json::from_str::<Value>(&raw).ok()?;
        ProgressDocument::from_value(&value)
    }

    /// Record the free-text location marker.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` when the write fails.
    pub fn save_location(&self, location: &str) -> Result<(), BridgeError> {
        if self.session.is_connected() {
            self.session
                .set_value(DataModelElement::LessonLocation.as_str(), location)?;
            self.session.commit()?;
            return Ok(());
        }
        self.local.set(keys::LOCATION, location)?;
        Ok(())
    }

    /// Record the lesson status.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` when the write fails.
    pub fn save_status(&self, status: LessonStatus) -> Result<(), BridgeError> {
        if self.session.is_connected() {
            self.session.set_status(status)?;
            self.session.commit()?;
            return Ok(());
        }
        self.local.set(keys::STATUS, status.as_str())?;
        Ok(())
    }
}
