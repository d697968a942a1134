use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::locator::{ApiLocator, FrameHost};
use crate::runtime::{DataModelElement, HostFault, LessonStatus, RuntimeApi, SCORM_TRUE};

/// Host-imposed cap on the suspend-data string. Writes beyond it are
/// silently truncated, not rejected.
pub const SUSPEND_DATA_LIMIT: usize = 4096;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Failure values for session operations.
///
/// Host runtimes are unreliable third-party code, so nothing here is ever
/// allowed to escalate past a returned error: a fault is caught at the
/// call site and translated into one of these variants, and the worst a
/// caller sees is an `Err`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no host session is connected")]
    NotConnected,

    #[error("host runtime rejected {op}")]
    HostRejected { op: &'static str },

    #[error(transparent)]
    Host(#[from] HostFault),
}

//
// ─── CONTRACT ──────────────────────────────────────────────────────────────────
//

/// The session contract every consumer depends on.
///
/// Implemented by [`ScormSession`] over a real (or faked) host runtime and
/// by [`NullSession`] when no runtime exists, so dependent code calls it
/// unconditionally. Convenience accessors are provided methods layered on
/// `get_value`/`set_value`.
pub trait LessonSession: Send + Sync {
    /// Locate the host API and open the session.
    ///
    /// On success the session is connected and `cmi.core.lesson_status`
    /// is guaranteed non-empty (freshly seeded to `incomplete` when the
    /// host reports it blank). Idempotent once connected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when no API is reachable or the host
    /// refuses to initialize; the session stays disconnected.
    fn initialize(&self) -> Result<(), SessionError>;

    /// True iff an API was located and the host accepted initialization.
    fn is_connected(&self) -> bool;

    /// Read a data-model element.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when disconnected or the host call fails.
    fn get_value(&self, element: &str) -> Result<String, SessionError>;

    /// Write a data-model element.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when disconnected, the host call fails, or
    /// the host answers with a non-success status.
    fn set_value(&self, element: &str, value: &str) -> Result<(), SessionError>;

    /// Flush pending writes to the host.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when disconnected or the host refuses.
    fn commit(&self) -> Result<(), SessionError>;

    /// Commit, then terminate the session.
    ///
    /// The session is disconnected afterwards no matter what the host's
    /// terminate call reports; termination is never retried.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when already disconnected or the host's
    /// terminate call did not succeed.
    fn finish(&self) -> Result<(), SessionError>;

    /// Write `cmi.core.lesson_status`.
    ///
    /// # Errors
    ///
    /// Same failure modes as `set_value`.
    fn set_status(&self, status: LessonStatus) -> Result<(), SessionError> {
        self.set_value(DataModelElement::LessonStatus.as_str(), status.as_str())
    }

    /// Write `cmi.core.score.raw`, clamped to [0, 100]. NaN clamps to 0.
    ///
    /// # Errors
    ///
    /// Same failure modes as `set_value`.
    fn set_score(&self, raw: f64) -> Result<(), SessionError> {
        let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
        self.set_value(DataModelElement::ScoreRaw.as_str(), &format_score(clamped))
    }

    /// Read `cmi.suspend_data`.
    ///
    /// # Errors
    ///
    /// Same failure modes as `get_value`.
    fn suspend_data(&self) -> Result<String, SessionError> {
        self.get_value(DataModelElement::SuspendData.as_str())
    }

    /// Write `cmi.suspend_data`, silently truncating past the host's
    /// [`SUSPEND_DATA_LIMIT`].
    ///
    /// # Errors
    ///
    /// Same failure modes as `set_value`; oversized input alone is never
    /// an error.
    fn set_suspend_data(&self, data: &str) -> Result<(), SessionError> {
        self.set_value(
            DataModelElement::SuspendData.as_str(),
            truncate_chars(data, SUSPEND_DATA_LIMIT),
        )
    }
}

/// Truncate to `limit` characters on a char boundary.
fn truncate_chars(data: &str, limit: usize) -> &str {
    match data.char_indices().nth(limit) {
        Some((index, _)) => &data[..index],
        None => data,
    }
}

/// SCORM 1.2 stores the raw score as a number string; render integral
/// values without a trailing `.0`.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score}")
    }
}

//
// ─── SCORM SESSION ─────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Inner {
    api: Option<Arc<dyn RuntimeApi>>,
    connected: bool,
}

/// Session adapter over a located SCORM 1.2 runtime.
///
/// Two states: disconnected (initial) and connected. All data-model
/// operations fail with `NotConnected` until `initialize` succeeds. The
/// two-field state sits behind a mutex only so one session can be shared
/// as `Arc<dyn LessonSession>`; the runtime model is single-threaded and
/// the lock is uncontended.
pub struct ScormSession {
    locator: ApiLocator,
    inner: Mutex<Inner>,
}

impl ScormSession {
    #[must_use]
    pub fn new(locator: ApiLocator) -> Self {
        Self {
            locator,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Build a session searching from the given window.
    #[must_use]
    pub fn from_frame(start: Arc<dyn FrameHost>) -> Self {
        Self::new(ApiLocator::new(start))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, SessionError> {
        // A poisoned lock means a panic elsewhere; degrade to the
        // conservative sentinel rather than propagating.
        self.inner.lock().map_err(|_| SessionError::NotConnected)
    }

    fn connected_api(&self) -> Result<Arc<dyn RuntimeApi>, SessionError> {
        let inner = self.lock()?;
        if !inner.connected {
            return Err(SessionError::NotConnected);
        }
        inner.api.clone().ok_or(SessionError::NotConnected)
    }
}

impl LessonSession for ScormSession {
    fn initialize(&self) -> Result<(), SessionError> {
        {
            let mut inner = self.lock()?;
            if inner.connected {
                return Ok(());
            }
            let Some(api) = self.locator.locate() else {
                return Err(SessionError::NotConnected);
            };
            match api.initialize("") {
                Ok(status) if status == SCORM_TRUE => {}
                Ok(status) => {
                    tracing::warn!(%status, "host refused LMSInitialize");
                    return Err(SessionError::HostRejected { op: "initialize" });
                }
                Err(fault) => {
                    tracing::warn!(%fault, "LMSInitialize faulted");
                    return Err(fault.into());
                }
            }
            inner.api = Some(api);
            inner.connected = true;
        }

        // First launch has a blank status; seed it so every session has a
        // defined value from the start. Best effort.
        let status = self.get_value(DataModelElement::LessonStatus.as_str());
        if status.unwrap_or_default().is_empty() {
            let _ = self.set_status(LessonStatus::Incomplete);
            let _ = self.commit();
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock()
            .map(|inner| inner.connected && inner.api.is_some())
            .unwrap_or(false)
    }

    fn get_value(&self, element: &str) -> Result<String, SessionError> {
        let api = self.connected_api()?;
        api.get_value(element).map_err(SessionError::from)
    }

    fn set_value(&self, element: &str, value: &str) -> Result<(), SessionError> {
        let api = self.connected_api()?;
        match api.set_value(element, value)? {
            status if status == SCORM_TRUE => Ok(()),
            _ => Err(SessionError::HostRejected { op: "set_value" }),
        }
    }

    fn commit(&self) -> Result<(), SessionError> {
        let api = self.connected_api()?;
        match api.commit("")? {
            status if status == SCORM_TRUE => Ok(()),
            _ => Err(SessionError::HostRejected { op: "commit" }),
        }
    }

    fn finish(&self) -> Result<(), SessionError> {
        let mut inner = self.lock()?;
        if !inner.connected {
            return Err(SessionError::NotConnected);
        }
        let api = inner.api.clone().ok_or(SessionError::NotConnected)?;

        // Disconnect first: whatever the host says next, this session is
        // over and must never be left half-open or retried.
        inner.connected = false;
        drop(inner);

        let _ = api.commit("");
        match api.terminate("") {
            Ok(status) if status == SCORM_TRUE => Ok(()),
            Ok(_) => Err(SessionError::HostRejected { op: "terminate" }),
            Err(fault) => {
                tracing::debug!(%fault, "LMSFinish faulted after disconnect");
                Err(fault.into())
            }
        }
    }
}

//
// ─── NULL SESSION ──────────────────────────────────────────────────────────────
//

/// Stand-in adapter for running outside any LMS.
///
/// Every operation is an immediate no-op returning its failure sentinel,
/// so dependent code never branches on availability; the persistence
/// bridge alone decides between the host path and local storage, via
/// `is_connected`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSession;

impl LessonSession for NullSession {
    fn initialize(&self) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn get_value(&self, _element: &str) -> Result<String, SessionError> {
        Err(SessionError::NotConnected)
    }

    fn set_value(&self, _element: &str, _value: &str) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }

    fn commit(&self) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }

    fn finish(&self) -> Result<(), SessionError> {
        Err(SessionError::NotConnected)
    }
}

/// Build a real session if a window tree exists, otherwise the null one.
#[must_use]
pub fn connect_or_null(start: Option<Arc<dyn FrameHost>>) -> Arc<dyn LessonSession> {
    match start {
        Some(frame) => Arc::new(ScormSession::from_frame(frame)),
        None => Arc::new(NullSession),
    }
}
