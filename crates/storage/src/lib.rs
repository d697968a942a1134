#![forbid(unsafe_code)]

//! Connectivity and persistence for the unit presenter.
//!
//! The SCORM 1.2 side lives behind two seams: [`runtime::RuntimeApi`], the
//! five-call contract a host LMS injects, and [`locator::FrameHost`], the
//! window tree it is found in. [`session::ScormSession`] wraps a located API
//! in a connected/disconnected state machine, and [`session::NullSession`]
//! stands in when no host exists so callers never branch on availability.
//! [`progress::ProgressBridge`] persists the progress document through
//! suspend data or, disconnected, through a [`local::LocalStore`].

pub mod envelope;
pub mod local;
pub mod locator;
pub mod progress;
pub mod runtime;
pub mod session;

pub use envelope::SuspendEnvelope;
pub use local::{keys, FileStore, LocalStore, MemoryStore, StorageError};
pub use locator::{ApiLocator, FrameHost};
pub use progress::{BridgeError, ProgressBridge};
pub use runtime::{DataModelElement, HostFault, LessonStatus, RuntimeApi, SCORM_TRUE};
pub use session::{
    connect_or_null, LessonSession, NullSession, ScormSession, SessionError, SUSPEND_DATA_LIMIT,
};
