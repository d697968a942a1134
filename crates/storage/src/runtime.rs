use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The status string a SCORM 1.2 runtime returns on success. Anything else,
/// or a faulting call, is failure.
pub const SCORM_TRUE: &str = "true";

/// A fault raised by host-provided runtime code.
///
/// Host runtimes are injected third-party objects and fail in arbitrary
/// ways; implementations map whatever went wrong (a thrown exception, a
/// dead bridge, a cross-origin denial) into this one opaque error. The
/// session adapter never lets it cross its own boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("host runtime fault: {0}")]
pub struct HostFault(pub String);

impl HostFault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The SCORM 1.2 runtime contract, exactly the five calls the presenter
/// uses. Satisfied by a real host adaptor or a test double.
pub trait RuntimeApi: Send + Sync {
    /// `LMSInitialize`. Success is the literal status string `"true"`.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the underlying host call fails outright.
    fn initialize(&self, arg: &str) -> Result<String, HostFault>;

    /// `LMSGetValue` for a data-model element.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the underlying host call fails outright.
    fn get_value(&self, element: &str) -> Result<String, HostFault>;

    /// `LMSSetValue`. Success is the status string `"true"`.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the underlying host call fails outright.
    fn set_value(&self, element: &str, value: &str) -> Result<String, HostFault>;

    /// `LMSCommit`. Success is the status string `"true"`.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the underlying host call fails outright.
    fn commit(&self, arg: &str) -> Result<String, HostFault>;

    /// `LMSFinish`. Success is the status string `"true"`.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the underlying host call fails outright.
    fn terminate(&self, arg: &str) -> Result<String, HostFault>;
}

/// The data-model elements this presenter reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataModelElement {
    LessonStatus,
    ScoreRaw,
    LessonLocation,
    SuspendData,
}

impl DataModelElement {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessonStatus => "cmi.core.lesson_status",
            Self::ScoreRaw => "cmi.core.score.raw",
            Self::LessonLocation => "cmi.core.lesson_location",
            Self::SuspendData => "cmi.suspend_data",
        }
    }
}

impl fmt::Display for DataModelElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `cmi.core.lesson_status` vocabulary. Only `incomplete` and `completed`
/// are ever written; the rest can come back from an LMS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonStatus {
    Passed,
    Completed,
    Failed,
    Incomplete,
    Browsed,
    NotAttempted,
}

impl LessonStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Incomplete => "incomplete",
            Self::Browsed => "browsed",
            Self::NotAttempted => "not attempted",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a `LessonStatus` from a host-reported string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown lesson status: {:?}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for LessonStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "passed" => Ok(Self::Passed),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "incomplete" => Ok(Self::Incomplete),
            "browsed" => Ok(Self::Browsed),
            "not attempted" => Ok(Self::NotAttempted),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
