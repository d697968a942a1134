//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{ContactError, UnitId};

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("unit {0} is not in the catalog")]
    UnknownUnit(UnitId),
}

/// Errors emitted by `ContactService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContactServiceError {
    #[error(transparent)]
    Invalid(#[from] ContactError),
}

/// Errors emitted by the recommendation builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error("a goal must be selected")]
    MissingGoal,

    #[error("an audience must be selected")]
    MissingAudience,

    #[error("at least one component must be selected")]
    NoComponents,
}
