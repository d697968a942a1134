#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod contact_service;
pub mod error;
pub mod progress_service;
pub mod recommendation;

pub use course_core::Clock;

pub use app_services::{AppServices, ConnectionMode};
pub use catalog_service::CatalogService;
pub use contact_service::ContactService;
pub use error::{ContactServiceError, ProgressServiceError, RecommendationError};
pub use progress_service::{CompletionOutcome, ProgressService, ProgressView};
pub use recommendation::{
    Audience, Component, Goal, Recommendation, RecommendationRequest, RecommendationService,
};
