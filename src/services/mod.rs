//! Services Layer
//!
//! Business logic between the HTTP handlers / CLI and the repositories.

pub mod book_service;
pub mod branch_service;
pub mod controller;
pub mod enrichment;
pub mod matching;
pub mod rate_limiter;

pub use controller::{ControllerError, ProgressView, UiController, UiState};
pub use enrichment::{
    EnrichmentOptions, EnrichmentPipeline, EnrichmentReport, Progress, RateLimitPolicy,
};
pub use rate_limiter::{Clock, ManualClock, RateLimiter, TokioClock};
