//! Immutable service context and the per-sample scoring pipeline.
//!
//! raw sample → validate → materialize → score → attribute → rank → compose.
//! The context is built once at startup and shared read-only by every request.

mod context;

pub use context::{machine_id_of, BatchOutcome, Prediction, ServiceContext};
pub(crate) use context::round_to;

use crate::explain::RankError;
use crate::features::ValidationError;
use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Recoverable per request; surfaced as 400.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("scoring failed: {0}")]
    ScoringFailure(String),
    #[error("attribution failed: {0}")]
    AttributionFailure(String),
}

impl ServiceError {
    fn scoring(err: ModelError) -> Self {
        ServiceError::ScoringFailure(err.to_string())
    }

    fn attribution(err: impl std::fmt::Display) -> Self {
        ServiceError::AttributionFailure(err.to_string())
    }
}

impl From<RankError> for ServiceError {
    fn from(err: RankError) -> Self {
        ServiceError::attribution(err)
    }
}
