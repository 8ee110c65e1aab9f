use serde::Serialize;
use thiserror::Error;

use salesadvisor_core::DomainError;

use crate::signal::RecommendationSignal;

/// Outcome of a pipeline run for one store.
///
/// This is a computed insight, not persisted state: callers display it and
/// discard it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Natural-language explanation (or a fixed fallback).
    pub summary: String,

    /// Raw signals, in rule-evaluation order.
    pub recommendations: Vec<RecommendationSignal>,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid pipeline input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AiError {
    fn from(value: DomainError) -> Self {
        AiError::InvalidInput(value.detail().to_string())
    }
}
