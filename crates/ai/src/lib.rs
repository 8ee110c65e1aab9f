//! `salesadvisor-ai`
//!
//! **Responsibility:** the sales recommendation pipeline.
//!
//! - [`fetcher`] gathers a read-only snapshot of a store's catalog and sales.
//! - [`rules`] turns that snapshot into recommendation signals (pure, deterministic).
//! - [`narrator`] explains the signals in natural language, falling back to a
//!   fixed summary when text generation is unavailable.
//! - [`pipeline`] sequences the three stages for one store.
//!
//! Storage and model hosting stay outside this crate: they are reached through
//! the [`SalesDataSource`] and [`TextGenerator`] seams, implemented in infra.

pub mod fetcher;
pub mod generator;
pub mod narrator;
pub mod pipeline;
pub mod result;
pub mod rules;
pub mod signal;
pub mod source;
pub mod stage;

#[cfg(test)]
mod test_support;

pub use fetcher::{DataFetcher, FetchSource, FetchWarning, SalesSnapshot};
pub use generator::{DisabledGenerator, GenerationError, GenerationRequest, TextGenerator};
pub use narrator::{Narration, Narrator};
pub use pipeline::{PipelineContext, PipelineState, SalesPipeline};
pub use result::{AiError, Recommendation};
pub use rules::RuleEngine;
pub use signal::{RecommendationSignal, SignalAction, SignalSubject, SignalType};
pub use source::{DataSourceError, MovementQuery, SalesDataSource};
pub use stage::{PipelineStage, StageDelta};
