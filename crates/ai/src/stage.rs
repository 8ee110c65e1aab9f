use async_trait::async_trait;

use crate::fetcher::SalesSnapshot;
use crate::narrator::Narration;
use crate::pipeline::PipelineContext;
use crate::result::AiError;
use crate::signal::RecommendationSignal;

/// Fields produced by one pipeline stage.
///
/// Stages never write into the context themselves; the orchestrator merges
/// the delta into the next context value.
#[derive(Debug, Clone, PartialEq)]
pub enum StageDelta {
    Fetched(SalesSnapshot),
    Evaluated(Vec<RecommendationSignal>),
    Narrated(Narration),
}

impl StageDelta {
    pub fn label(&self) -> &'static str {
        match self {
            StageDelta::Fetched(_) => "fetched",
            StageDelta::Evaluated(_) => "evaluated",
            StageDelta::Narrated(_) => "narrated",
        }
    }
}

/// A single step of the recommendation pipeline.
///
/// Implementations read only the fields written by earlier stages and must
/// not mutate shared state.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Run the stage against the current context.
    async fn run(&self, ctx: &PipelineContext) -> Result<StageDelta, AiError>;
}
