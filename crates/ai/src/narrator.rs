//! Narrator: explains recommendation signals in natural language.
//!
//! Narration is best-effort. Any failure of the text-generation call
//! (error, timeout, empty text) yields [`FALLBACK_SUMMARY`] and the signals
//! are returned untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::pipeline::PipelineContext;
use crate::result::AiError;
use crate::signal::RecommendationSignal;
use crate::stage::{PipelineStage, StageDelta};

/// Summary returned when there is nothing to recommend.
pub const NO_RECOMMENDATIONS_SUMMARY: &str =
    "No specific recommendations at this time. Your store performance looks good!";

/// Summary returned when text generation fails.
pub const FALLBACK_SUMMARY: &str = "Analysis complete. Please review the recommendations below.";

pub const SYSTEM_ROLE: &str = "You are an expert sales advisor providing actionable recommendations to sellers based on data analysis.";

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Narrator output: a summary plus the signals it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narration {
    pub summary: String,
    pub recommendations: Vec<RecommendationSignal>,
}

#[derive(Clone)]
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Narrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn narrate(&self, signals: Vec<RecommendationSignal>) -> Narration {
        if signals.is_empty() {
            return Narration {
                summary: NO_RECOMMENDATIONS_SUMMARY.to_string(),
                recommendations: Vec::new(),
            };
        }

        let summary = match self.explain(&signals).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, signals = signals.len(), "narration failed; using fallback summary");
                FALLBACK_SUMMARY.to_string()
            }
        };

        Narration {
            summary,
            recommendations: signals,
        }
    }

    async fn explain(&self, signals: &[RecommendationSignal]) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            system: SYSTEM_ROLE.to_string(),
            prompt: build_prompt(signals)?,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let text = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

/// Deterministic prompt embedding every signal as JSON.
pub fn build_prompt(signals: &[RecommendationSignal]) -> Result<String, GenerationError> {
    let raw = serde_json::to_string_pretty(signals)
        .map_err(|e| GenerationError::Malformed(format!("failed to serialize signals: {e}")))?;

    Ok(format!(
        "You are a sales recommendation expert. Based on the following raw signals from our sales analysis system, \
please provide a clear, actionable summary and detailed recommendations for the seller.

Raw signals:
{raw}

Please provide:
1. A brief summary of the key findings
2. Detailed recommendations in natural language
3. Actionable steps the seller can take

Format your response as a summary and a list of recommendations with explanations."
    ))
}

#[async_trait]
impl PipelineStage for Narrator {
    fn name(&self) -> &'static str {
        "narrate"
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<StageDelta, AiError> {
        let narration = self.narrate(ctx.signals().to_vec()).await;
        debug!(summary_len = narration.summary.len(), "narration complete");
        Ok(StageDelta::Narrated(narration))
    }
}
