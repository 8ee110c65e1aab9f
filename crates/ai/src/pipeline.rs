//! Pipeline Orchestrator: `Fetch -> Evaluate -> Narrate -> Done`.
//!
//! The context is an immutable value. Each stage borrows it, returns a
//! [`StageDelta`], and the orchestrator merges the delta into the next
//! context. Fields are only ever added; nothing written by an earlier stage
//! is removed. There is no branching and no retry between stages.

use tracing::{debug, info, Instrument};

use salesadvisor_core::{RunId, StoreId};

use crate::fetcher::{DataFetcher, SalesSnapshot};
use crate::narrator::Narrator;
use crate::result::{AiError, Recommendation};
use crate::rules::RuleEngine;
use crate::signal::RecommendationSignal;
use crate::stage::{PipelineStage, StageDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Fetch,
    Evaluate,
    Narrate,
    Done,
}

impl PipelineState {
    fn next(self) -> Self {
        match self {
            PipelineState::Fetch => PipelineState::Evaluate,
            PipelineState::Evaluate => PipelineState::Narrate,
            PipelineState::Narrate | PipelineState::Done => PipelineState::Done,
        }
    }
}

/// Envelope carried through one pipeline run.
///
/// Every field starts at a defined empty/zero value, so a stage reading a
/// field that has not been produced yet sees an empty sequence or zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    run_id: RunId,
    store_id: StoreId,
    state: PipelineState,
    snapshot: SalesSnapshot,
    signals: Vec<RecommendationSignal>,
    summary: String,
    recommendations: Vec<RecommendationSignal>,
}

impl PipelineContext {
    pub fn new(store_id: StoreId) -> Self {
        Self {
            run_id: RunId::new(),
            store_id,
            state: PipelineState::Fetch,
            snapshot: SalesSnapshot::default(),
            signals: Vec::new(),
            summary: String::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn store_id(&self) -> &StoreId {
        &self.store_id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn snapshot(&self) -> &SalesSnapshot {
        &self.snapshot
    }

    pub fn signals(&self) -> &[RecommendationSignal] {
        &self.signals
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn recommendations(&self) -> &[RecommendationSignal] {
        &self.recommendations
    }

    /// Merge the delta produced by the current state and advance.
    ///
    /// A delta that does not belong to the current state is rejected.
    pub fn merge(self, delta: StageDelta) -> Result<Self, AiError> {
        let state = self.state;
        let mut next = match (state, delta) {
            (PipelineState::Fetch, StageDelta::Fetched(snapshot)) => Self { snapshot, ..self },
            (PipelineState::Evaluate, StageDelta::Evaluated(signals)) => Self { signals, ..self },
            (PipelineState::Narrate, StageDelta::Narrated(narration)) => Self {
                summary: narration.summary,
                recommendations: narration.recommendations,
                ..self
            },
            (state, delta) => {
                return Err(AiError::Internal(format!(
                    "stage delta `{}` does not apply in state {state:?}",
                    delta.label()
                )));
            }
        };
        next.state = state.next();
        Ok(next)
    }

    pub fn into_recommendation(self) -> Recommendation {
        Recommendation {
            summary: self.summary,
            recommendations: self.recommendations,
        }
    }
}

/// Runs the three stages for one store.
#[derive(Clone)]
pub struct SalesPipeline {
    fetcher: DataFetcher,
    rules: RuleEngine,
    narrator: Narrator,
}

impl SalesPipeline {
    pub fn new(fetcher: DataFetcher, rules: RuleEngine, narrator: Narrator) -> Self {
        Self {
            fetcher,
            rules,
            narrator,
        }
    }

    /// Public entry point: `{summary, recommendations}` for a store.
    pub async fn run(&self, store_id: &StoreId) -> Result<Recommendation, AiError> {
        Ok(self.run_with_context(store_id).await?.into_recommendation())
    }

    /// Like [`run`](Self::run) but returns the final context (snapshot, warnings, signals).
    pub async fn run_with_context(&self, store_id: &StoreId) -> Result<PipelineContext, AiError> {
        let ctx = PipelineContext::new(store_id.clone());
        let span = tracing::info_span!("sales_pipeline", store_id = %store_id, run_id = %ctx.run_id());
        self.drive(ctx).instrument(span).await
    }

    async fn drive(&self, mut ctx: PipelineContext) -> Result<PipelineContext, AiError> {
        loop {
            let stage: &dyn PipelineStage = match ctx.state() {
                PipelineState::Fetch => &self.fetcher,
                PipelineState::Evaluate => &self.rules,
                PipelineState::Narrate => &self.narrator,
                PipelineState::Done => break,
            };

            debug!(stage = stage.name(), "running stage");
            let delta = stage.run(&ctx).await?;
            ctx = ctx.merge(delta)?;
        }

        info!(
            signals = ctx.signals().len(),
            degraded = ctx.snapshot().is_degraded(),
            "recommendation run complete"
        );
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetcher::FetchSource;
    use crate::generator::GenerationError;
    use crate::narrator::{Narration, FALLBACK_SUMMARY, NO_RECOMMENDATIONS_SUMMARY};
    use crate::signal::{SignalSubject, SignalType};
    use crate::test_support::{product, variant, Script, ScriptedGenerator, StaticSource};
    use salesadvisor_core::{CategoryId, MedianStock, ProductId};

    fn pipeline(source: StaticSource, generator: Arc<ScriptedGenerator>) -> SalesPipeline {
        SalesPipeline::new(
            DataFetcher::new(Arc::new(source)),
            RuleEngine::new(),
            Narrator::new(generator),
        )
    }

    fn store_one() -> StaticSource {
        StaticSource::new()
            .with_products(vec![product("p1", "c1")])
            .with_variants(vec![variant("p1", "v1", 31)])
            .with_product_sales(&[("p1", 4)])
            .with_category_sales(&[("c1", 9)])
            .with_stock_levels(vec![5])
    }

    #[test]
    fn new_context_starts_empty() {
        let ctx = PipelineContext::new(StoreId::from("store-1"));
        assert_eq!(ctx.state(), PipelineState::Fetch);
        assert_eq!(ctx.snapshot(), &SalesSnapshot::default());
        assert_eq!(ctx.snapshot().median_stock.value(), 0.0);
        assert!(ctx.signals().is_empty());
        assert!(ctx.summary().is_empty());
        assert!(ctx.recommendations().is_empty());
    }

    #[test]
    fn merge_rejects_out_of_order_delta() {
        let ctx = PipelineContext::new(StoreId::from("store-1"));
        let err = ctx
            .merge(StageDelta::Narrated(Narration {
                summary: "x".to_string(),
                recommendations: Vec::new(),
            }))
            .unwrap_err();
        assert!(matches!(err, AiError::Internal(_)));
    }

    #[test]
    fn merge_keeps_earlier_fields() {
        let ctx = PipelineContext::new(StoreId::from("store-1"));
        let snapshot = SalesSnapshot {
            median_stock: MedianStock::middle(4),
            ..SalesSnapshot::default()
        };
        let ctx = ctx.merge(StageDelta::Fetched(snapshot.clone())).unwrap();
        let ctx = ctx.merge(StageDelta::Evaluated(Vec::new())).unwrap();

        assert_eq!(ctx.state(), PipelineState::Narrate);
        assert_eq!(ctx.snapshot(), &snapshot);
        assert_eq!(ctx.store_id(), &StoreId::from("store-1"));
    }

    #[tokio::test]
    async fn store_one_yields_three_signals_in_rule_order() {
        let generator = Arc::new(ScriptedGenerator::replying("Three things to fix."));
        let pipeline = pipeline(store_one(), generator.clone());

        let result = pipeline.run(&StoreId::from("store-1")).await.unwrap();

        let kinds: Vec<SignalType> = result.recommendations.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![SignalType::SlowMoving, SignalType::CategoryDecline, SignalType::Overstock]
        );
        assert_eq!(
            result.recommendations[0].subject(),
            &SignalSubject::ProductId(ProductId::from("p1"))
        );
        assert_eq!(
            result.recommendations[1].subject(),
            &SignalSubject::CategoryId(CategoryId::from("c1"))
        );
        assert_eq!(result.summary, "Three things to fix.");
        assert_eq!(generator.requests().len(), 1);
    }

    #[tokio::test]
    async fn narration_failure_does_not_fail_the_run() {
        let generator = Arc::new(ScriptedGenerator::new(Script::Fail(GenerationError::Transport(
            "connection reset".to_string(),
        ))));
        let pipeline = pipeline(store_one(), generator);

        let result = pipeline.run(&StoreId::from("store-1")).await.unwrap();

        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.recommendations.len(), 3);
    }

    #[tokio::test]
    async fn unavailable_store_degrades_to_no_recommendations() {
        let generator = Arc::new(ScriptedGenerator::replying("unused"));
        let source = StaticSource::new()
            .failing(FetchSource::Products)
            .failing(FetchSource::MedianStock);
        let pipeline = pipeline(source, generator.clone());

        let ctx = pipeline.run_with_context(&StoreId::from("store-1")).await.unwrap();

        assert_eq!(ctx.state(), PipelineState::Done);
        assert_eq!(ctx.summary(), NO_RECOMMENDATIONS_SUMMARY);
        assert!(ctx.recommendations().is_empty());
        assert_eq!(ctx.snapshot().warnings.len(), 2);
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn context_records_signals_and_recommendations_separately() {
        let generator = Arc::new(ScriptedGenerator::replying("ok"));
        let pipeline = pipeline(store_one(), generator);

        let ctx = pipeline.run_with_context(&StoreId::from("store-1")).await.unwrap();

        assert_eq!(ctx.signals(), ctx.recommendations());
        assert_eq!(ctx.snapshot().median_stock, MedianStock::middle(5));
    }
}
