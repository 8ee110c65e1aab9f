//! Business rules that turn a sales snapshot into recommendation signals.
//!
//! Rules run in a fixed order (slow-moving, category decline, overstock) and
//! iterate products in input order. A product may trigger several rules and
//! signals are never deduplicated.

use std::collections::HashMap;

use async_trait::async_trait;

use salesadvisor_core::{CategoryId, MedianStock, Product, ProductId, SalesWindow, Variant};

use crate::pipeline::PipelineContext;
use crate::result::AiError;
use crate::signal::RecommendationSignal;
use crate::stage::{PipelineStage, StageDelta};

/// Slow-moving fires when window sales are strictly below this.
pub const SLOW_MOVING_MAX_SALES: i64 = 5;
/// ...and total stock is strictly above this.
pub const SLOW_MOVING_MIN_STOCK: u64 = 20;
/// Category decline fires when category window sales are strictly below this.
///
/// Single-window threshold; there is no period-over-period comparison yet.
pub const CATEGORY_DECLINE_MAX_SALES: i64 = 10;
/// Overstock fires when total stock exceeds this multiple of the store median.
pub const OVERSTOCK_MEDIAN_MULTIPLIER: f64 = 3.0;

/// Deterministic rule evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine {
    /// Only used to label reason texts; sales figures arrive pre-aggregated.
    window: SalesWindow,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: SalesWindow) -> Self {
        self.window = window;
        self
    }

    /// Evaluate all rules over one immutable snapshot.
    pub fn evaluate(
        &self,
        products: &[Product],
        variants: &[Variant],
        product_sales: &HashMap<ProductId, i64>,
        category_sales: &HashMap<CategoryId, i64>,
        median_stock: MedianStock,
    ) -> Vec<RecommendationSignal> {
        let stock = stock_by_product(variants);
        let total_stock = |id: &ProductId| stock.get(id).copied().unwrap_or(0);
        let days = self.window.days();

        let mut signals = Vec::new();

        // Rule 1: slow-moving product -> bundle.
        for product in products {
            let sales = product_sales.get(&product.id).copied().unwrap_or(0);
            let total = total_stock(&product.id);
            if sales < SLOW_MOVING_MAX_SALES && total > SLOW_MOVING_MIN_STOCK {
                signals.push(RecommendationSignal::slow_moving(
                    product.id.clone(),
                    sales,
                    total,
                    days,
                ));
            }
        }

        // Rule 2: category decline -> campaign. Emitted once per product.
        for product in products {
            let sales = category_sales.get(&product.category_id).copied().unwrap_or(0);
            if sales < CATEGORY_DECLINE_MAX_SALES {
                signals.push(RecommendationSignal::category_decline(
                    product.category_id.clone(),
                    sales,
                    days,
                ));
            }
        }

        // Rule 3: overstock -> clearance. Needs a positive baseline.
        if median_stock.value() > 0.0 {
            let limit = OVERSTOCK_MEDIAN_MULTIPLIER * median_stock.value();
            for product in products {
                let total = total_stock(&product.id);
                if total as f64 > limit {
                    signals.push(RecommendationSignal::overstock(
                        product.id.clone(),
                        total,
                        median_stock,
                    ));
                }
            }
        }

        signals
    }
}

fn stock_by_product(variants: &[Variant]) -> HashMap<&ProductId, u64> {
    let mut totals: HashMap<&ProductId, u64> = HashMap::new();
    for v in variants {
        *totals.entry(&v.product_id).or_insert(0) += u64::from(v.stock);
    }
    totals
}

#[async_trait]
impl PipelineStage for RuleEngine {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<StageDelta, AiError> {
        let snapshot = ctx.snapshot();
        let signals = self.evaluate(
            &snapshot.products,
            &snapshot.variants,
            &snapshot.product_sales,
            &snapshot.category_sales,
            snapshot.median_stock,
        );
        Ok(StageDelta::Evaluated(signals))
    }
}
