//! Data Fetcher: builds the read-only snapshot the rules evaluate.
//!
//! Every sub-query degrades independently. A failed read is replaced by an
//! empty/zero value and recorded as a [`FetchWarning`], so a partially
//! unavailable store still produces recommendations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use salesadvisor_core::{
    median_stock, CategoryId, MedianStock, Product, ProductId, SalesPeriod, SalesWindow,
    StockMovement, StoreId, Variant,
};

use crate::pipeline::PipelineContext;
use crate::result::AiError;
use crate::source::{DataSourceError, MovementQuery, SalesDataSource};
use crate::stage::{PipelineStage, StageDelta};

/// Which sub-query a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Products,
    Variants,
    Movements,
    ProductSales,
    CategorySales,
    MedianStock,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::Products => "products",
            FetchSource::Variants => "variants",
            FetchSource::Movements => "movements",
            FetchSource::ProductSales => "product_sales",
            FetchSource::CategorySales => "category_sales",
            FetchSource::MedianStock => "median_stock",
        }
    }
}

/// A sub-query that fell back to its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchWarning {
    pub source: FetchSource,
    pub message: String,
}

impl FetchWarning {
    pub fn new(source: FetchSource, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

/// Raw inputs for one store, fully materialized before rule evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesSnapshot {
    pub products: Vec<Product>,
    pub variants: Vec<Variant>,
    pub movements: Vec<StockMovement>,
    pub product_sales: HashMap<ProductId, i64>,
    pub category_sales: HashMap<CategoryId, i64>,
    pub median_stock: MedianStock,
    pub warnings: Vec<FetchWarning>,
}

impl SalesSnapshot {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Gathers a [`SalesSnapshot`] from the injected data source.
#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn SalesDataSource>,
    window: SalesWindow,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn SalesDataSource>) -> Self {
        Self {
            source,
            window: SalesWindow::default(),
        }
    }

    pub fn with_window(mut self, window: SalesWindow) -> Self {
        self.window = window;
        self
    }

    /// Fetch the snapshot for a window ending now.
    pub async fn fetch(&self, store_id: &StoreId) -> SalesSnapshot {
        self.fetch_at(store_id, Utc::now()).await
    }

    /// Fetch the snapshot for a window ending at `now`.
    pub async fn fetch_at(&self, store_id: &StoreId, now: DateTime<Utc>) -> SalesSnapshot {
        let period = self.window.period(now);
        let mut warnings = Vec::new();

        // Everything else is keyed by the product list, so it goes first.
        let products = recover(
            FetchSource::Products,
            self.source.active_products(store_id).await,
            &mut warnings,
        );
        let product_ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
        let query = MovementQuery {
            product_ids: product_ids.clone(),
            period,
            kind: None,
        };

        let (variants, movements, (product_sales, sales_warnings), (category_sales, category_warnings), stock_levels) = tokio::join!(
            self.source.variants(&product_ids),
            self.source.movements(&query),
            self.product_sales(&products, period),
            self.category_sales(&products, period),
            self.source.stock_levels(store_id),
        );

        let variants = recover(FetchSource::Variants, variants, &mut warnings);
        let variants = drop_orphan_variants(&product_ids, variants, &mut warnings);
        let movements = recover(FetchSource::Movements, movements, &mut warnings);
        warnings.extend(sales_warnings);
        warnings.extend(category_warnings);
        let stock_levels = recover(FetchSource::MedianStock, stock_levels, &mut warnings);

        SalesSnapshot {
            products,
            variants,
            movements,
            product_sales,
            category_sales,
            median_stock: median_stock(&stock_levels),
            warnings,
        }
    }

    async fn product_sales(
        &self,
        products: &[Product],
        period: SalesPeriod,
    ) -> (HashMap<ProductId, i64>, Vec<FetchWarning>) {
        let mut totals = HashMap::with_capacity(products.len());
        let mut warnings = Vec::new();

        for product in products {
            let sales = match self.source.product_sales(&product.id, period).await {
                Ok(n) => n,
                Err(e) => {
                    warnings.push(fallback(
                        FetchSource::ProductSales,
                        format!("product {}: {e}", product.id),
                    ));
                    0
                }
            };
            totals.insert(product.id.clone(), sales);
        }

        (totals, warnings)
    }

    async fn category_sales(
        &self,
        products: &[Product],
        period: SalesPeriod,
    ) -> (HashMap<CategoryId, i64>, Vec<FetchWarning>) {
        let mut totals = HashMap::new();
        let mut warnings = Vec::new();

        for product in products {
            if totals.contains_key(&product.category_id) {
                continue;
            }
            let sales = match self.source.category_sales(&product.category_id, period).await {
                Ok(n) => n,
                Err(e) => {
                    warnings.push(fallback(
                        FetchSource::CategorySales,
                        format!("category {}: {e}", product.category_id),
                    ));
                    0
                }
            };
            totals.insert(product.category_id.clone(), sales);
        }

        (totals, warnings)
    }
}

fn recover<T: Default>(
    source: FetchSource,
    result: Result<T, DataSourceError>,
    warnings: &mut Vec<FetchWarning>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warnings.push(fallback(source, e.to_string()));
            T::default()
        }
    }
}

fn fallback(source: FetchSource, message: String) -> FetchWarning {
    warn!(source = source.as_str(), error = %message, "sub-fetch failed; using empty default");
    FetchWarning::new(source, message)
}

/// Variants must reference a fetched product.
fn drop_orphan_variants(
    product_ids: &[ProductId],
    variants: Vec<Variant>,
    warnings: &mut Vec<FetchWarning>,
) -> Vec<Variant> {
    let known: HashSet<&ProductId> = product_ids.iter().collect();
    let before = variants.len();
    let kept: Vec<Variant> = variants
        .into_iter()
        .filter(|v| known.contains(&v.product_id))
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        warnings.push(fallback(
            FetchSource::Variants,
            format!("dropped {dropped} variant(s) referencing unknown products"),
        ));
    }
    kept
}

#[async_trait]
impl PipelineStage for DataFetcher {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&self, ctx: &PipelineContext) -> Result<StageDelta, AiError> {
        let snapshot = self.fetch(ctx.store_id()).await;
        debug!(
            products = snapshot.products.len(),
            variants = snapshot.variants.len(),
            movements = snapshot.movements.len(),
            median_stock = snapshot.median_stock.value(),
            warnings = snapshot.warnings.len(),
            "snapshot fetched"
        );
        Ok(StageDelta::Fetched(snapshot))
    }
}
