//! Fakes for the data-source and text-generation seams (unit tests only).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use salesadvisor_core::{
    CategoryId, Product, ProductId, ProductStatus, SalesPeriod, StockMovement, StoreId, Variant,
    VariantId,
};

use crate::fetcher::FetchSource;
use crate::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::source::{DataSourceError, MovementQuery, SalesDataSource};

pub fn product(id: &str, category: &str) -> Product {
    Product {
        id: ProductId::from(id),
        name: format!("Product {id}"),
        category_id: CategoryId::from(category),
        status: ProductStatus::Active,
        variant_ids: vec![VariantId::from(format!("{id}-v1"))],
    }
}

pub fn variant(product_id: &str, suffix: &str, stock: u32) -> Variant {
    Variant {
        id: VariantId::from(format!("{product_id}-{suffix}")),
        product_id: ProductId::from(product_id),
        stock,
        price: 12.5,
        cost_price: None,
    }
}

#[derive(Debug, Default)]
struct CallLog {
    product_sales: usize,
    category_sales: usize,
    movement_queries: Vec<MovementQuery>,
}

/// Shared view of the calls a [`StaticSource`] received.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<CallLog>>);

impl Calls {
    pub fn product_sales(&self) -> usize {
        self.0.lock().unwrap().product_sales
    }

    pub fn category_sales(&self) -> usize {
        self.0.lock().unwrap().category_sales
    }

    pub fn last_movement_query(&self) -> Option<MovementQuery> {
        self.0.lock().unwrap().movement_queries.last().cloned()
    }
}

/// Fixed-content data source with per-sub-query failure injection.
///
/// Returns its variants unfiltered so orphan handling can be exercised.
#[derive(Debug, Default)]
pub struct StaticSource {
    products: Vec<Product>,
    variants: Vec<Variant>,
    movements: Vec<StockMovement>,
    product_sales: HashMap<ProductId, i64>,
    category_sales: HashMap<CategoryId, i64>,
    stock_levels: Vec<u32>,
    failing: HashSet<FetchSource>,
    calls: Calls,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_product_sales(mut self, entries: &[(&str, i64)]) -> Self {
        self.product_sales = entries.iter().map(|(id, n)| (ProductId::from(*id), *n)).collect();
        self
    }

    pub fn with_category_sales(mut self, entries: &[(&str, i64)]) -> Self {
        self.category_sales = entries.iter().map(|(id, n)| (CategoryId::from(*id), *n)).collect();
        self
    }

    pub fn with_stock_levels(mut self, stock_levels: Vec<u32>) -> Self {
        self.stock_levels = stock_levels;
        self
    }

    pub fn failing(mut self, source: FetchSource) -> Self {
        self.failing.insert(source);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }

    fn check(&self, source: FetchSource) -> Result<(), DataSourceError> {
        if self.failing.contains(&source) {
            return Err(DataSourceError::Unavailable(format!("{} offline", source.as_str())));
        }
        Ok(())
    }
}

#[async_trait]
impl SalesDataSource for StaticSource {
    async fn active_products(&self, _store_id: &StoreId) -> Result<Vec<Product>, DataSourceError> {
        self.check(FetchSource::Products)?;
        Ok(self.products.clone())
    }

    async fn variants(&self, _product_ids: &[ProductId]) -> Result<Vec<Variant>, DataSourceError> {
        self.check(FetchSource::Variants)?;
        Ok(self.variants.clone())
    }

    async fn movements(&self, query: &MovementQuery) -> Result<Vec<StockMovement>, DataSourceError> {
        self.calls.0.lock().unwrap().movement_queries.push(query.clone());
        self.check(FetchSource::Movements)?;
        Ok(self.movements.clone())
    }

    async fn product_sales(
        &self,
        product_id: &ProductId,
        _period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        self.calls.0.lock().unwrap().product_sales += 1;
        self.check(FetchSource::ProductSales)?;
        Ok(self.product_sales.get(product_id).copied().unwrap_or(0))
    }

    async fn category_sales(
        &self,
        category_id: &CategoryId,
        _period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        self.calls.0.lock().unwrap().category_sales += 1;
        self.check(FetchSource::CategorySales)?;
        Ok(self.category_sales.get(category_id).copied().unwrap_or(0))
    }

    async fn stock_levels(&self, _store_id: &StoreId) -> Result<Vec<u32>, DataSourceError> {
        self.check(FetchSource::MedianStock)?;
        Ok(self.stock_levels.clone())
    }
}

/// How a [`ScriptedGenerator`] responds.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Fail(GenerationError),
    Stall(Duration),
}

/// Text generator with a scripted response that records every request.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(e) => Err(e.clone()),
            Script::Stall(d) => {
                tokio::time::sleep(*d).await;
                Ok("too late".to_string())
            }
        }
    }
}
