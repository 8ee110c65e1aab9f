use async_trait::async_trait;
use thiserror::Error;

use salesadvisor_core::{
    CategoryId, MovementKind, Product, ProductId, SalesPeriod, StockMovement, StoreId, Variant,
};

/// Failure of a single read against the backing store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Filter for stock-movement reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementQuery {
    pub product_ids: Vec<ProductId>,
    pub period: SalesPeriod,
    /// `None` returns every movement type.
    pub kind: Option<MovementKind>,
}

/// Read-only access to a store's catalog and sales history.
///
/// One long-lived instance is shared by every pipeline run; implementations
/// own their connection lifecycle.
#[async_trait]
pub trait SalesDataSource: Send + Sync {
    /// Active products of a store, with their variant ids.
    async fn active_products(&self, store_id: &StoreId) -> Result<Vec<Product>, DataSourceError>;

    /// Full variant records for the given products.
    async fn variants(&self, product_ids: &[ProductId]) -> Result<Vec<Variant>, DataSourceError>;

    /// Stock movements for the given products inside `query.period`.
    async fn movements(&self, query: &MovementQuery) -> Result<Vec<StockMovement>, DataSourceError>;

    /// Units sold (SALE movements) for one product inside `period`.
    async fn product_sales(
        &self,
        product_id: &ProductId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError>;

    /// Units sold (SALE movements) across all products of a category inside `period`.
    async fn category_sales(
        &self,
        category_id: &CategoryId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError>;

    /// Stock quantity of every variant in the store (input to the median).
    async fn stock_levels(&self, store_id: &StoreId) -> Result<Vec<u32>, DataSourceError>;
}
