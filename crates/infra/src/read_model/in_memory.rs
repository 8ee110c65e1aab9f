use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::warn;

use salesadvisor_ai::{DataSourceError, MovementQuery, SalesDataSource};
use salesadvisor_core::{
    CategoryId, Product, ProductId, ProductStatus, SalesPeriod, StockMovement, StoreId, Variant,
};

#[derive(Debug, Default, Clone)]
struct StoreCatalog {
    products: Vec<Product>,
    variants: Vec<Variant>,
    movements: Vec<StockMovement>,
}

/// Store-partitioned in-memory catalog for tests/dev.
///
/// Products keep insertion order, which is the order the rules see them in.
#[derive(Debug)]
pub struct InMemorySalesSource {
    inner: RwLock<HashMap<StoreId, StoreCatalog>>,
    available: AtomicBool,
    reads: AtomicUsize,
}

impl InMemorySalesSource {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
        }
    }

    /// Insert or replace a product (matched by id).
    pub fn upsert_product(&self, store_id: &StoreId, product: Product) {
        let mut map = self.write();
        let catalog = map.entry(store_id.clone()).or_default();
        match catalog.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => catalog.products.push(product),
        }
    }

    /// Insert or replace a variant (matched by id).
    pub fn upsert_variant(&self, store_id: &StoreId, variant: Variant) {
        let mut map = self.write();
        let catalog = map.entry(store_id.clone()).or_default();
        match catalog.variants.iter_mut().find(|v| v.id == variant.id) {
            Some(existing) => *existing = variant,
            None => catalog.variants.push(variant),
        }
    }

    pub fn record_movement(&self, store_id: &StoreId, movement: StockMovement) {
        self.write()
            .entry(store_id.clone())
            .or_default()
            .movements
            .push(movement);
    }

    /// Simulate an outage: every read fails while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of reads served (or refused) so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<StoreId, StoreCatalog>>, DataSourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(DataSourceError::Unavailable("in-memory catalog offline".to_string()));
        }
        Ok(self.inner.read().unwrap_or_else(|poisoned| {
            warn!("catalog lock poisoned; reading last written state");
            poisoned.into_inner()
        }))
    }

    // Writes are single inserts or replaces; a panicked writer leaves no partial record.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StoreId, StoreCatalog>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("catalog lock poisoned; recovering for write");
            poisoned.into_inner()
        })
    }
}

impl Default for InMemorySalesSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SalesDataSource for InMemorySalesSource {
    async fn active_products(&self, store_id: &StoreId) -> Result<Vec<Product>, DataSourceError> {
        let map = self.read()?;
        Ok(map
            .get(store_id)
            .map(|c| {
                c.products
                    .iter()
                    .filter(|p| p.status == ProductStatus::Active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn variants(&self, product_ids: &[ProductId]) -> Result<Vec<Variant>, DataSourceError> {
        let map = self.read()?;
        Ok(map
            .values()
            .flat_map(|c| c.variants.iter())
            .filter(|v| product_ids.contains(&v.product_id))
            .cloned()
            .collect())
    }

    async fn movements(&self, query: &MovementQuery) -> Result<Vec<StockMovement>, DataSourceError> {
        let map = self.read()?;
        Ok(map
            .values()
            .flat_map(|c| c.movements.iter())
            .filter(|m| query.product_ids.contains(&m.product_id))
            .filter(|m| query.period.contains(m.created_at))
            .filter(|m| query.kind.is_none_or(|k| m.kind == k))
            .cloned()
            .collect())
    }

    async fn product_sales(
        &self,
        product_id: &ProductId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        let map = self.read()?;
        Ok(period.total_sales(
            map.values()
                .flat_map(|c| c.movements.iter())
                .filter(|m| &m.product_id == product_id),
        ))
    }

    async fn category_sales(
        &self,
        category_id: &CategoryId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        let map = self.read()?;
        let mut total = 0;
        for catalog in map.values() {
            let in_category: Vec<&ProductId> = catalog
                .products
                .iter()
                .filter(|p| &p.category_id == category_id)
                .map(|p| &p.id)
                .collect();
            total += period.total_sales(
                catalog
                    .movements
                    .iter()
                    .filter(|m| in_category.contains(&&m.product_id)),
            );
        }
        Ok(total)
    }

    async fn stock_levels(&self, store_id: &StoreId) -> Result<Vec<u32>, DataSourceError> {
        let map = self.read()?;
        Ok(map
            .get(store_id)
            .map(|c| {
                c.variants
                    .iter()
                    .filter(|v| c.products.iter().any(|p| p.id == v.product_id))
                    .map(|v| v.stock)
                    .collect()
            })
            .unwrap_or_default())
    }
}
