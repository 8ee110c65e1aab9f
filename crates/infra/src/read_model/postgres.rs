//! Postgres-backed sales data source.
//!
//! Reads the storefront catalog tables (`"Product"`, `"ProductVariant"`,
//! `"StockMovement"`) owned by the storefront application. Column names are
//! quoted camelCase as created by that application's schema.
//!
//! ## Timestamps
//!
//! `"createdAt"` columns are `timestamp without time zone` holding UTC, so
//! window bounds are converted with `AT TIME ZONE 'UTC'` on both sides.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use salesadvisor_ai::{DataSourceError, MovementQuery, SalesDataSource};
use salesadvisor_core::{
    CategoryId, MovementKind, Product, ProductId, ProductStatus, SalesPeriod, StockMovement, StoreId,
    Variant, VariantId,
};

/// Long-lived data source over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresSalesSource {
    pool: PgPool,
}

impl PostgresSalesSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool suitable for a read-only service.
    pub async fn connect(database_url: &str) -> Result<Self, DataSourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| DataSourceError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

fn query_error(e: sqlx::Error) -> DataSourceError {
    DataSourceError::Query(e.to_string())
}

fn decode_error(e: sqlx::Error) -> DataSourceError {
    DataSourceError::Decode(e.to_string())
}

fn parse_status(raw: &str) -> ProductStatus {
    if raw.eq_ignore_ascii_case("active") {
        ProductStatus::Active
    } else {
        ProductStatus::Inactive
    }
}

fn parse_stock(raw: i32) -> Result<u32, DataSourceError> {
    u32::try_from(raw).map_err(|_| DataSourceError::Decode(format!("negative stock {raw}")))
}

fn product_id_strings(ids: &[ProductId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

fn product_from_row(row: &PgRow) -> Result<Product, DataSourceError> {
    let status: String = row.try_get("status").map_err(decode_error)?;
    let variant_ids: Vec<String> = row.try_get("variant_ids").map_err(decode_error)?;
    Ok(Product {
        id: ProductId::from(row.try_get::<String, _>("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        category_id: CategoryId::from(row.try_get::<String, _>("category_id").map_err(decode_error)?),
        status: parse_status(&status),
        variant_ids: variant_ids.into_iter().map(VariantId::from).collect(),
    })
}

fn variant_from_row(row: &PgRow) -> Result<Variant, DataSourceError> {
    Ok(Variant {
        id: VariantId::from(row.try_get::<String, _>("id").map_err(decode_error)?),
        product_id: ProductId::from(row.try_get::<String, _>("product_id").map_err(decode_error)?),
        stock: parse_stock(row.try_get("stock").map_err(decode_error)?)?,
        price: row.try_get("price").map_err(decode_error)?,
        cost_price: row.try_get("cost_price").map_err(decode_error)?,
    })
}

fn movement_from_row(row: &PgRow) -> Result<StockMovement, DataSourceError> {
    let kind: String = row.try_get("kind").map_err(decode_error)?;
    let variant_id: Option<String> = row.try_get("variant_id").map_err(decode_error)?;
    Ok(StockMovement {
        product_id: ProductId::from(row.try_get::<String, _>("product_id").map_err(decode_error)?),
        variant_id: variant_id.map(VariantId::from),
        quantity: row.try_get("quantity").map_err(decode_error)?,
        kind: kind
            .parse::<MovementKind>()
            .map_err(|e| DataSourceError::Decode(e.to_string()))?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
    })
}

#[async_trait]
impl SalesDataSource for PostgresSalesSource {
    #[instrument(skip(self), fields(operation = "active_products"))]
    async fn active_products(&self, store_id: &StoreId) -> Result<Vec<Product>, DataSourceError> {
        // Uncategorized products share the empty category id.
        let rows = sqlx::query(
            r#"
            SELECT
                p.id,
                p.name,
                COALESCE(p."categoryId", '') AS category_id,
                p.status::text AS status,
                COALESCE(
                    array_agg(v.id ORDER BY v.id) FILTER (WHERE v.id IS NOT NULL),
                    '{}'
                ) AS variant_ids
            FROM "Product" p
            LEFT JOIN "ProductVariant" v ON v."productId" = p.id
            WHERE p."storeId" = $1 AND lower(p.status::text) = 'active'
            GROUP BY p.id, p.name, p."categoryId", p.status, p."createdAt"
            ORDER BY p."createdAt", p.id
            "#,
        )
        .bind(store_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, product_ids), fields(operation = "variants", products = product_ids.len()))]
    async fn variants(&self, product_ids: &[ProductId]) -> Result<Vec<Variant>, DataSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                "productId" AS product_id,
                stock,
                price::float8 AS price,
                "costPrice"::float8 AS cost_price
            FROM "ProductVariant"
            WHERE "productId" = ANY($1)
            ORDER BY "productId", id
            "#,
        )
        .bind(product_id_strings(product_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.iter().map(variant_from_row).collect()
    }

    #[instrument(skip(self, query), fields(operation = "movements", products = query.product_ids.len()))]
    async fn movements(&self, query: &MovementQuery) -> Result<Vec<StockMovement>, DataSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT
                v."productId" AS product_id,
                m."variantId" AS variant_id,
                m.quantity::int8 AS quantity,
                m.type::text AS kind,
                m."createdAt" AT TIME ZONE 'UTC' AS created_at
            FROM "StockMovement" m
            JOIN "ProductVariant" v ON v.id = m."variantId"
            WHERE v."productId" = ANY($1)
              AND m."createdAt" >= ($2::timestamptz AT TIME ZONE 'UTC')
              AND m."createdAt" <= ($3::timestamptz AT TIME ZONE 'UTC')
              AND ($4::text IS NULL OR m.type::text = $4)
            ORDER BY m."createdAt"
            "#,
        )
        .bind(product_id_strings(&query.product_ids))
        .bind(query.period.since)
        .bind(query.period.until)
        .bind(query.kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.iter().map(movement_from_row).collect()
    }

    #[instrument(skip(self), fields(operation = "product_sales"))]
    async fn product_sales(
        &self,
        product_id: &ProductId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(m.quantity), 0)::int8 AS total
            FROM "StockMovement" m
            JOIN "ProductVariant" v ON v.id = m."variantId"
            WHERE v."productId" = $1
              AND m.type::text = $2
              AND m."createdAt" >= ($3::timestamptz AT TIME ZONE 'UTC')
              AND m."createdAt" <= ($4::timestamptz AT TIME ZONE 'UTC')
            "#,
        )
        .bind(product_id.as_str())
        .bind(MovementKind::Sale.as_str())
        .bind(period.since)
        .bind(period.until)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        row.try_get("total").map_err(decode_error)
    }

    #[instrument(skip(self), fields(operation = "category_sales"))]
    async fn category_sales(
        &self,
        category_id: &CategoryId,
        period: SalesPeriod,
    ) -> Result<i64, DataSourceError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(m.quantity), 0)::int8 AS total
            FROM "Product" p
            JOIN "ProductVariant" v ON v."productId" = p.id
            JOIN "StockMovement" m ON m."variantId" = v.id
            WHERE COALESCE(p."categoryId", '') = $1
              AND m.type::text = $2
              AND m."createdAt" >= ($3::timestamptz AT TIME ZONE 'UTC')
              AND m."createdAt" <= ($4::timestamptz AT TIME ZONE 'UTC')
            "#,
        )
        .bind(category_id.as_str())
        .bind(MovementKind::Sale.as_str())
        .bind(period.since)
        .bind(period.until)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        row.try_get("total").map_err(decode_error)
    }

    #[instrument(skip(self), fields(operation = "stock_levels"))]
    async fn stock_levels(&self, store_id: &StoreId) -> Result<Vec<u32>, DataSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT v.stock
            FROM "ProductVariant" v
            JOIN "Product" p ON p.id = v."productId"
            WHERE p."storeId" = $1
            "#,
        )
        .bind(store_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|r| parse_stock(r.try_get("stock").map_err(decode_error)?))
            .collect()
    }
}
