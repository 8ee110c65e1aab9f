//! `salesadvisor-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, catalog records read from the store, and the derived
//! sales-window / median-stock calculations the recommendation rules rely on.

pub mod catalog;
pub mod error;
pub mod id;
pub mod sales;

pub use catalog::{MovementKind, Product, ProductStatus, StockMovement, Variant};
pub use error::DomainError;
pub use id::{CategoryId, ProductId, RunId, StoreId, VariantId};
pub use sales::{median_stock, MedianStock, SalesPeriod, SalesWindow, DEFAULT_SALES_WINDOW_DAYS};
