//! Catalog records read from the store's backing database.
//!
//! These are plain read-side records: the recommendation service never
//! creates or mutates them.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::{CategoryId, ProductId, VariantId};

/// Product listing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// A product belonging to exactly one store and one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub status: ProductStatus,
    #[serde(default)]
    pub variant_ids: Vec<VariantId>,
}

/// A sellable SKU of a product, carrying its own stock and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub stock: u32,
    pub price: f64,
    pub cost_price: Option<f64>,
}

/// Kind of inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Sale,
    Restock,
    Return,
    Adjustment,
    Transfer,
}

impl MovementKind {
    /// Wire/database representation (`SALE`, `RESTOCK`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "SALE",
            MovementKind::Restock => "RESTOCK",
            MovementKind::Return => "RETURN",
            MovementKind::Adjustment => "ADJUSTMENT",
            MovementKind::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SALE" => Ok(MovementKind::Sale),
            "RESTOCK" => Ok(MovementKind::Restock),
            "RETURN" => Ok(MovementKind::Return),
            "ADJUSTMENT" => Ok(MovementKind::Adjustment),
            "TRANSFER" => Ok(MovementKind::Transfer),
            other => Err(DomainError::validation(format!(
                "unknown stock movement type: {other}"
            ))),
        }
    }
}

/// Immutable inventory event (e.g. a sale of `quantity` units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
    pub kind: MovementKind,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn is_sale(&self) -> bool {
        self.kind == MovementKind::Sale
    }
}
