//! Derived sales figures: trailing sales windows and median stock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::StockMovement;

/// Default length of the trailing sales window, in days.
pub const DEFAULT_SALES_WINDOW_DAYS: u32 = 30;

/// Trailing N-day window used for sales totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    days: u32,
}

impl SalesWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Start of the window ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }

    /// Concrete `[now - days, now]` bounds.
    pub fn period(&self, now: DateTime<Utc>) -> SalesPeriod {
        SalesPeriod {
            since: self.since(now),
            until: now,
        }
    }
}

impl Default for SalesWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SALES_WINDOW_DAYS)
    }
}

/// Closed time range `[since, until]` a sales total is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPeriod {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl SalesPeriod {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.since && ts <= self.until
    }

    /// Sum of `quantity` over SALE movements inside the period.
    pub fn total_sales<'a, I>(&self, movements: I) -> i64
    where
        I: IntoIterator<Item = &'a StockMovement>,
    {
        movements
            .into_iter()
            .filter(|m| m.is_sale() && self.contains(m.created_at))
            .map(|m| m.quantity)
            .sum()
    }
}

/// Median of a store's variant stock levels.
///
/// Remembers whether it came from averaging the two middle values of an even
/// count, which is printed with a fractional part (`5.0`); a single middle
/// value prints as an integer (`5`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MedianStock {
    value: f64,
    averaged: bool,
}

impl MedianStock {
    /// Median taken from a single middle value.
    pub fn middle(stock: u32) -> Self {
        Self {
            value: f64::from(stock),
            averaged: false,
        }
    }

    /// Median averaged from the two middle values.
    pub fn between(lower: u32, upper: u32) -> Self {
        Self {
            value: (f64::from(lower) + f64::from(upper)) / 2.0,
            averaged: true,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl core::fmt::Display for MedianStock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.averaged {
            write!(f, "{:?}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Median of variant stock levels.
///
/// Even counts average the two middle values; an empty input yields 0.
pub fn median_stock(stocks: &[u32]) -> MedianStock {
    if stocks.is_empty() {
        return MedianStock::default();
    }

    let mut sorted = stocks.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    if n % 2 == 0 {
        MedianStock::between(sorted[n / 2 - 1], sorted[n / 2])
    } else {
        MedianStock::middle(sorted[n / 2])
    }
}
