use serde::Serialize;

use salesadvisor_core::{CategoryId, MedianStock, ProductId};

/// What a signal is about.
///
/// Serialized as a single `product_id` / `category_id` key alongside the
/// other signal fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSubject {
    ProductId(ProductId),
    CategoryId(CategoryId),
}

/// Which rule produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    SlowMoving,
    CategoryDecline,
    Overstock,
}

/// Suggested seller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    BundleWithFastMoving,
    RecommendCampaign,
    ClearanceSale,
}

impl SignalType {
    /// The single action each rule recommends.
    pub fn action(&self) -> SignalAction {
        match self {
            SignalType::SlowMoving => SignalAction::BundleWithFastMoving,
            SignalType::CategoryDecline => SignalAction::RecommendCampaign,
            SignalType::Overstock => SignalAction::ClearanceSale,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::SlowMoving => "slow_moving",
            SignalType::CategoryDecline => "category_decline",
            SignalType::Overstock => "overstock",
        }
    }
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::BundleWithFastMoving => "bundle_with_fast_moving",
            SignalAction::RecommendCampaign => "recommend_campaign",
            SignalAction::ClearanceSale => "clearance_sale",
        }
    }
}

/// One emitted recommendation.
///
/// Only constructible through the per-rule constructors, so `kind`, `action`
/// and the subject kind always agree with the rule that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSignal {
    #[serde(flatten)]
    subject: SignalSubject,
    #[serde(rename = "type")]
    kind: SignalType,
    reason: String,
    action: SignalAction,
}

impl RecommendationSignal {
    fn new(subject: SignalSubject, kind: SignalType, reason: String) -> Self {
        Self {
            subject,
            kind,
            reason,
            action: kind.action(),
        }
    }

    pub fn slow_moving(product_id: ProductId, sales: i64, total_stock: u64, window_days: u32) -> Self {
        Self::new(
            SignalSubject::ProductId(product_id),
            SignalType::SlowMoving,
            format!("Sales {sales} in last {window_days} days, stock {total_stock}"),
        )
    }

    pub fn category_decline(category_id: CategoryId, category_sales: i64, window_days: u32) -> Self {
        Self::new(
            SignalSubject::CategoryId(category_id),
            SignalType::CategoryDecline,
            format!("Category sales {category_sales} in last {window_days} days"),
        )
    }

    pub fn overstock(product_id: ProductId, total_stock: u64, median_stock: MedianStock) -> Self {
        Self::new(
            SignalSubject::ProductId(product_id),
            SignalType::Overstock,
            format!("Stock {total_stock} exceeds 3x median stock {median_stock}"),
        )
    }

    pub fn subject(&self) -> &SignalSubject {
        &self.subject
    }

    pub fn kind(&self) -> SignalType {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn action(&self) -> SignalAction {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_signal_serializes_with_product_id_key() {
        let signal = RecommendationSignal::slow_moving(ProductId::from("p-1"), 4, 21, 30);
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(
            value,
            json!({
                "product_id": "p-1",
                "type": "slow_moving",
                "reason": "Sales 4 in last 30 days, stock 21",
                "action": "bundle_with_fast_moving",
            })
        );
    }

    #[test]
    fn category_signal_serializes_with_category_id_key() {
        let signal = RecommendationSignal::category_decline(CategoryId::from("c-1"), 9, 30);
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["category_id"], "c-1");
        assert_eq!(value["type"], "category_decline");
        assert_eq!(value["action"], "recommend_campaign");
        assert!(value.get("product_id").is_none());
    }

    #[test]
    fn overstock_reason_prints_median_like_the_store_reports_it() {
        let signal = RecommendationSignal::overstock(ProductId::from("p-1"), 31, MedianStock::middle(5));
        assert_eq!(signal.reason(), "Stock 31 exceeds 3x median stock 5");

        let signal = RecommendationSignal::overstock(ProductId::from("p-1"), 31, MedianStock::between(5, 6));
        assert_eq!(signal.reason(), "Stock 31 exceeds 3x median stock 5.5");

        let signal = RecommendationSignal::overstock(ProductId::from("p-1"), 31, MedianStock::between(4, 6));
        assert_eq!(signal.reason(), "Stock 31 exceeds 3x median stock 5.0");
    }

    #[test]
    fn action_is_bound_to_type() {
        for kind in [SignalType::SlowMoving, SignalType::CategoryDecline, SignalType::Overstock] {
            let json = serde_json::to_value(kind.action()).unwrap();
            assert_eq!(json, kind.action().as_str());
        }
        let signal = RecommendationSignal::overstock(ProductId::from("p-1"), 100, MedianStock::middle(1));
        assert_eq!(signal.action(), SignalAction::ClearanceSale);
        assert_eq!(signal.kind().as_str(), "overstock");
    }
}
