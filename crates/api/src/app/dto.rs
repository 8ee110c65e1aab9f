use serde::{Deserialize, Serialize};

use salesadvisor_ai::Recommendation;

pub const SERVICE_NAME: &str = "AI Sales Recommendation Agent";
pub const SERVICE_VERSION: &str = "1.0.0";

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `POST /ai/recommendation`.
///
/// The store id stays optional here so a missing value maps to our own
/// validation error instead of axum's query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub store_id: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub data: Recommendation,
}

impl RecommendationResponse {
    pub fn ok(data: Recommendation) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: SERVICE_NAME,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceIndex {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

impl ServiceIndex {
    pub fn current() -> Self {
        Self {
            message: "Sales Recommendation AI Agent API",
            version: SERVICE_VERSION,
            endpoints: vec!["/ai/recommendation?store_id=...", "/ai/health"],
        }
    }
}
