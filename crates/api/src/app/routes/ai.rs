use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, Instrument};

use salesadvisor_ai::AiError;
use salesadvisor_core::StoreId;

use crate::app::dto::{self, HealthStatus, RecommendationResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/recommendation", post(recommendation))
        .route("/health", get(health))
}

pub async fn recommendation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<dto::RecommendationQuery>,
) -> Response {
    let store_id = match StoreId::parse(query.store_id.as_deref().unwrap_or_default()) {
        Ok(id) => id,
        Err(e) => return errors::ai_error_to_response(AiError::from(e)),
    };

    // A panicking run surfaces as a JoinError instead of tearing down the connection.
    let pipeline = services.pipeline();
    let task = tokio::spawn(
        async move { pipeline.run(&store_id).await }.instrument(tracing::Span::current()),
    );

    match task.await {
        Ok(Ok(recommendation)) => {
            (StatusCode::OK, Json(RecommendationResponse::ok(recommendation))).into_response()
        }
        Ok(Err(e)) => {
            error!(request_id = ctx.request_id(), error = %e, "recommendation run failed");
            errors::ai_error_to_response(e)
        }
        Err(join) => {
            error!(request_id = ctx.request_id(), error = %join, "recommendation task aborted");
            errors::pipeline_error(join)
        }
    }
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}
