use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use salesadvisor_ai::AiError;

pub fn ai_error_to_response(err: AiError) -> axum::response::Response {
    match err {
        AiError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AiError::Internal(msg) => pipeline_error(msg),
    }
}

pub fn pipeline_error(detail: impl std::fmt::Display) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "pipeline_error",
        format!("Error generating recommendations: {detail}"),
    )
}

fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
