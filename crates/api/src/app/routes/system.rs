use axum::{http::StatusCode, Json};

use crate::app::dto::ServiceIndex;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn index() -> Json<ServiceIndex> {
    Json(ServiceIndex::current())
}
