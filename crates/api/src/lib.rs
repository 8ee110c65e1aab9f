//! HTTP API: router, handlers, and request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
