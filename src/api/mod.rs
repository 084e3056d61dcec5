//! HTTP API - read-only view of the schema registry
//!
//! Provides:
//! - The rendered service list for embedding in a page
//! - Per-service schema lookup as JSON

pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::schema::SchemaRegistry;

pub type SharedRegistry = Arc<SchemaRegistry>;

/// Create the API router
pub fn create_router(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/services", get(routes::services_page))
        .route("/api/services", get(routes::api_list_services))
        .route("/api/services/:identity", get(routes::api_service_schemas))
        .route("/health", get(routes::health))
        .with_state(registry)
}
