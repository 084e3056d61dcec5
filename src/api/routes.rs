//! API route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde::Serialize;

use super::SharedRegistry;
use crate::schema::SchemaFile;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// GET /services
pub async fn services_page(State(registry): State<SharedRegistry>) -> Html<String> {
    Html(registry.render().await)
}

#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub identity: String,
    pub entries: usize,
}

/// GET /api/services
pub async fn api_list_services(State(registry): State<SharedRegistry>) -> Json<Vec<ServiceSummary>> {
    let services = registry
        .identities()
        .await
        .into_iter()
        .map(|(identity, entries)| ServiceSummary { identity, entries })
        .collect();
    Json(services)
}

/// GET /api/services/:identity
pub async fn api_service_schemas(
    State(registry): State<SharedRegistry>,
    Path(identity): Path<String>,
) -> Result<Json<Vec<SchemaFile>>, StatusCode> {
    if !registry.contains(&identity).await {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(registry.lookup(&identity).await))
}
