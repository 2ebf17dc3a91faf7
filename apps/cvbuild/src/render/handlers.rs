//! Axum route handlers for the Filter and Render API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::document::{filter_document, load_str, Node, TagSet};
use crate::errors::AppError;
use crate::pipeline::render_source;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    /// YAML or JSON source text.
    pub document: String,
    /// `null` or missing disables filtering.
    #[serde(default)]
    pub tags: Option<TagSet>,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub document: Option<Node>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub document: String,
    pub template: String,
    #[serde(default)]
    pub tags: Option<TagSet>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/filter
///
/// Returns the filtered document tree as JSON, for previewing a tag combination.
pub async fn handle_filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterResponse>, AppError> {
    check_field("document", &request.document, &state)?;

    let document = tokio::task::spawn_blocking(move || {
        let tree = load_str(&request.document)?;
        Ok::<_, AppError>(filter_document(&tree, request.tags.as_ref())?)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(FilterResponse { document }))
}

/// POST /api/v1/render
///
/// Full pipeline: load → filter → render. Returns the rendered text.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    check_field("document", &request.document, &state)?;
    check_field("template", &request.template, &state)?;

    let tag_count = request.tags.as_ref().map(TagSet::len);
    let rendered = tokio::task::spawn_blocking(move || {
        render_source(&request.document, &request.template, request.tags.as_ref())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    tracing::info!(bytes = rendered.len(), tags = ?tag_count, "Rendered document");

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        rendered,
    )
        .into_response())
}

fn check_field(field: &str, value: &str, state: &AppState) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    if value.len() > state.config.max_document_bytes {
        return Err(AppError::Validation(format!(
            "{field} exceeds {} bytes",
            state.config.max_document_bytes
        )));
    }
    Ok(())
}
