//! Axum route handlers for the Layout API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::layout::{PageConfig, Pagination};
use crate::models::ResumeDocument;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub page: PageConfig,
    pub content_width: f32,
    pub content_height: f32,
    /// Packing budget per page.
    pub safe_content_height: f32,
    pub render_height: f32,
}

/// GET /api/v1/layout
pub async fn handle_get_layout(State(state): State<AppState>) -> Json<LayoutResponse> {
    let page = state.engine.config().clone();
    Json(LayoutResponse {
        content_width: page.content_width(),
        content_height: page.content_height(),
        safe_content_height: page.safe_content_height(),
        render_height: page.render_height(),
        page,
    })
}

/// POST /api/v1/paginate
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<Pagination>, AppError> {
    let pagination = state.engine.paginate_once(document).await?;
    Ok(Json(pagination))
}
