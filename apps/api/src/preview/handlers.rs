//! Axum route handlers for preview sessions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::handlers::attachment;
use crate::models::ResumeDocument;
use crate::preview::{NavAction, PreviewView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub container_width: Option<f32>,
}

/// POST /api/v1/previews
pub async fn handle_create_preview(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<(StatusCode, Json<PreviewView>), AppError> {
    let view = state.previews.create(document, &state.engine).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/previews/:id
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ViewQuery>,
) -> Result<Json<PreviewView>, AppError> {
    if let Some(width) = params.container_width {
        if !width.is_finite() || width < 0.0 {
            return Err(AppError::Validation(format!(
                "container_width must be a non-negative number, got {width}"
            )));
        }
    }
    let view = state
        .previews
        .view(id, params.container_width, &state.engine)
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/previews/:id/document
pub async fn handle_update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<PreviewView>, AppError> {
    let view = state
        .previews
        .update_document(id, document, &state.engine)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/previews/:id/navigate
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<NavAction>,
) -> Result<Json<PreviewView>, AppError> {
    let view = state.previews.navigate(id, action, &state.engine).await?;
    Ok(Json(view))
}

/// POST /api/v1/previews/:id/export
pub async fn handle_export_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (filename, bytes) = state.previews.export(id, &state.engine).await?;
    Ok(attachment("application/pdf", &filename, bytes))
}

/// DELETE /api/v1/previews/:id
pub async fn handle_delete_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.previews.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
