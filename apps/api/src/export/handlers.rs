//! Axum route handlers for the stateless Export API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::export::{export_filename, export_pdf, to_json_bytes, PdfOptions};
use crate::models::ResumeDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportPdfRequest {
    pub document: ResumeDocument,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Binary download response with a `Content-Disposition` attachment header.
pub fn attachment(content_type: &'static str, filename: &str, body: impl Into<Bytes>) -> Response {
    let body: Bytes = body.into();
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<ExportPdfRequest>,
) -> Result<Response, AppError> {
    let name = req
        .filename
        .clone()
        .unwrap_or_else(|| req.document.title.clone());
    let options = PdfOptions {
        title: req.document.title.clone(),
        ..PdfOptions::default()
    };

    let pagination = state.engine.paginate_once(req.document).await?;
    let bytes = export_pdf(pagination.pages, state.engine.config().clone(), options).await?;

    Ok(attachment(
        "application/pdf",
        &export_filename(Some(&name), "pdf"),
        bytes,
    ))
}

/// POST /api/v1/export/json
pub async fn handle_export_json(Json(document): Json<ResumeDocument>) -> Result<Response, AppError> {
    let bytes = to_json_bytes(&document)?;
    Ok(attachment(
        "application/json",
        &export_filename(Some(&document.title), "json"),
        bytes,
    ))
}
