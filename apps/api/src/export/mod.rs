// Export of a paginated document: multi-page PDF and cleaned JSON.

pub mod handlers;
pub mod json;
pub mod pdf;

use thiserror::Error;

use crate::errors::AppError;
use crate::layout::{Page, PageConfig};

pub use json::to_json_bytes;
pub use pdf::{render_pdf, PdfOptions};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the document produced no pages")]
    Empty,

    #[error("failed to encode PDF: {0}")]
    Encode(String),

    #[error("failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders a PDF off the async executor.
pub async fn export_pdf(
    pages: Vec<Page>,
    config: PageConfig,
    options: PdfOptions,
) -> Result<Vec<u8>, AppError> {
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&pages, &config, &options))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF export: {e}")))??;
    Ok(bytes)
}

/// Download filename: non-alphanumerics become `_`, lowercased, `resume` when blank.
pub fn export_filename(name: Option<&str>, extension: &str) -> String {
    let stem: String = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("resume")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.{extension}")
}
