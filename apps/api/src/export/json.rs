use crate::export::ExportError;
use crate::layout::rich_text::strip_html;
use crate::models::ResumeDocument;

/// Copy of the document with rich-text descriptions reduced to plain text.
///
/// A missing education description is exported as an empty string.
pub fn clean_for_export(document: &ResumeDocument) -> ResumeDocument {
    let mut cleaned = document.clone();
    for item in &mut cleaned.work_experience {
        item.description = strip_html(&item.description);
    }
    for item in &mut cleaned.education {
        item.description = Some(strip_html(item.description.as_deref().unwrap_or_default()));
    }
    cleaned
}

/// Pretty-printed JSON of the cleaned document.
pub fn to_json_bytes(document: &ResumeDocument) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(&clean_for_export(document))?)
}
