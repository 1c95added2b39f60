//! PDF text extraction via `pdf-extract`.
//!
//! Parsing runs on the blocking pool under `EXTRACTION_TIMEOUT`; a panic inside
//! the parser surfaces as a join error instead of taking the worker down.

use super::{ExtractionError, EXTRACTION_TIMEOUT};

pub async fn extract_pdf(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let raw = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)),
    )
    .await
    .map_err(|_| ExtractionError::Pdf("PDF extraction timed out".to_string()))?
    .map_err(|e| ExtractionError::Pdf(format!("task join error: {e}")))?
    .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let text = non_blank_lines(&raw);
    tracing::debug!(lines = text.lines().count(), "PDF text extraction complete");
    Ok(text)
}

/// Keeps non-blank lines, trimmed, in reading order. Page breaks (form feeds)
/// count as line breaks.
fn non_blank_lines(raw: &str) -> String {
    raw.split(['\n', '\u{c}'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
