//! Text extraction from uploaded CV files.
//!
//! `TextExtractor::extract` returns a typed error per failure. The HTTP layer
//! uses `extract_or_empty`, which logs the failure and returns `""`; empty text
//! ends the request with a 400.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

pub mod doc;
pub mod docx;
pub mod pdf;

/// Upper bound for DOCX and PDF parsing and the legacy `.doc` converter.
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_SNIPPET_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Text is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("DOC conversion failed: {0}")]
    Converter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Docx,
    Pdf,
    Doc,
    Txt,
}

impl FileFormat {
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        match extension.to_ascii_lowercase().as_str() {
            "docx" => Ok(FileFormat::Docx),
            "pdf" => Ok(FileFormat::Pdf),
            "doc" => Ok(FileFormat::Doc),
            "txt" => Ok(FileFormat::Txt),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Docx => "DOCX",
            FileFormat::Pdf => "PDF",
            FileFormat::Doc => "DOC",
            FileFormat::Txt => "TXT",
        }
    }
}

/// Text after the last `.` of `filename`, lowercased. A name without a dot
/// yields the whole name.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    doc_converter: String,
}

impl TextExtractor {
    pub fn new(doc_converter: impl Into<String>) -> Self {
        Self {
            doc_converter: doc_converter.into(),
        }
    }

    pub async fn extract(&self, bytes: &[u8], extension: &str) -> Result<String, ExtractionError> {
        let format = FileFormat::from_extension(extension)?;

        let text = match format {
            FileFormat::Docx => docx::extract_docx_off_runtime(bytes.to_vec()).await?,
            FileFormat::Pdf => pdf::extract_pdf(bytes.to_vec()).await?,
            FileFormat::Doc => doc::convert_doc(&self.doc_converter, bytes).await?,
            FileFormat::Txt => extract_txt(bytes)?,
        };

        info!(
            "Extracted text from {} (length: {})",
            format.as_str(),
            text.chars().count()
        );
        debug!("Extracted text snippet: {}...", snippet(&text));

        Ok(text)
    }

    /// Same as `extract`, with every failure logged and collapsed to `""`.
    pub async fn extract_or_empty(&self, bytes: &[u8], extension: &str) -> String {
        match self.extract(bytes, extension).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error extracting text from file: {e}");
                String::new()
            }
        }
    }
}

fn extract_txt(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = String::from_utf8(bytes.to_vec())?;
    Ok(text.trim_start_matches('\u{feff}').trim().to_string())
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(LOG_SNIPPET_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
