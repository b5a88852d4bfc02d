//! Plain-text extraction from uploaded files.
//!
//! The declared extension picks the extractor; content is never sniffed.

pub(crate) mod docx;
pub(crate) mod pdf;
mod text;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),
    #[error("corrupt file: {0}")]
    CorruptFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Accepts `pdf`, `.PDF` and so on.
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            _ => Err(ExtractionError::UnsupportedFormat(extension.to_string())),
        }
    }

    /// Format implied by the suffix of `filename`, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

pub fn extract(bytes: &[u8], extension: &str) -> Result<String, ExtractionError> {
    extract_as(bytes, DocumentFormat::from_extension(extension)?)
}

pub fn extract_as(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes),
        DocumentFormat::Docx => docx::extract_text(bytes),
        DocumentFormat::Txt => text::extract_text(bytes),
    }
}
