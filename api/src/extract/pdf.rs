//! PDF text via lopdf, one page at a time.

use lopdf::Document;
use tracing::{debug, warn};

use super::ExtractionError;

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| ExtractionError::CorruptFile(format!("unreadable PDF: {e}")))?;

    // Files restricted by an owner password alone open with the empty user password.
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| ExtractionError::CorruptFile(format!("encrypted PDF: {e}")))?;
    }

    let pages = doc.get_pages();
    let mut text = String::new();
    // `get_pages` is keyed by page number, so iteration is already in page order.
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                // A page without extractable text contributes nothing.
                debug!(page = page_number, error = %e, "no text on PDF page");
            }
        }
    }

    if pages.is_empty() {
        warn!("PDF has no pages");
    }
    Ok(text)
}
