use super::ExtractionError;

pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ExtractionError::CorruptFile(format!("text is not valid UTF-8: {e}")))
}
