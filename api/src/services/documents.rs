//! Upload ingestion and owner-scoped document reads.

use crate::extract::{self, DocumentFormat, ExtractionError};
use crate::models::document::Document;
use crate::store::{DocumentRepo, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("filename is required")]
    MissingFilename,
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("extraction task failed: {0}")]
    Task(String),
}

#[derive(Clone)]
pub struct IngestService {
    documents: DocumentRepo,
}

impl IngestService {
    pub fn new(documents: DocumentRepo) -> Self {
        Self { documents }
    }

    /// Extracts the text of an upload and stores it for `owner`, returning
    /// the new document id.
    pub async fn ingest(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        owner: &str,
    ) -> Result<String, IngestError> {
        if filename.trim().is_empty() {
            return Err(IngestError::MissingFilename);
        }
        let format = DocumentFormat::from_filename(filename)?;
        let size = bytes.len();

        // PDF and DOCX parsing is CPU-bound; the upload buffer moves into the
        // task and is dropped there whatever the outcome.
        let content = tokio::task::spawn_blocking(move || extract::extract_as(&bytes, format))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))?
            .inspect_err(|e| {
                tracing::info!(%filename, %owner, error = %e, "extraction failed");
            })?;

        let document = self.documents.insert(filename, &content, owner).await?;
        tracing::info!(
            document_id = %document.id,
            %filename,
            %owner,
            ?format,
            bytes = size,
            chars = content.chars().count(),
            "document ingested"
        );
        Ok(document.id)
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<Document>, IngestError> {
        Ok(self.documents.find_by_owner(owner).await?)
    }

    /// Looks up one document; someone else's document reads as absent.
    pub async fn find_for_owner(
        &self,
        id: &str,
        owner: &str,
    ) -> Result<Option<Document>, IngestError> {
        Ok(self.documents.find_by_id_for_owner(id, owner).await?)
    }
}
