use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::AuthenticatedUser,
    models::document::{DocumentListResponse, DocumentResponse, UploadResponse},
    AppState,
};

const FILE_FIELD: &str = "file";

pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|_| AppError::Validation("Missing file".to_string()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::Validation("Missing file".to_string()));
    };

    let document_id = state
        .documents
        .ingest(&filename, bytes.to_vec(), user.subject())
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        document_id,
        message: "Document uploaded".to_string(),
    }))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<DocumentListResponse>> {
    let documents = state.documents.list_for_owner(user.subject()).await?;
    Ok(Json(DocumentListResponse {
        success: true,
        documents,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<DocumentResponse>> {
    let document = state
        .documents
        .find_for_owner(&id, user.subject())
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large".to_string())
    } else {
        AppError::Validation(err.body_text())
    }
}
