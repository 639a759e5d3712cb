//! Image upload plumbing and media serving
//!
//! Upload endpoints live with their owners (admin / super-admin modules);
//! they all go through [`attach`] / [`detach`]:
//! multipart → validate + JPEG re-encode (blocking pool) → file on disk →
//! image row swapped in one transaction.

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::Response,
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

use crate::db::images::{self, ImageOwner};
use crate::error::internal;
use crate::media::{self, ProcessedImage};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub hash: String,
    pub url: String,
}

/// Read the `file` field of a multipart body
async fn read_file_field(multipart: &mut Multipart) -> Result<(Vec<u8>, String), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| {
                AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
            })?;
            return Ok((data.to_vec(), file_name));
        }
    }
    Err(AppError::with_message(
        ErrorCode::InvalidRequest,
        "No file provided",
    ))
}

/// Validate, re-encode and store an uploaded image
pub async fn store_upload(state: &AppState, mut multipart: Multipart) -> Result<ProcessedImage, AppError> {
    let (data, file_name) = read_file_field(&mut multipart).await?;

    let max = state.max_upload_bytes;
    let processed = tokio::task::spawn_blocking(move || media::process_upload(&data, &file_name, max))
        .await
        .map_err(internal)??;

    state.images.save(&processed).await.map_err(|e| {
        tracing::error!(hash = %processed.hash, error = %e, "Image write failed");
        AppError::new(ErrorCode::StorageError)
    })?;
    Ok(processed)
}

/// Store an upload and make it `owner`'s current image
pub async fn attach(
    state: &AppState,
    owner: ImageOwner,
    actor: i64,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    let processed = store_upload(state, multipart).await?;
    images::set_image(&state.pool, owner, &processed, actor).await?;

    tracing::info!(
        content_type = owner.content_type().as_db(),
        owner_id = owner.owner_id(),
        hash = %processed.hash,
        "Image attached"
    );
    Ok(Json(ImageUploadResponse {
        url: state.image_url(&processed.hash),
        hash: processed.hash,
    }))
}

/// Remove `owner`'s current image
pub async fn detach(
    state: &AppState,
    owner: ImageOwner,
    actor: i64,
) -> Result<Json<serde_json::Value>, AppError> {
    images::clear_image(&state.pool, owner, actor).await?;
    Ok(Json(serde_json::json!({ "message": "Image removed" })))
}

/// GET /media/{hash}
pub async fn get_media(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    if !media::is_valid_hash(&hash) {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Invalid image hash",
        ));
    }
    let hash = hash.to_ascii_lowercase();

    if !images::is_live(&state.pool, &hash).await.map_err(internal)? {
        return Err(AppError::new(ErrorCode::ImageNotFound));
    }
    let bytes = state
        .images
        .read(&hash)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ImageNotFound))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        // Content-addressed: the bytes behind a hash never change
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(bytes))
        .map_err(internal)
}
