//! Image Upload Handler
//!
//! Validates and recompresses uploads, then proxies them to the external
//! image host. Identical bytes are served from the stored reference instead
//! of being uploaded twice.

use std::io::Cursor;

use axum::Json;
use axum::extract::{Extension, Multipart, State};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::ImageRefRepository;
use crate::utils::{AppError, AppResult};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for produce photos
const JPEG_QUALITY: u8 = 85;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
}

/// Recompress to JPEG with fixed quality
fn compress_image(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    }

    Ok(buffer)
}

/// Validate image file
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::validation(format!(
            "Invalid image file ({}): {}",
            ext_lower, e
        )));
    }

    Ok(())
}

/// Upload image handler
pub async fn upload(
    State(state): State<ServerState>,
    Extension(_current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            original_filename = field.file_name().map(|s| s.to_string());
            field_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = field_data.ok_or_else(|| {
        AppError::validation("No 'file' field found. Field name must be 'file'".to_string())
    })?;
    let filename = original_filename
        .ok_or_else(|| AppError::validation("No filename provided in file field".to_string()))?;

    if data.is_empty() {
        return Err(AppError::validation("Empty file provided".to_string()));
    }

    let ext = std::path::Path::new(&filename)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_string()))
        .ok_or_else(|| AppError::validation(format!("Invalid file extension for: {}", filename)))?;

    validate_image(&data, &ext)?;

    let compressed = compress_image(&data)?;
    let file_hash = hex::encode(Sha256::digest(&compressed));

    let refs = ImageRefRepository::new(state.db.clone());

    // Same bytes already hosted - return the existing URL
    if let Some(existing) = refs.find_by_hash(&file_hash).await? {
        tracing::info!(
            original_name = %filename,
            url = %existing.url,
            "Duplicate image detected, returning hosted URL"
        );
        return Ok(Json(UploadResponse {
            url: existing.url,
            original_name: filename,
            size: compressed.len(),
            format: "jpg".to_string(),
        }));
    }

    let url = state.image_host.upload(&compressed).await?;

    // Best effort: losing the dedup record only costs a re-upload later
    if let Err(e) = refs.insert(&file_hash, &url, compressed.len() as i64).await {
        tracing::warn!(hash = %file_hash, error = %e, "Failed to record image ref");
    }

    tracing::info!(
        original_name = %filename,
        size = compressed.len(),
        hash = %file_hash,
        "Image uploaded to host"
    );

    Ok(Json(UploadResponse {
        url,
        original_name: filename,
        size: compressed.len(),
        format: "jpg".to_string(),
    }))
}
