//! Storage for uploaded images.
//!
//! Files land under the configured upload directory, grouped per entity
//! (`offers/`, `products/`), under generated names so uploads never collide
//! and never escape the directory. The HTTP layer serves the directory
//! read-only at `/uploads`.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::error::{AppError, Result};

/// Largest accepted image upload: 2048 kilobytes.
pub const MAX_IMAGE_BYTES: usize = 2048 * 1024;

/// File extension for an accepted image content type. Uploads with any other
/// content type are rejected at validation.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// Write image bytes under `dir/subdir` and return the relative path that is
/// recorded on the owning row, e.g. `offers/<uuid>.jpg`.
pub fn store_image(dir: &Path, subdir: &str, ext: &str, bytes: &[u8]) -> Result<String> {
    let relative = format!("{}/{}.{}", subdir, Uuid::new_v4(), ext);
    let target = dir.join(&relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;
    }
    fs::write(&target, bytes)
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;
    Ok(relative)
}

/// Best-effort removal of a previously stored image, used when a row is
/// deleted or its image replaced. Missing files are not an error.
pub fn remove_image(dir: &Path, relative: &str) {
    let target = dir.join(relative);
    if let Err(e) = fs::remove_file(&target) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove upload {}: {}", relative, e);
        }
    }
}
