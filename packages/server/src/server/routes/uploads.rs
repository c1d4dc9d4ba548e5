use axum::body::Bytes;
use axum::extract::{Extension, Multipart};
use axum::Json;
use tracing::{debug, warn};

use crate::common::ApiError;
use crate::kernel::StoredFile;
use crate::server::app::AppState;

/// Upper bound on files in one upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 5;

struct PendingFile {
    name: String,
    mime: String,
    bytes: Bytes,
}

/// POST /api/uploads - multipart photos; returns attachment references
///
/// Nothing is written unless every file in the request is acceptable.
pub async fn upload_handler(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<StoredFile>>, ApiError> {
    let file_store = &state.deps.file_store;
    let mut pending = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "Skipping non-file multipart field");
            continue;
        };
        if pending.len() == MAX_FILES_PER_UPLOAD {
            return Err(ApiError::BadRequest(format!(
                "At most {} files per upload",
                MAX_FILES_PER_UPLOAD
            )));
        }

        let mime = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_guess::from_path(&name).first_or_octet_stream().to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        file_store.validate(&mime, &bytes)?;
        pending.push(PendingFile { name, mime, bytes });
    }

    if pending.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let mut stored = Vec::with_capacity(pending.len());
    for file in &pending {
        match file_store.store(Some(&file.name), &file.mime, &file.bytes).await {
            Ok(meta) => stored.push(meta),
            Err(e) => {
                for meta in &stored {
                    if let Err(cleanup) = file_store.discard(&meta.filename).await {
                        warn!(filename = %meta.filename, error = %cleanup, "Failed to discard partial upload");
                    }
                }
                return Err(e.into());
            }
        }
    }

    Ok(Json(stored))
}
