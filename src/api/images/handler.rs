// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image endpoint handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;
use tracing::{debug, error, info, warn};

use super::request::UploadImageRequest;
use super::response::UploadImageResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::ingest::TRANSCODED_CONTENT_TYPE;
use crate::storage::BlobReader;

/// Stored images never change, so clients may cache them for a year
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000";

/// POST /images/upload - Ingest an upstream image into the blob store
///
/// Pipeline:
/// 1. Validate request (400 without a url)
/// 2. Fetch with a hard timeout
/// 3. Transcode to a bounded JPEG
/// 4. Persist and return the locator
pub async fn upload_image_handler(
    State(state): State<AppState>,
    payload: Result<Json<UploadImageRequest>, JsonRejection>,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Invalid image upload request: {}", e);
        ApiError::InvalidRequest(e.body_text())
    })?;
    let source_url = request.source_url()?;

    debug!("Image upload requested from: {}", source_url);
    let locator = state.ingestion.ingest(source_url).await?;

    Ok(Json(locator.into()))
}

/// GET /images/file/{id} - Stream a stored image
pub async fn image_file_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let BlobReader { info, stream } = state.blobs.open_read_stream(&id).await.map_err(|e| {
        if e.is_not_found() {
            info!("Image not found: {}", id);
        }
        ApiError::from(e)
    })?;

    let blob_id = info.id;
    // Headers are already sent by the time a chunk fails; all we can do is log and cut the body
    let stream = stream.inspect_err(move |e| error!("Error streaming image {}: {}", blob_id, e));

    let content_type = if info.content_type.is_empty() {
        TRANSCODED_CONTENT_TYPE.to_string()
    } else {
        info.content_type
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, info.size)
        .header(header::CACHE_CONTROL, IMAGE_CACHE_CONTROL)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::InternalError(format!("failed to build image response: {}", e)))
}
