// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Continuation endpoint handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, warn};

use super::request::StoreContinuationRequest;
use super::response::{
    ContinuationResponse, MessageResponse, MESSAGE_ALREADY_EXISTS, MESSAGE_STORED,
};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::fingerprint::Fingerprint;
use crate::storage::{ContinuationRecord, PutOutcome};

fn parse_hash(hash: &str) -> Result<Fingerprint, ApiError> {
    let hash = hash.trim();
    if hash.is_empty() {
        return Err(ApiError::missing_field("hash"));
    }
    Ok(hash.parse()?)
}

/// GET /continuations/{hash} - Replay a stored continuation
pub async fn get_continuation_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<ContinuationResponse>, ApiError> {
    let fingerprint = parse_hash(&hash)?;

    match state.continuations.get(fingerprint).await? {
        Some(record) => {
            if record.response.is_legacy() {
                debug!("Continuation {} holds a legacy payload", fingerprint);
            }
            Ok(Json(record.into()))
        }
        None => {
            info!("Continuation not found: {}", fingerprint);
            Err(ApiError::NotFound("Continuation not found".to_string()))
        }
    }
}

/// POST /continuations/{hash} - Store a continuation unless one exists
///
/// 201 for the first write, 200 for every later write of the same hash.
pub async fn store_continuation_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    payload: Result<Json<StoreContinuationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let fingerprint = parse_hash(&hash)?;

    let Json(request) = payload.map_err(|e| {
        warn!("Invalid data format for continuation {}: {}", fingerprint, e);
        ApiError::InvalidRequest(e.body_text())
    })?;
    if let Err(e) = request.validate() {
        warn!("Invalid data format for continuation {}: {}", fingerprint, e);
        return Err(e);
    }

    let StoreContinuationRequest {
        response,
        image_url,
    } = request;
    let record = ContinuationRecord::new(fingerprint, response.unwrap_or_default(), image_url);

    match state.continuations.put_if_absent(record).await? {
        PutOutcome::Created => Ok((StatusCode::CREATED, Json(MessageResponse::new(MESSAGE_STORED)))),
        PutOutcome::AlreadyExists => Ok((
            StatusCode::OK,
            Json(MessageResponse::new(MESSAGE_ALREADY_EXISTS)),
        )),
    }
}

/// /continuations without a hash segment
pub async fn missing_hash_handler() -> ApiError {
    ApiError::missing_field("hash")
}
