// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::fingerprint::FingerprintParseError;
use crate::ingest::IngestError;
use crate::storage::{BlobStoreError, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

/// Outcome of a failed request, mapped to a status code only here
#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    UpstreamFailure(String),
    StorageFailure(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone()),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone()),
            ApiError::ValidationError { field, message } => {
                ("validation_error", format!("{}: {}", field, message))
            }
            ApiError::UpstreamFailure(msg) => ("upstream_failure", msg.clone()),
            ApiError::StorageFailure(msg) => ("storage_failure", msg.clone()),
            ApiError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        ErrorResponse {
            error: message,
            error_type: error_type.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::UpstreamFailure(_)
            | ApiError::StorageFailure(_)
            | ApiError::InternalError(_) => 500,
        }
    }

    pub fn missing_field(field: &str) -> Self {
        ApiError::ValidationError {
            field: field.to_string(),
            message: "is required".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::UpstreamFailure(msg) => write!(f, "Upstream failure: {}", msg),
            ApiError::StorageFailure(msg) => write!(f, "Storage failure: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<FingerprintParseError> for ApiError {
    fn from(e: FingerprintParseError) -> Self {
        ApiError::ValidationError {
            field: "hash".to_string(),
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::StorageFailure(e.to_string())
    }
}

impl From<BlobStoreError> for ApiError {
    fn from(e: BlobStoreError) -> Self {
        match e {
            BlobStoreError::NotFound(_) => ApiError::NotFound("Image not found".to_string()),
            other => ApiError::StorageFailure(other.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        if e.kind.is_upstream() {
            ApiError::UpstreamFailure(e.to_string())
        } else {
            ApiError::StorageFailure(e.to_string())
        }
    }
}
