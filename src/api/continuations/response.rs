// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Continuation response types

use serde::{Deserialize, Serialize};

use crate::storage::ContinuationRecord;

pub const MESSAGE_STORED: &str = "Continuation stored successfully";
pub const MESSAGE_ALREADY_EXISTS: &str = "Continuation already exists";

/// Body of a GET /continuations/{hash} hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationResponse {
    pub response: String,
    /// Empty string when the continuation has no image
    pub image_url: String,
}

impl From<ContinuationRecord> for ContinuationResponse {
    fn from(record: ContinuationRecord) -> Self {
        Self {
            response: record.response.into_raw(),
            image_url: record.image_reference.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
