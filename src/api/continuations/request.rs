// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Continuation write request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Body of POST /continuations/{hash}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreContinuationRequest {
    /// Encoded narrative payload, replayed verbatim on later reads
    #[serde(default)]
    pub response: Option<String>,

    /// Locator of the scene image, if any
    #[serde(default)]
    pub image_url: Option<String>,
}

impl StoreContinuationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.response.as_deref() {
            Some(r) if !r.is_empty() => Ok(()),
            _ => Err(ApiError::missing_field("response")),
        }
    }
}
