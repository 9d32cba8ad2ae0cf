// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Body of POST /images/upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadImageRequest {
    /// Transient URL of a freshly generated image
    #[serde(default)]
    pub url: Option<String>,
}

impl UploadImageRequest {
    /// The source URL, or a 400 if it is missing
    pub fn source_url(&self) -> Result<&str, ApiError> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::missing_field("url")),
        }
    }
}
