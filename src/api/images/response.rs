// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload response types

use serde::{Deserialize, Serialize};

use crate::ingest::BlobLocator;

/// Response of POST /images/upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadImageResponse {
    /// Retrieval path, `/images/file/{id}`
    pub url: String,
    pub id: String,
}

impl From<BlobLocator> for UploadImageResponse {
    fn from(locator: BlobLocator) -> Self {
        Self {
            url: locator.url,
            id: locator.id,
        }
    }
}
