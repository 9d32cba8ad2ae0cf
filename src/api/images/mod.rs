// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image endpoints
//!
//! Provides POST /images/upload and GET /images/file/{id}.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{image_file_handler, upload_image_handler, IMAGE_CACHE_CONTROL};
pub use request::UploadImageRequest;
pub use response::UploadImageResponse;
