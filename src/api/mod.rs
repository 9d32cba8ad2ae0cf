// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod continuations;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod images;

pub use continuations::{ContinuationResponse, MessageResponse, StoreContinuationRequest};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, StatsResponse};
pub use http_server::{create_app, start_server, AppState};
pub use images::{UploadImageRequest, UploadImageResponse};
