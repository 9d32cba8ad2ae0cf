// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::storage::ContinuationStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_continuations: u64,
    pub continuations_with_images: u64,
    pub database_size_bytes: u64,
    /// Megabytes rounded to two decimals
    pub database_size_mb: f64,
}

impl From<ContinuationStats> for StatsResponse {
    fn from(stats: ContinuationStats) -> Self {
        let mb = stats.database_size_bytes as f64 / (1024.0 * 1024.0);
        Self {
            total_continuations: stats.total_continuations,
            continuations_with_images: stats.continuations_with_images,
            database_size_bytes: stats.database_size_bytes,
            database_size_mb: (mb * 100.0).round() / 100.0,
        }
    }
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
    })
}

/// GET /stats - Continuation counts and database size
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = StatsResponse::from(state.continuations.stats().await?);
    info!(
        "Stats retrieved: {} continuations, {} with images",
        stats.total_continuations, stats.continuations_with_images
    );
    Ok(Json(stats))
}
