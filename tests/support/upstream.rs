// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Throwaway upstream image host for ingestion tests
//!
//! Serves generated images and misbehaving responses on a random local port.

#![allow(dead_code)]

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

pub const SLOW_RESPONSE: Duration = Duration::from_secs(3);

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode test png");
    out.into_inner()
}

fn png_response(bytes: Vec<u8>) -> impl IntoResponse {
    ([("content-type", "image/png")], bytes)
}

/// Start the host and return its base URL (`http://127.0.0.1:<port>`)
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/wide.png", get(|| async { png_response(png(2000, 1000)) }))
        .route("/small.png", get(|| async { png_response(png(100, 100)) }))
        .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
        .route("/forbidden.png", get(|| async { StatusCode::FORBIDDEN }))
        .route("/garbage.png", get(|| async { "this is not an image" }))
        .route("/big.bin", get(|| async { vec![0u8; 64 * 1024] }))
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(SLOW_RESPONSE).await;
                png_response(png(10, 10))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr: SocketAddr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}
