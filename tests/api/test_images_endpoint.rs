// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image upload and streaming over HTTP

use axum::http::{header, Method, StatusCode};
use image::GenericImageView;
use serde_json::json;

use crate::app::{body_bytes, body_json, test_app};
use crate::upstream::spawn_upstream;

#[tokio::test]
async fn test_upload_then_stream() {
    let app = test_app().await;
    let upstream = spawn_upstream().await;

    let res = app
        .send(
            Method::POST,
            "/images/upload",
            Some(json!({"url": format!("{}/wide.png", upstream)})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["url"], format!("/images/file/{}", id));

    let res = app
        .send(Method::GET, body["url"].as_str().unwrap(), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        res.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000"
    );
    let length: usize = res.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let bytes = body_bytes(res).await;
    assert_eq!(bytes.len(), length);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (512, 256));
}

#[tokio::test]
async fn test_upload_requires_url() {
    let app = test_app().await;

    for body in [json!({}), json!({"url": ""}), json!({"url": "   "})] {
        let res = app.send(Method::POST, "/images/upload", Some(body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = app
        .send_raw(Method::POST, "/images/upload", "not json")
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_upstream_failure_is_server_error() {
    let app = test_app().await;
    let upstream = spawn_upstream().await;

    let res = app
        .send(
            Method::POST,
            "/images/upload",
            Some(json!({"url": format!("{}/missing.png", upstream)})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await["error_type"], "upstream_failure");

    let res = app
        .send(
            Method::POST,
            "/images/upload",
            Some(json!({"url": format!("{}/garbage.png", upstream)})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_image_is_not_found() {
    let app = test_app().await;

    for uri in [
        "/images/file/5f0c6a8e-3d1b-4c7e-9a2f-0b1c2d3e4f50",
        "/images/file/not-a-uuid",
        "/images/file/..%2Fcontinuations.db",
    ] {
        let res = app.send(Method::GET, uri, None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(body_json(res).await["error"], "Image not found");
    }
}
