//! Text extraction endpoint
//!
//! `POST /extract-text-from-image` takes a `multipart/form-data` upload with
//! the image in the `image` field (`file` is accepted as well) and answers
//! with the recognized text and its mean confidence.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ocr::OcrEngine;
use crate::state::AppState;

/// Create the extraction router
pub fn router<E: OcrEngine>(max_upload_bytes: usize) -> Router<AppState<E>> {
    Router::new()
        .route("/extract-text-from-image", post(extract_text::<E>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Successful extraction response
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub confidence: f32,
}

async fn extract_text<E: OcrEngine>(
    State(state): State<AppState<E>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>> {
    let image = read_image(&mut multipart).await?;
    tracing::debug!("Received image of {} bytes", image.len());

    let result = state.pool().process(image).await?;

    Ok(Json(ExtractResponse {
        text: result.text,
        confidence: result.confidence,
    }))
}

/// Pull the image bytes out of the upload, rejecting empty payloads
async fn read_image(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "image" && name != "file" {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image data: {}", e)))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("No image provided".to_string()));
        }
        return Ok(data.to_vec());
    }

    Err(AppError::BadRequest(
        "No image provided. Use field name 'image'".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::ocr::testing::{Probe, StubEngine, ENGINE_FAILURE, UNDECODABLE};
    use crate::pool::EnginePool;
    use crate::routes::app;
    use crate::state::AppState;

    const BOUNDARY: &str = "ocr-service-test-boundary";

    fn test_state(probe: &Arc<Probe>) -> AppState<StubEngine> {
        let shared = Arc::clone(probe);
        let pool = EnginePool::new(2, move |id| {
            Ok(StubEngine::new(id, Duration::ZERO, Arc::clone(&shared)))
        })
        .unwrap();
        AppState::new(Config::default(), pool)
    }

    fn png_fixture() -> Vec<u8> {
        let img = image::GrayImage::from_fn(48, 16, |x, y| image::Luma([((x * 5 + y) % 255) as u8]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn upload(field: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"scan.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/extract-text-from-image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_extract_text_from_png() {
        let probe = Probe::new();
        let png = png_fixture();

        let response = app(test_state(&probe)).oneshot(upload("image", &png)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["text"], format!("{} bytes", png.len()));
        assert_eq!(body["confidence"].as_f64(), Some((png.len() % 101) as f64));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_file_field_alias() {
        let probe = Probe::new();
        let response = app(test_state(&probe))
            .oneshot(upload("file", &png_fixture()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_image_rejected_before_pool() {
        let probe = Probe::new();
        let response = app(test_state(&probe)).oneshot(upload("image", b"")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_image_field_rejected() {
        let probe = Probe::new();
        let response = app(test_state(&probe))
            .oneshot(upload("document", &png_fixture()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_unprocessable() {
        let probe = Probe::new();
        let state = test_state(&probe);
        let response = app(state.clone()).oneshot(upload("image", UNDECODABLE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "unreadable_image");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("OCR processing failed: Failed to decode image"));
        assert_eq!(state.pool().stats().available, 2);
    }

    #[tokio::test]
    async fn test_engine_failure_is_server_error() {
        let probe = Probe::new();
        let response = app(test_state(&probe))
            .oneshot(upload("image", ENGINE_FAILURE))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "engine_error");
    }

    #[tokio::test]
    async fn test_shut_down_pool_is_unavailable() {
        let probe = Probe::new();
        let state = test_state(&probe);
        state.pool().shutdown().await;

        let response = app(state).oneshot(upload("image", &png_fixture())).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_pool() {
        let probe = Probe::new();
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();

        let response = app(test_state(&probe)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["engine"], "stub");
        assert_eq!(body["pool"]["size"], 2);
        assert_eq!(body["pool"]["available"], 2);
        assert_eq!(body["pool"]["inUse"], 0);
    }
}
