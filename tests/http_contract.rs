//! HTTP contract tests with a stub analyzer instead of model files.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use image::{ImageFormat, RgbImage};
use ndarray::Array2;
use pixelproof::core::errors::{DetectError, DetectResult};
use pixelproof::models::{Classification, MaskPair};
use pixelproof::pipeline::{DetectionOutcome, ImageAnalyzer, SegmentationResult};
use pixelproof::server::{self, AppState};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

struct FixedAnalyzer {
    outcome: DetectionOutcome,
}

impl ImageAnalyzer for FixedAnalyzer {
    fn analyze(&self, _image: &RgbImage) -> DetectResult<DetectionOutcome> {
        Ok(self.outcome.clone())
    }
}

struct FailingAnalyzer;

impl ImageAnalyzer for FailingAnalyzer {
    fn analyze(&self, _image: &RgbImage) -> DetectResult<DetectionOutcome> {
        Err(DetectError::invalid_input("session exploded"))
    }
}

fn app_with(outcome: DetectionOutcome) -> axum::Router {
    server::router(
        AppState::new(Arc::new(FixedAnalyzer { outcome })),
        4 * 1024 * 1024,
    )
}

fn classification(label: &str, probability: f32) -> Classification {
    Classification {
        label: label.to_string(),
        probability,
    }
}

fn authentic_outcome() -> DetectionOutcome {
    DetectionOutcome {
        deepfake: classification("Real", 0.1234),
        message: None,
        forgery: Some(classification("Authentic", 0.2)),
        segmentation: Vec::new(),
    }
}

fn png_bytes() -> Vec<u8> {
    let image = RgbImage::from_pixel(16, 16, image::Rgb([120, 40, 200]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

const BOUNDARY: &str = "test-boundary-7f3a";

fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; \
             name=\"{field}\"; filename=\"upload.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_image_field_is_bad_request() {
    let response = app_with(authentic_outcome())
        .oneshot(multipart_request("attachment", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("No image"));
}

#[tokio::test]
async fn undecodable_upload_is_bad_request() {
    let response = app_with(authentic_outcome())
        .oneshot(multipart_request("image", b"not a real image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("decode"));
}

#[tokio::test]
async fn short_circuited_response_has_message_and_nothing_else() {
    let outcome = DetectionOutcome {
        deepfake: classification("Fake", 0.987_654),
        message: Some("flagged as fake".to_string()),
        forgery: None,
        segmentation: Vec::new(),
    };
    let response = app_with(outcome)
        .oneshot(multipart_request("image", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["deepfake"]["label"], "Fake");
    assert_eq!(body["deepfake"]["confidence"], 0.9877);
    assert_eq!(body["message"], "flagged as fake");
    assert!(body.get("resnet").is_none());
    assert!(body.get("segmentation").is_none());
}

#[tokio::test]
async fn authentic_response_has_resnet_without_segmentation() {
    let response = app_with(authentic_outcome())
        .oneshot(multipart_request("file", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["deepfake"]["label"], "Real");
    assert_eq!(body["resnet"]["label"], "Authentic");
    assert!(body.get("message").is_none());
    assert!(body.get("segmentation").is_none());
}

#[tokio::test]
async fn forged_response_carries_decodable_masks_per_source() {
    let masks = MaskPair {
        probability: Array2::from_elem((8, 8), 0.75),
        binary: Array2::from_elem((8, 8), 1.0),
    };
    let outcome = DetectionOutcome {
        deepfake: classification("Real", 0.2),
        message: None,
        forgery: Some(classification("Forged", 0.91)),
        segmentation: vec![
            SegmentationResult {
                source: "casia".to_string(),
                masks: masks.clone(),
            },
            SegmentationResult {
                source: "defacto".to_string(),
                masks,
            },
        ],
    };
    let response = app_with(outcome)
        .oneshot(multipart_request("image", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["resnet"]["label"], "Forged");
    let segmentation = body["segmentation"].as_object().unwrap();
    assert_eq!(segmentation.len(), 2);

    use base64::Engine;
    for source in ["casia", "defacto"] {
        for key in ["predicted_mask", "binary_mask"] {
            let encoded = segmentation[source][key].as_str().unwrap();
            let png = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .unwrap();
            let decoded = image::load_from_memory(&png).unwrap().to_luma8();
            assert_eq!(decoded.dimensions(), (8, 8));
        }
    }
}

#[tokio::test]
async fn pipeline_failure_is_generic_internal_error() {
    let app = server::router(AppState::new(Arc::new(FailingAnalyzer)), 4 * 1024 * 1024);
    let response = app
        .oneshot(multipart_request("image", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn health_answers_without_models() {
    let response = app_with(authentic_outcome())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn favicon_is_no_content() {
    let response = app_with(authentic_outcome())
        .oneshot(
            Request::builder()
                .uri("/favicon.ico")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
