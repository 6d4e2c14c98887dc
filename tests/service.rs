use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

use waste_classifier::{
    AppState, BoxError, CategorySet, Classifier, InferenceAdapter, MetadataRules, Pipeline,
    Variant, router,
};

const BOUNDARY: &str = "X-WASTE-CLASSIFIER-BOUNDARY";

struct FixedClassifier(Vec<f32>);

impl Classifier for FixedClassifier {
    fn classify(&self, _image: &RgbImage) -> Result<Vec<f32>, BoxError> {
        Ok(self.0.clone())
    }
}

fn pipeline(variant: Variant, raw: Vec<f32>) -> Arc<Pipeline<FixedClassifier>> {
    Arc::new(Pipeline::new(
        InferenceAdapter::new(FixedClassifier(raw), CategorySet::for_variant(variant)),
        MetadataRules::for_variant(variant),
    ))
}

fn app() -> Router {
    let raw = vec![0.1, 0.7, 0.2];
    router(AppState::new(
        pipeline(Variant::TrashNet, raw.clone()),
        pipeline(Variant::Taco, raw.clone()),
        pipeline(Variant::WasteNet, raw),
    ))
}

fn png() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(40, 30))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn large_bmp() -> Vec<u8> {
    let mut bytes = Vec::new();
    let image = RgbImage::from_fn(1024, 1024, |x, y| image::Rgb([x as u8, y as u8, (x ^ y) as u8]));
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Bmp)
        .unwrap();
    bytes
}

fn multipart_body(field: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(uri: &str, field: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, content)))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap();
    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
}

#[tokio::test]
async fn trashnet_returns_flat_shape() {
    let (status, json) = send(upload("/api/classify", "image", &png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "glass");
    assert_close(&json["confidence"], 0.35);
    assert_eq!(json["recyclability"], "recyclable");
    assert!(json["timestamp"].is_string());

    let predictions = json["predictions"].as_object().unwrap();
    assert_eq!(predictions.len(), 6);
    assert_close(&predictions["cardboard"], 0.05);
    assert_close(&predictions["plastic"], 0.35);
    assert_close(&predictions["trash"], 0.1);
}

#[tokio::test]
async fn taco_returns_nested_metadata() {
    let (status, json) = send(upload("/api/taco/classify", "image", &png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "recyclable_container");
    assert_eq!(json["predictions"].as_object().unwrap().len(), 10);
    assert_eq!(json["metadata"]["material"], "mixed");
    assert_eq!(json["metadata"]["recyclable"], true);
    assert!(json.get("recyclability").is_none());
}

#[tokio::test]
async fn wastenet_returns_nested_metadata() {
    let (status, json) = send(upload("/api/wastenet/classify", "image", &png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "recyclable");
    assert_eq!(json["predictions"].as_object().unwrap().len(), 9);
    assert_eq!(json["metadata"]["material"], "mixed");
    assert_eq!(json["metadata"]["recyclable"], true);
}

#[tokio::test]
async fn photo_sized_upload_is_accepted() {
    let bytes = large_bmp();
    assert!(bytes.len() > 3 * 1024 * 1024);

    let (status, json) = send(upload("/api/classify", "image", &bytes)).await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["category"], "glass");
}

#[tokio::test]
async fn missing_image_field_is_a_bad_request() {
    let (status, json) = send(upload("/api/classify", "photo", &png())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No image provided");
}

#[tokio::test]
async fn non_multipart_request_is_a_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/taco/classify")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No image provided");
}

#[tokio::test]
async fn undecodable_image_is_a_bad_request() {
    let (status, json) = send(upload("/api/wastenet/classify", "image", b"not an image")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("failed to decode image"));
}

#[tokio::test]
async fn degenerate_distribution_is_a_server_error() {
    let zeros = vec![0.0; 4];
    let app = router(AppState::new(
        pipeline(Variant::TrashNet, zeros.clone()),
        pipeline(Variant::Taco, zeros.clone()),
        pipeline(Variant::WasteNet, zeros),
    ));

    let response = app.oneshot(upload("/api/classify", "image", &png())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn mock_taco_lists_runner_ups() {
    let request = Request::builder()
        .method("POST")
        .uri("/mock/taco")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "taco");
    assert_eq!(json["predictions"].as_array().unwrap().len(), 4);
    let confidence = json["confidence"].as_f64().unwrap();
    assert!((0.6..=0.95).contains(&confidence));
    assert!(json["disposalRecommendation"].as_str().unwrap().contains(json["category"].as_str().unwrap()));
}

#[tokio::test]
async fn mock_wastenet_reports_material() {
    let request = Request::builder()
        .method("POST")
        .uri("/mock/wastenet")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "wastenet");
    assert!(json["material_type"].is_string());
    let recyclability = json["recyclability"].as_str().unwrap();
    assert!(["recyclable", "non-recyclable", "special-disposal"].contains(&recyclability));
}

#[tokio::test]
async fn health_reports_backends() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["models"]["trashnet"], "onnx");
}
