mod common;

use caliper_com::{
    ClientConfig, ComError, MeasureBackend, MeasureClient, ProcessingParams, SelectedFile, parse_response,
};
use common::{json_response, serve_once};
use http::StatusCode;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;

fn client_for(addr: std::net::SocketAddr) -> MeasureClient {
    MeasureClient::new(ClientConfig::default().with_base_url(format!("http://{addr}"))).unwrap()
}

#[tokio::test]
async fn test_process_image_sends_json_body() {
    let (addr, server) = serve_once(json_response(
        "200 OK",
        r#"{"diameter_mm": 12.3, "category": "medium", "radius_pixels": 45.2}"#,
    ))
    .await;

    let params = ProcessingParams {
        threshold: 128,
        blur_amount: 5,
        pixel_ratio: 0.1,
    };
    let response = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &params)
        .await
        .unwrap();

    assert_eq!(response.diameter_mm, Some(12.3));
    assert_eq!(response.category.as_deref(), Some("medium"));
    assert_eq!(response.radius_pixels, Some(45.2));

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line(), "POST /process_image HTTP/1.1");
    assert_eq!(captured.header("content-type"), Some("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(
        body,
        json!({
            "image_data": "data:image/png;base64,AAAA",
            "threshold": "128",
            "blur_amount": "5",
            "pixel_ratio": "0.1"
        })
    );
}

fn find(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .position(|w| w == needle.as_bytes())
        .unwrap_or_else(|| panic!("{needle:?} not found in body"))
}

#[tokio::test]
async fn test_upload_image_sends_multipart_form() {
    let (addr, server) = serve_once(json_response(
        "200 OK",
        r#"{"diameter_mm": 50, "category": "Medium", "radius_pixels": 94, "processed_image": "data:image/png;base64,AAAA", "center_x": 320, "center_y": 240}"#,
    ))
    .await;

    let file = SelectedFile::new("coin.png", vec![0x89, b'P', b'N', b'G']);
    let response = client_for(addr)
        .upload_image(&file, &ProcessingParams::default())
        .await
        .unwrap();

    assert_eq!(response.center_x, Some(320));
    assert_eq!(response.processed_image.as_deref(), Some("data:image/png;base64,AAAA"));

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line(), "POST /upload_image HTTP/1.1");
    assert!(
        captured
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary=")
    );

    let body = &captured.body;
    let file_part = find(body, "name=\"file\"; filename=\"coin.png\"");
    let file_type = find(body, "Content-Type: image/png");
    let file_data = find(body, "PNG");
    let threshold = find(body, "name=\"threshold\"\r\n\r\n100\r\n");
    let blur = find(body, "name=\"blur_amount\"\r\n\r\n3\r\n");
    let ratio = find(body, "name=\"pixel_ratio\"\r\n\r\n0.2645833\r\n");

    assert!(file_part < file_type && file_type < file_data);
    assert_eq!(body[file_data - 1], 0x89);
    assert!(file_data < threshold && threshold < blur && blur < ratio);
}

#[tokio::test]
async fn test_server_error_body_is_returned() {
    let (addr, _server) = serve_once(json_response(
        "500 INTERNAL SERVER ERROR",
        r#"{"error": "No contours found", "diameter_mm": 0, "category": "None", "radius_pixels": 0, "processed_image": null}"#,
    ))
    .await;

    let response = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &ProcessingParams::default())
        .await
        .unwrap();

    assert_eq!(response.error_message(), Some("No contours found"));
}

#[tokio::test]
async fn test_non_utf8_header_value_is_accepted() {
    let body = r#"{"diameter_mm": 1.5, "category": "Small", "radius_pixels": 3}"#;
    let mut reply = b"HTTP/1.1 200 OK\r\nX-Note: caf".to_vec();
    reply.push(0xE9);
    reply.extend_from_slice(
        format!(
            "\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
        .as_bytes(),
    );

    let (addr, _server) = serve_once(reply).await;

    let response = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &ProcessingParams::default())
        .await
        .unwrap();

    assert_eq!(response.category.as_deref(), Some("Small"));
}

#[tokio::test]
async fn test_non_json_error_status() {
    let (addr, _server) = serve_once(
        b"HTTP/1.1 404 NOT FOUND\r\nContent-Type: text/html\r\nContent-Length: 9\r\n\r\nNot Found".to_vec(),
    )
    .await;

    let result = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &ProcessingParams::default())
        .await;

    match result {
        Err(ComError::Status(status)) => assert_eq!(status.as_u16(), 404),
        other => panic!("Expected ComError::Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_success_is_json_error() {
    let (addr, _server) = serve_once(json_response("200 OK", "<html></html>")).await;

    let result = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &ProcessingParams::default())
        .await;

    assert!(matches!(result, Err(ComError::Json(_))));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client_for(addr)
        .process_image("data:image/png;base64,AAAA", &ProcessingParams::default())
        .await;

    match result {
        Err(ComError::Http(e)) => assert!(e.is_connect()),
        other => panic!("Expected ComError::Http, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and never answer
    let _server = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let client = MeasureClient::new(
        ClientConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Some(Duration::from_millis(100))),
    )
    .unwrap();

    let result = timeout(
        Duration::from_secs(5),
        client.process_image("data:image/png;base64,AAAA", &ProcessingParams::default()),
    )
    .await
    .expect("client should give up on its own");

    assert!(matches!(result, Err(ComError::Timeout(d)) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_oversized_upload_never_connects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = MeasureClient::new(
        ClientConfig::default()
            .with_base_url(format!("http://{addr}"))
            .with_max_upload_bytes(4),
    )
    .unwrap();

    let file = SelectedFile::new("big.jpg", vec![0u8; 10]);
    let result = client.upload_image(&file, &ProcessingParams::default()).await;

    assert!(matches!(
        result,
        Err(ComError::PayloadTooLarge { size: 10, limit: 4 })
    ));
    assert!(
        timeout(Duration::from_millis(100), listener.accept()).await.is_err(),
        "no connection should have been made"
    );
}

#[test]
fn test_parse_response_classification() {
    let ok = parse_response(StatusCode::OK, br#"{"diameter_mm": 1, "category": "Small", "radius_pixels": 2}"#);
    assert!(ok.is_ok());

    let rejected = parse_response(StatusCode::BAD_REQUEST, br#"{"error": "No file uploaded"}"#).unwrap();
    assert_eq!(rejected.error_message(), Some("No file uploaded"));

    let empty_error = parse_response(StatusCode::INTERNAL_SERVER_ERROR, br#"{"error": ""}"#);
    assert!(matches!(empty_error, Err(ComError::Status(s)) if s == StatusCode::INTERNAL_SERVER_ERROR));

    let html = parse_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
    assert!(matches!(html, Err(ComError::Status(s)) if s == StatusCode::BAD_GATEWAY));
}

#[test]
fn test_https_base_url_is_rejected() {
    let result = MeasureClient::new(ClientConfig::default().with_base_url("https://example.com"));
    assert!(matches!(result, Err(ComError::UnsupportedScheme(s)) if s == "https"));
}

#[test]
fn test_base_url_without_scheme_is_rejected() {
    let result = MeasureClient::new(ClientConfig::default().with_base_url("localhost:8000/api"));
    assert!(result.is_err());
}

#[test]
fn test_endpoint_keeps_base_path() {
    let client = MeasureClient::new(ClientConfig::default().with_base_url("http://10.0.0.5:8000/measure/")).unwrap();
    assert_eq!(
        client.endpoint("/upload_image").unwrap().to_string(),
        "http://10.0.0.5:8000/measure/upload_image"
    );
}

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url(), "http://127.0.0.1:8000");
    assert_eq!(config.timeout(), None);
    assert_eq!(config.max_upload_bytes(), 16 * 1024 * 1024);
}
