use caliper_com::ComError;
use http::StatusCode;
use std::error::Error;
use std::time::Duration;

#[test]
fn test_display() {
    assert_eq!(
        ComError::PayloadTooLarge { size: 20, limit: 10 }.to_string(),
        "payload too large: 20 bytes (limit 10)"
    );
    assert_eq!(
        ComError::Status(StatusCode::NOT_FOUND).to_string(),
        "server responded with 404 Not Found"
    );
    assert_eq!(
        ComError::Timeout(Duration::from_millis(2500)).to_string(),
        "request timed out after 2.5s"
    );
    assert_eq!(
        ComError::UnsupportedScheme("https".to_string()).to_string(),
        "unsupported URL scheme: https"
    );
    assert_eq!(
        ComError::InvalidResponse("missing field `category`".to_string()).to_string(),
        "invalid response: missing field `category`"
    );
}

#[test]
fn test_from_json() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: ComError = json_err.into();
    assert!(matches!(err, ComError::Json(_)));
    assert!(err.to_string().starts_with("json error: "));
    assert!(err.source().is_some());
}

#[test]
fn test_status_has_no_source() {
    assert!(ComError::Status(StatusCode::BAD_GATEWAY).source().is_none());
}
