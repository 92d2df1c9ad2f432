//! HTTP routes for career-tree

pub mod explore;
pub mod health;
pub mod map;
pub mod submit;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::types::CareerError;

pub use explore::{handle_explore, handle_metadata, handle_roots, parse_slugs, EXPLORE_PREFIX};
pub use health::{health_check, version_info};
pub use map::handle_map;
pub use submit::{handle_edit, handle_suggest};

#[derive(Serialize)]
struct ApiError<'a> {
    error: &'a str,
}

fn build_response(
    status: StatusCode,
    body: Vec<u8>,
    cache_control: &'static str,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", cache_control)
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| {
            let mut fallback = Response::new(Full::new(Bytes::from_static(
                br#"{"error":"Internal error"}"#,
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Serialize `value` as the JSON body of a `status` response
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => build_response(status, body, "no-cache"),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
        }
    }
}

/// Like [`json_response`], for content that only changes on dataset reload
pub fn cached_json_response<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => build_response(StatusCode::OK, body, "public, max-age=60"),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
        }
    }
}

/// `{"error": message}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(&ApiError { error: message }).unwrap_or_default();
    build_response(status, body, "no-cache")
}

/// Error response whose status comes from the error kind
pub fn career_error_response(err: CareerError) -> Response<Full<Bytes>> {
    let (status, message) = err.into_status_code_and_body();
    error_response(status, &message)
}

/// Parse a `application/x-www-form-urlencoded` query string
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str(query).unwrap_or_else(|e| {
        debug!(error = %e, "Unparseable query string");
        HashMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("key=10th%20Class%2FScience&x=");
        assert_eq!(params.get("key").map(String::as_str), Some("10th Class/Science"));
        assert_eq!(params.get("x").map(String::as_str), Some(""));
        assert!(parse_query_params("").is_empty());
    }

    #[test]
    fn test_plus_is_space() {
        let params = parse_query_params("key=10th+Class");
        assert_eq!(params["key"], "10th Class");
    }

    #[tokio::test]
    async fn test_career_error_response_uses_status_code() {
        use http_body_util::BodyExt;

        let response = career_error_response(CareerError::NotFound("10th/Arts".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not found: 10th/Arts");

        let limited = career_error_response(CareerError::RateLimited);
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_response(StatusCode::NOT_FOUND, "Not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }
}
