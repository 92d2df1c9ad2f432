//! Submission routes
//!
//! - `POST /api/edit` - propose changes to an existing node
//! - `POST /api/suggest` - propose a new child path

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::submission::{Accepted, SubmissionError, SubmissionGateway, ValidationErrors};
use crate::types::CareerError;

#[derive(Serialize)]
pub struct SubmitResponse<'a> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a ValidationErrors>,
}

fn to_response(result: Result<Accepted, SubmissionError>) -> Response<Full<Bytes>> {
    let err = match result {
        Ok(accepted) => {
            return json_response(
                StatusCode::OK,
                &SubmitResponse {
                    success: true,
                    message: accepted.message,
                    id: Some(&accepted.id),
                    errors: None,
                },
            )
        }
        Err(err) => err,
    };

    let message = err.public_message();
    let errors = match &err {
        SubmissionError::Invalid(errors) => Some(errors.clone()),
        _ => None,
    };
    let status = CareerError::from(err).status_code();

    json_response(
        status,
        &SubmitResponse {
            success: false,
            message,
            id: None,
            errors: errors.as_ref(),
        },
    )
}

/// POST /api/edit
pub async fn handle_edit(gateway: &SubmissionGateway, body: Bytes) -> Response<Full<Bytes>> {
    to_response(gateway.submit_edit(&body).await)
}

/// POST /api/suggest
pub async fn handle_suggest(gateway: &SubmissionGateway, body: Bytes) -> Response<Full<Bytes>> {
    to_response(gateway.submit_suggestion(&body).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{MemorySubmissionStore, TokenBucket};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn gateway(tokens: u32) -> SubmissionGateway {
        SubmissionGateway::new(
            Arc::new(TokenBucket::new(tokens, Duration::from_secs(3600))),
            Arc::new(MemorySubmissionStore::new()),
        )
    }

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn suggestion() -> Bytes {
        Bytes::from(
            json!({
                "title": "Game Design",
                "description": "Designing mechanics and levels.",
                "parentPath": "12th Science/PCM"
            })
            .to_string(),
        )
    }

    #[tokio::test]
    async fn test_suggest_success() {
        let response = handle_suggest(&gateway(5), suggestion()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Suggestion saved to Database!");
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn test_suggest_invalid() {
        let response = handle_suggest(&gateway(5), Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid input");
        assert_eq!(body["errors"]["fieldErrors"]["parentPath"][0], "Required");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let gateway = gateway(1);
        assert_eq!(
            handle_suggest(&gateway, suggestion()).await.status(),
            StatusCode::OK
        );
        let response = handle_edit(&gateway, Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Too many requests. Slow down.");
        assert!(body.get("errors").is_none());
    }
}
