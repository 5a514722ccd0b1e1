//! JSON request-body extractor.
//!
//! Axum's own `Json` answers undeserializable bodies with 422 and a raw
//! serde message. API clients expect the error envelope with HTTP 400,
//! and a body missing required fields must read "Missing required
//! fields", so rejections are remapped here.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Drop-in replacement for `axum::Json` in handler arguments, rejecting
/// with `ApiError` instead of axum's default rejection.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(map_rejection(rejection)),
        }
    }
}

fn map_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(_) => {
            ApiError::Validation("Missing required fields".to_string())
        }
        JsonRejection::JsonSyntaxError(_) => ApiError::Validation("Malformed JSON body".to_string()),
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::Validation("Expected an application/json request body".to_string())
        }
        other => ApiError::Validation(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        to: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_rejected_with_contract_message() {
        let err = JsonBody::<Payload>::from_request(json_request("{}"), &())
            .await
            .err()
            .unwrap();
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Missing required fields"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let err = JsonBody::<Payload>::from_request(json_request("{not json"), &())
            .await
            .err()
            .unwrap();
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Malformed JSON body"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_valid_body_extracted() {
        let JsonBody(payload) =
            JsonBody::<Payload>::from_request(json_request(r#"{"to":"client@example.com"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.to, "client@example.com");
    }
}
