//! Email engagement tracking endpoints.
//!
//! These are hit by mail clients, not by the API's own users: the pixel
//! request comes from image loading and the click from a link follow.
//! Recording runs in the background so the pixel or redirect is served
//! even when the write path is slow.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::app::AppState;

/// 1x1 transparent GIF served for open-tracking requests.
const TRANSPARENT_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

#[derive(Debug, Deserialize)]
pub struct TrackingParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub token: Option<String>,
    pub url: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/email/track", get(track))
}

/// `GET /email/track?type=open|click&token=...&url=...`
async fn track(State(state): State<AppState>, Query(params): Query<TrackingParams>) -> Response {
    match params.kind.as_deref() {
        Some("open") => {
            let token = match params.token {
                Some(token) => token,
                None => return bad_request("Missing token"),
            };

            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.record_open(&token).await;
            });

            pixel_response()
        }
        Some("click") => {
            let token = match params.token {
                Some(token) => token,
                None => return bad_request("Missing token"),
            };
            let url = match params.url {
                Some(url) => url,
                None => return bad_request("Missing redirect URL"),
            };

            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.record_click(&token).await;
            });

            // 302, not 307: mail clients follow it with a plain GET.
            (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
        }
        _ => bad_request("Invalid tracking type"),
    }
}

fn pixel_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/gif"),
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        ],
        TRANSPARENT_GIF,
    )
        .into_response()
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_is_a_gif() {
        // GIF89a magic bytes and trailer.
        assert_eq!(&TRANSPARENT_GIF[..6], b"GIF89a");
        assert_eq!(TRANSPARENT_GIF[TRANSPARENT_GIF.len() - 1], 0x3B);
    }

    #[test]
    fn test_pixel_response_headers() {
        let response = pixel_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/gif"
        );
        assert!(response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("no-store"));
    }
}
