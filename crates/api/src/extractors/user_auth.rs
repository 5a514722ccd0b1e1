//! User JWT authentication extractor.
//!
//! Validates the Bearer token in the Authorization header and provides
//! the authenticated user's identity to route handlers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let jwt = JwtConfig::new(
            &state.config.auth.jwt_secret,
            state.config.auth.token_expiry_secs,
        );
        let user_id = jwt.verify_token(token)?;

        Ok(UserAuth { user_id })
    }
}
