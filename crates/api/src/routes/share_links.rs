//! Share-link issuing, listing, revocation and public validation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use domain::models::share_link::{
    CreateShareLinkRequest, ShareLink, ShareLinkValidation, ShareLinkValidationResponse,
};
use persistence::repositories::{ProposalRepository, ShareLinkRepository};
use serde::Serialize;
use shared::token::generate_share_token;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, UserAuth};
use crate::services::dispatch::share_url;

/// Issued share link, including its public URL.
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub token: String,
    pub url: String,
    pub proposal_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ShareLinkResponse {
    fn from_link(link: ShareLink, base_url: &str) -> Self {
        Self {
            url: share_url(base_url.trim_end_matches('/'), &link.token),
            token: link.token,
            proposal_id: link.proposal_id,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/proposals/share/:token", get(validate_share_link))
        .route(
            "/api/v1/proposals/:id/share-links",
            post(create_share_link).get(list_share_links),
        )
        .route("/api/v1/share-links/:token", delete(revoke_share_link))
}

/// `POST /api/v1/proposals/:id/share-links` - issue a time-boxed link.
async fn create_share_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<CreateShareLinkRequest>,
) -> Result<(StatusCode, Json<ShareLinkResponse>), ApiError> {
    request.validate()?;

    let proposals = ProposalRepository::new(state.pool.clone());
    proposals
        .find_owned(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".into()))?;

    let token = generate_share_token();
    let expires_at = domain::models::share_link::calculate_expiry(request.ttl_days());

    let link = ShareLinkRepository::new(state.pool.clone())
        .create(&token, id, auth.user_id, expires_at)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShareLinkResponse::from_link(
            link,
            &state.config.email.base_url,
        )),
    ))
}

/// `GET /api/v1/proposals/:id/share-links` - list links for a proposal.
async fn list_share_links(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ShareLinkResponse>>, ApiError> {
    let proposals = ProposalRepository::new(state.pool.clone());
    proposals
        .find_owned(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".into()))?;

    let links = ShareLinkRepository::new(state.pool.clone())
        .list_for_proposal(id)
        .await?;

    let base_url = state.config.email.base_url.clone();
    Ok(Json(
        links
            .into_iter()
            .map(|link| ShareLinkResponse::from_link(link, &base_url))
            .collect(),
    ))
}

/// `DELETE /api/v1/share-links/:token` - revoke a link. Idempotent: a
/// token already gone reports `revoked: false`.
async fn revoke_share_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(token): Path<String>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let revoked = ShareLinkRepository::new(state.pool.clone())
        .revoke(&token, auth.user_id)
        .await?;

    Ok(Json(RevokeResponse { revoked }))
}

/// `GET /proposals/share/:token` - public token validation. Read-only:
/// viewed-state transitions come from open tracking, not from share-link
/// access.
async fn validate_share_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<(StatusCode, Json<ShareLinkValidationResponse>), ApiError> {
    let link = ShareLinkRepository::new(state.pool.clone())
        .find_by_token(&token)
        .await?;

    let validation = match link {
        Some(link) if link.is_valid() => ShareLinkValidation::Valid {
            proposal_id: link.proposal_id,
        },
        Some(_) => ShareLinkValidation::Expired,
        None => ShareLinkValidation::NotFound,
    };

    let status = match validation {
        ShareLinkValidation::Valid { .. } => StatusCode::OK,
        ShareLinkValidation::Expired => StatusCode::GONE,
        ShareLinkValidation::NotFound => StatusCode::NOT_FOUND,
    };

    Ok((status, Json(validation.into())))
}
