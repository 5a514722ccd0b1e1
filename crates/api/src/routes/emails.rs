//! Email sending, history and stats endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::models::email_record::{EmailRecordResponse, EmailStats, SendEmailRequest};
use persistence::repositories::{EmailRepository, ProposalRepository};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, UserAuth};

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/email/send", post(send_email))
        .route("/api/v1/proposals/:id/emails", get(email_history))
        .route("/api/v1/proposals/:id/emails/stats", get(email_stats))
}

/// `POST /email/send` - dispatch a proposal email with tracking.
async fn send_email(
    State(state): State<AppState>,
    auth: UserAuth,
    JsonBody(request): JsonBody<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    state.dispatcher.send(auth.user_id, &request).await?;
    Ok(Json(SendEmailResponse { success: true }))
}

/// `GET /api/v1/proposals/:id/emails` - send history, newest first.
async fn email_history(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EmailRecordResponse>>, ApiError> {
    assert_owned(&state, id, auth.user_id).await?;

    let records = EmailRepository::new(state.pool.clone()).history(id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// `GET /api/v1/proposals/:id/emails/stats` - engagement aggregates.
async fn email_stats(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<EmailStats>, ApiError> {
    assert_owned(&state, id, auth.user_id).await?;

    let stats = EmailRepository::new(state.pool.clone()).stats(id).await?;
    Ok(Json(stats))
}

async fn assert_owned(state: &AppState, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    ProposalRepository::new(state.pool.clone())
        .find_owned(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".into()))?;
    Ok(())
}
