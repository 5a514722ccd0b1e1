//! Proposal CRUD and lifecycle endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::models::proposal::{
    CreateProposalRequest, ListProposalsQuery, ListProposalsResponse, Proposal, ProposalItem,
    ProposalSection,
};
use domain::services::notifier::{ChangeEvent, ChangeKind, ChangeTable};
use domain::services::status::{next_status, StatusEvent};
use persistence::repositories::ProposalRepository;
use serde::Serialize;
use shared::pagination::{PageMeta, PageParams, PageWindow};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, UserAuth};
use crate::middleware::metrics;

/// A proposal with its sections and line items.
#[derive(Debug, Serialize)]
pub struct ProposalDetailResponse {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub sections: Vec<ProposalSection>,
    pub items: Vec<ProposalItem>,
}

#[derive(Debug, Serialize)]
pub struct ExpireSweepResponse {
    pub expired: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/proposals", post(create_proposal).get(list_proposals))
        .route("/api/v1/proposals/expire-sweep", post(expire_sweep))
        .route(
            "/api/v1/proposals/:id",
            get(get_proposal).delete(delete_proposal),
        )
        .route("/api/v1/proposals/:id/accept", post(accept_proposal))
        .route("/api/v1/proposals/:id/reject", post(reject_proposal))
}

/// `POST /api/v1/proposals` - create a draft proposal.
async fn create_proposal(
    State(state): State<AppState>,
    auth: UserAuth,
    JsonBody(request): JsonBody<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ProposalDetailResponse>), ApiError> {
    request.validate()?;

    let repo = ProposalRepository::new(state.pool.clone());
    let proposal = repo.create(auth.user_id, &request).await?;

    state.notifier.publish(ChangeEvent {
        table: ChangeTable::Proposals,
        kind: ChangeKind::Insert,
        proposal_id: proposal.id,
        user_id: proposal.user_id,
    });

    let sections = repo.sections(proposal.id).await?;
    let items = repo.items(proposal.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProposalDetailResponse {
            proposal,
            sections,
            items,
        }),
    ))
}

/// `GET /api/v1/proposals` - list with filtering, sorting, pagination.
async fn list_proposals(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListProposalsQuery>,
) -> Result<Json<ListProposalsResponse>, ApiError> {
    let statuses = query.statuses().map_err(ApiError::Validation)?;

    let repo = ProposalRepository::new(state.pool.clone());
    let (data, total) = repo.list(auth.user_id, statuses, &query).await?;

    let window = PageWindow::from_params(PageParams {
        page: query.page,
        per_page: query.per_page,
    });

    Ok(Json(ListProposalsResponse {
        data,
        pagination: PageMeta::new(window, total),
    }))
}

/// `GET /api/v1/proposals/:id` - full detail with sections and items.
async fn get_proposal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalDetailResponse>, ApiError> {
    let repo = ProposalRepository::new(state.pool.clone());
    let proposal = repo
        .find_owned(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Proposal not found".into()))?;

    let sections = repo.sections(proposal.id).await?;
    let items = repo.items(proposal.id).await?;

    Ok(Json(ProposalDetailResponse {
        proposal,
        sections,
        items,
    }))
}

/// `DELETE /api/v1/proposals/:id`. Emails and share links referencing the
/// proposal block deletion, surfacing as 409.
async fn delete_proposal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ProposalRepository::new(state.pool.clone());
    let deleted = repo.delete(id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Proposal not found".into()));
    }

    state.notifier.publish(ChangeEvent {
        table: ChangeTable::Proposals,
        kind: ChangeKind::Delete,
        proposal_id: id,
        user_id: auth.user_id,
    });

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/proposals/:id/accept`
async fn accept_proposal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>, ApiError> {
    respond(state, auth, id, true).await
}

/// `POST /api/v1/proposals/:id/reject`
async fn reject_proposal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>, ApiError> {
    respond(state, auth, id, false).await
}

/// Record the client's response. The update only matches pending rows, so
/// a `None` result means either a missing proposal or an invalid
/// transition; a follow-up lookup distinguishes the two.
async fn respond(
    state: AppState,
    auth: UserAuth,
    id: Uuid,
    accepted: bool,
) -> Result<Json<Proposal>, ApiError> {
    let repo = ProposalRepository::new(state.pool.clone());

    match repo.mark_responded(id, auth.user_id, accepted).await? {
        Some(proposal) => {
            state.notifier.publish(ChangeEvent {
                table: ChangeTable::Proposals,
                kind: ChangeKind::Update,
                proposal_id: proposal.id,
                user_id: proposal.user_id,
            });
            Ok(Json(proposal))
        }
        None => match repo.find_owned(id, auth.user_id).await? {
            Some(existing) => {
                let event = if accepted {
                    StatusEvent::Accept
                } else {
                    StatusEvent::Reject
                };
                let conflict = match next_status(existing.status, event) {
                    // The transition was legal a moment ago; another
                    // request won the race.
                    Ok(_) => "Proposal changed concurrently, retry".to_string(),
                    Err(e) => e.to_string(),
                };
                Err(ApiError::Conflict(conflict))
            }
            None => Err(ApiError::NotFound("Proposal not found".into())),
        },
    }
}

/// `POST /api/v1/proposals/expire-sweep` - expire pending proposals whose
/// validity window has passed. The background job runs the same sweep
/// hourly; this endpoint exists for on-demand runs.
async fn expire_sweep(
    State(state): State<AppState>,
    _auth: UserAuth,
) -> Result<Json<ExpireSweepResponse>, ApiError> {
    let repo = ProposalRepository::new(state.pool.clone());
    let expired = repo.expire_pending().await?;

    for (proposal_id, user_id) in &expired {
        state.notifier.publish(ChangeEvent {
            table: ChangeTable::Proposals,
            kind: ChangeKind::Update,
            proposal_id: *proposal_id,
            user_id: *user_id,
        });
    }
    metrics::record_proposals_expired(expired.len() as u64);

    Ok(Json(ExpireSweepResponse {
        expired: expired.len(),
    }))
}
