//! Email template CRUD endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::models::email_template::{
    CreateTemplateRequest, EmailTemplate, RenderedTemplate, TemplateVars, UpdateTemplateRequest,
};
use persistence::repositories::EmailTemplateRepository;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{JsonBody, UserAuth};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/templates", post(create_template).get(list_templates))
        .route("/api/v1/templates/default", get(get_default_template))
        .route(
            "/api/v1/templates/:id",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
        .route("/api/v1/templates/:id/preview", post(preview_template))
}

/// Values to substitute when previewing a template.
#[derive(Debug, Deserialize)]
pub struct PreviewTemplateRequest {
    pub client_name: String,
    pub proposal_title: String,
    pub user_name: String,
}

/// `POST /api/v1/templates` - create a template. Marking it default
/// clears any previous default.
async fn create_template(
    State(state): State<AppState>,
    auth: UserAuth,
    JsonBody(request): JsonBody<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<EmailTemplate>), ApiError> {
    request.validate()?;

    let template = EmailTemplateRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// `GET /api/v1/templates` - list templates, default first.
async fn list_templates(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<EmailTemplate>>, ApiError> {
    let templates = EmailTemplateRepository::new(state.pool.clone())
        .list(auth.user_id)
        .await?;
    Ok(Json(templates))
}

/// `GET /api/v1/templates/default` - the user's default template, 404
/// when none is marked.
async fn get_default_template(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<EmailTemplate>, ApiError> {
    let template = EmailTemplateRepository::new(state.pool.clone())
        .find_default(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No default template".into()))?;
    Ok(Json(template))
}

/// `GET /api/v1/templates/:id`
async fn get_template(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<EmailTemplate>, ApiError> {
    let template = EmailTemplateRepository::new(state.pool.clone())
        .find_owned(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".into()))?;
    Ok(Json(template))
}

/// `PUT /api/v1/templates/:id` - partial update; omitted fields keep
/// their current values.
async fn update_template(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateTemplateRequest>,
) -> Result<Json<EmailTemplate>, ApiError> {
    request.validate()?;

    let template = EmailTemplateRepository::new(state.pool.clone())
        .update(id, auth.user_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".into()))?;
    Ok(Json(template))
}

/// `POST /api/v1/templates/:id/preview` - render the template with the
/// supplied placeholder values.
async fn preview_template(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<PreviewTemplateRequest>,
) -> Result<Json<RenderedTemplate>, ApiError> {
    let template = EmailTemplateRepository::new(state.pool.clone())
        .find_owned(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".into()))?;

    let rendered = template.render(&TemplateVars {
        client_name: &request.client_name,
        proposal_title: &request.proposal_title,
        user_name: &request.user_name,
    });
    Ok(Json(rendered))
}

/// `DELETE /api/v1/templates/:id`
async fn delete_template(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = EmailTemplateRepository::new(state.pool.clone())
        .delete(id, auth.user_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Template not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
