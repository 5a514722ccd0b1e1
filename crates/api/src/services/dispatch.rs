//! Email dispatch orchestration.
//!
//! Sending a proposal email is a multi-step write: issue a share link,
//! persist the email record with its tracking tokens, transition the
//! proposal out of `draft`, then hand the message to the provider. The
//! first failure after a write surfaces as an error without rollback;
//! provider failures additionally flag the record.

use chrono::{DateTime, Utc};
use domain::models::email_record::SendEmailRequest;
use domain::models::share_link::calculate_expiry;
use domain::services::notifier::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeTable};
use persistence::repositories::{EmailRepository, ProposalRepository, ShareLinkRepository};
use shared::token::{generate_click_token, generate_open_token, generate_share_token};
use shared::validation::validation_message;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::metrics;
use crate::services::email::{EmailError, EmailMessage, EmailService};

/// Errors from the dispatch pipeline.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] EmailError),
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => ApiError::Validation(msg),
            DispatchError::NotFound(msg) => ApiError::NotFound(msg),
            DispatchError::Store(e) => e.into(),
            DispatchError::Provider(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Orchestrates proposal email sends and engagement tracking.
#[derive(Clone)]
pub struct EmailDispatcher {
    proposals: ProposalRepository,
    emails: EmailRepository,
    share_links: ShareLinkRepository,
    provider: EmailService,
    notifier: ChangeNotifier,
    base_url: String,
    default_ttl_days: i32,
}

impl EmailDispatcher {
    pub fn new(
        pool: PgPool,
        provider: EmailService,
        notifier: ChangeNotifier,
        config: &Config,
    ) -> Self {
        Self {
            proposals: ProposalRepository::new(pool.clone()),
            emails: EmailRepository::new(pool.clone()),
            share_links: ShareLinkRepository::new(pool),
            provider,
            notifier,
            base_url: config.email.base_url.trim_end_matches('/').to_string(),
            default_ttl_days: config.sharing.default_ttl_days,
        }
    }

    /// Send a proposal email on behalf of `user_id`.
    ///
    /// Validation and the ownership check run before any write. After
    /// that the pipeline issues a share link, persists the email record,
    /// transitions the proposal draft -> sent and delivers the message.
    pub async fn send(
        &self,
        user_id: uuid::Uuid,
        request: &SendEmailRequest,
    ) -> Result<(), DispatchError> {
        request
            .validate()
            .map_err(|e| DispatchError::Validation(validation_message(&e)))?;
        request
            .validate_cc()
            .map_err(|e| DispatchError::Validation(custom_message(&e)))?;

        let proposal = self
            .proposals
            .find_owned(request.proposal_id, user_id)
            .await?
            .ok_or_else(|| DispatchError::NotFound("Proposal not found".to_string()))?;

        let open_token = request.track_opens.then(generate_open_token);
        let click_token = request.track_clicks.then(generate_click_token);

        let share_token = generate_share_token();
        let expires_at = link_expiry(request.expiry_days, self.default_ttl_days);
        self.share_links
            .create(&share_token, proposal.id, user_id, expires_at)
            .await?;

        let record = self
            .emails
            .create(
                proposal.id,
                &request.to,
                request.cc.as_deref(),
                &request.subject,
                open_token.as_deref(),
                click_token.as_deref(),
                Some(&share_token),
            )
            .await?;

        // No-op when the proposal already left draft; resends keep the
        // existing lifecycle timestamps.
        if let Some(updated) = self.proposals.mark_sent(proposal.id, user_id).await? {
            self.notifier.publish(ChangeEvent {
                table: ChangeTable::Proposals,
                kind: ChangeKind::Update,
                proposal_id: updated.id,
                user_id: updated.user_id,
            });
        }

        let share_url = share_url(&self.base_url, &share_token);
        let (body_text, body_html) = build_bodies(
            &self.base_url,
            &request.message,
            &request.proposal_title,
            &share_url,
            click_token.as_deref(),
            open_token.as_deref(),
        );

        let message = EmailMessage {
            to: request.to.clone(),
            cc: request.cc.clone(),
            subject: request.subject.clone(),
            body_text,
            body_html: Some(body_html),
        };

        match self.provider.send(message).await {
            Ok(()) => {
                metrics::record_email_sent();
                info!(
                    proposal_id = %proposal.id,
                    email_id = %record.id,
                    to = %request.to,
                    "Proposal email dispatched"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_email_failed();
                if let Err(mark_err) = self.emails.mark_failed(record.id).await {
                    warn!(
                        email_id = %record.id,
                        error = %mark_err,
                        "Failed to flag email record after provider error"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Record a tracking-pixel hit. Errors are logged, never surfaced;
    /// the pixel response does not depend on this outcome.
    pub async fn record_open(&self, token: &str) {
        match self.emails.record_open(token).await {
            Ok(Some(record)) => {
                metrics::record_email_opened();
                info!(
                    proposal_id = %record.proposal_id,
                    email_id = %record.id,
                    "Email open recorded"
                );

                // First engagement moves the proposal sent -> viewed.
                match self.proposals.mark_viewed(record.proposal_id).await {
                    Ok(Some(updated)) => {
                        self.notifier.publish(ChangeEvent {
                            table: ChangeTable::Proposals,
                            kind: ChangeKind::Update,
                            proposal_id: updated.id,
                            user_id: updated.user_id,
                        });
                    }
                    Ok(None) => {}
                    Err(e) => warn!(
                        proposal_id = %record.proposal_id,
                        error = %e,
                        "Failed to cascade open into viewed status"
                    ),
                }
            }
            Ok(None) => debug!(token, "Open token unknown or already recorded"),
            Err(e) => warn!(token, error = %e, "Failed to record email open"),
        }
    }

    /// Record a tracked link click. Errors are logged, never surfaced;
    /// the redirect does not depend on this outcome.
    pub async fn record_click(&self, token: &str) {
        match self.emails.record_click(token).await {
            Ok(Some(record)) => {
                metrics::record_email_clicked();
                info!(
                    proposal_id = %record.proposal_id,
                    email_id = %record.id,
                    click_count = record.click_count,
                    "Email click recorded"
                );
            }
            Ok(None) => debug!(token, "Click token unknown"),
            Err(e) => warn!(token, error = %e, "Failed to record email click"),
        }
    }
}

/// Share-link lifetime for a send. `expiry_days` scopes the link only;
/// the proposal's own validity deadline is fixed at creation.
fn link_expiry(expiry_days: Option<i32>, default_ttl_days: i32) -> DateTime<Utc> {
    calculate_expiry(expiry_days.unwrap_or(default_ttl_days))
}

fn custom_message(error: &validator::ValidationError) -> String {
    error
        .message
        .clone()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Public share URL for a token.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/proposals/share/{}", base_url, token)
}

/// Wrap a target URL in the click-tracking redirect.
fn tracked_link(base_url: &str, click_token: &str, target: &str) -> String {
    format!(
        "{}/email/track?type=click&token={}&url={}",
        base_url,
        click_token,
        urlencoding::encode(target)
    )
}

/// Build the plain-text and HTML bodies. The HTML variant carries the
/// tracked link and, when open tracking is on, the 1x1 pixel.
fn build_bodies(
    base_url: &str,
    message: &str,
    proposal_title: &str,
    share_url: &str,
    click_token: Option<&str>,
    open_token: Option<&str>,
) -> (String, String) {
    let link = match click_token {
        Some(token) => tracked_link(base_url, token, share_url),
        None => share_url.to_string(),
    };

    let body_text = format!("{}\n\nView the proposal: {}", message, share_url);

    let mut body_html = format!(
        "<p>{}</p><p><a href=\"{}\">View proposal: {}</a></p>",
        message.replace('\n', "<br>"),
        link,
        proposal_title
    );
    if let Some(token) = open_token {
        body_html.push_str(&format!(
            "<img src=\"{}/email/track?type=open&token={}\" width=\"1\" height=\"1\" alt=\"\">",
            base_url, token
        ));
    }

    (body_text, body_html)
}
