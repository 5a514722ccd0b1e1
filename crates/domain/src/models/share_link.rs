//! Share-link domain model.
//!
//! A share link grants time-boxed read access to a proposal via an
//! unguessable token. Links are immutable after creation; revocation
//! deletes the row.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default lifetime of a share link in days.
pub const DEFAULT_TTL_DAYS: i32 = 30;

/// Share-link domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShareLink {
    pub token: String,
    pub proposal_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ShareLink {
    /// A token is expired once `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// A token is valid iff it exists (this struct is its existence
    /// proof) and has not expired.
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

/// Compute an expiry timestamp `ttl_days` from now.
pub fn calculate_expiry(ttl_days: i32) -> DateTime<Utc> {
    Utc::now() + Duration::days(ttl_days as i64)
}

/// Request to issue a share link. Falls back to [`DEFAULT_TTL_DAYS`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateShareLinkRequest {
    #[validate(custom(function = "validate_optional_ttl"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_days: Option<i32>,
}

fn validate_optional_ttl(days: i32) -> Result<(), validator::ValidationError> {
    shared::validation::validate_ttl_days(days)
}

impl CreateShareLinkRequest {
    pub fn ttl_days(&self) -> i32 {
        self.ttl_days.unwrap_or(DEFAULT_TTL_DAYS)
    }
}

/// Outcome of validating a share token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkValidation {
    Valid { proposal_id: Uuid },
    Expired,
    NotFound,
}

/// Wire form of a validation outcome: `{valid, proposal_id?, expired?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShareLinkValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl From<ShareLinkValidation> for ShareLinkValidationResponse {
    fn from(validation: ShareLinkValidation) -> Self {
        match validation {
            ShareLinkValidation::Valid { proposal_id } => Self {
                valid: true,
                proposal_id: Some(proposal_id),
                expired: None,
            },
            ShareLinkValidation::Expired => Self {
                valid: false,
                proposal_id: None,
                expired: Some(true),
            },
            ShareLinkValidation::NotFound => Self {
                valid: false,
                proposal_id: None,
                expired: None,
            },
        }
    }
}
