//! Share-link entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::share_link::ShareLink;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for proposal share links.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ShareLinkEntity {
    pub token: String,
    pub proposal_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<ShareLinkEntity> for ShareLink {
    fn from(entity: ShareLinkEntity) -> Self {
        ShareLink {
            token: entity.token,
            proposal_id: entity.proposal_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}

impl From<ShareLink> for ShareLinkEntity {
    fn from(link: ShareLink) -> Self {
        ShareLinkEntity {
            token: link.token,
            proposal_id: link.proposal_id,
            created_by: link.created_by,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}
