//! Share link repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::share_link::ShareLink;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ShareLinkEntity;

const SHARE_LINK_COLUMNS: &str = "token, proposal_id, created_by, created_at, expires_at";

/// Repository for share link database operations.
#[derive(Clone)]
pub struct ShareLinkRepository {
    pool: PgPool,
}

impl ShareLinkRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued share link.
    pub async fn create(
        &self,
        token: &str,
        proposal_id: Uuid,
        created_by: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<ShareLink, sqlx::Error> {
        let entity = sqlx::query_as::<_, ShareLinkEntity>(&format!(
            r#"
            INSERT INTO proposal_share_links (token, proposal_id, created_by, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SHARE_LINK_COLUMNS
        ))
        .bind(token)
        .bind(proposal_id)
        .bind(created_by)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a share link by token.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ShareLinkEntity>(&format!(
            "SELECT {} FROM proposal_share_links WHERE token = $1",
            SHARE_LINK_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Revoke a share link, scoped to its creator. Idempotent: returns
    /// `false` when the token is already gone.
    pub async fn revoke(&self, token: &str, created_by: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM proposal_share_links WHERE token = $1 AND created_by = $2")
                .bind(token)
                .bind(created_by)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All share links for a proposal, newest first.
    pub async fn list_for_proposal(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<ShareLink>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ShareLinkEntity>(&format!(
            r#"
            SELECT {}
            FROM proposal_share_links
            WHERE proposal_id = $1
            ORDER BY created_at DESC
            "#,
            SHARE_LINK_COLUMNS
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }
}
