//! Email record repository for database operations.
//!
//! Open and click recording are single conditional/atomic statements so
//! concurrent tracking hits cannot double-stamp `opened_at` or lose
//! click increments.

use chrono::{DateTime, Utc};
use domain::models::email_record::{EmailRecord, EmailStats};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::entities::EmailRecordEntity;

const EMAIL_COLUMNS: &str = "id, proposal_id, recipient_email, cc_email, subject, \
     open_tracking_token, click_tracking_token, share_token, sent_at, opened_at, \
     click_count, failed";

/// Raw aggregate row backing `EmailStats`.
#[derive(Debug, FromRow)]
struct StatsRow {
    total_sent: i64,
    total_opened: i64,
    total_clicked: i64,
    avg_minutes_to_open: Option<f64>,
    last_sent_at: Option<DateTime<Utc>>,
    last_opened_at: Option<DateTime<Utc>>,
}

/// Repository for email record database operations.
#[derive(Clone)]
pub struct EmailRepository {
    pool: PgPool,
}

impl EmailRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new email record at send time.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        proposal_id: Uuid,
        recipient_email: &str,
        cc_email: Option<&str>,
        subject: &str,
        open_tracking_token: Option<&str>,
        click_tracking_token: Option<&str>,
        share_token: Option<&str>,
    ) -> Result<EmailRecord, sqlx::Error> {
        let entity = sqlx::query_as::<_, EmailRecordEntity>(&format!(
            r#"
            INSERT INTO proposal_emails (proposal_id, recipient_email, cc_email, subject, open_tracking_token, click_tracking_token, share_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            EMAIL_COLUMNS
        ))
        .bind(proposal_id)
        .bind(recipient_email)
        .bind(cc_email)
        .bind(subject)
        .bind(open_tracking_token)
        .bind(click_tracking_token)
        .bind(share_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Stamp `opened_at` on first open. First write wins: later hits find
    /// `opened_at` already set and return `None`.
    pub async fn record_open(&self, token: &str) -> Result<Option<EmailRecord>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EmailRecordEntity>(&format!(
            r#"
            UPDATE proposal_emails
            SET opened_at = NOW()
            WHERE open_tracking_token = $1 AND opened_at IS NULL
            RETURNING {}
            "#,
            EMAIL_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Increment the click counter. The increment happens in SQL, so
    /// concurrent clicks all land.
    pub async fn record_click(&self, token: &str) -> Result<Option<EmailRecord>, sqlx::Error> {
        let entity = sqlx::query_as::<_, EmailRecordEntity>(&format!(
            r#"
            UPDATE proposal_emails
            SET click_count = click_count + 1
            WHERE click_tracking_token = $1
            RETURNING {}
            "#,
            EMAIL_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Flag a record whose provider send failed.
    pub async fn mark_failed(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE proposal_emails SET failed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Send history for a proposal, most recent first.
    pub async fn history(&self, proposal_id: Uuid) -> Result<Vec<EmailRecord>, sqlx::Error> {
        let entities = sqlx::query_as::<_, EmailRecordEntity>(&format!(
            r#"
            SELECT {}
            FROM proposal_emails
            WHERE proposal_id = $1
            ORDER BY sent_at DESC
            "#,
            EMAIL_COLUMNS
        ))
        .bind(proposal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Engagement statistics over a proposal's email history, computed in
    /// a single aggregate query.
    pub async fn stats(&self, proposal_id: Uuid) -> Result<EmailStats, sqlx::Error> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_sent,
                COUNT(*) FILTER (WHERE opened_at IS NOT NULL) AS total_opened,
                COUNT(*) FILTER (WHERE click_count > 0) AS total_clicked,
                CAST(AVG(EXTRACT(EPOCH FROM (opened_at - sent_at)) / 60.0) AS double precision) AS avg_minutes_to_open,
                MAX(sent_at) AS last_sent_at,
                MAX(opened_at) AS last_opened_at
            FROM proposal_emails
            WHERE proposal_id = $1
            "#,
        )
        .bind(proposal_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EmailStats::from_aggregate(
            row.total_sent,
            row.total_opened,
            row.total_clicked,
            row.avg_minutes_to_open,
            row.last_sent_at,
            row.last_opened_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_row_maps_empty_aggregate() {
        // COUNT over zero rows yields 0 and MAX/AVG yield NULL; the
        // mapping must produce the all-zero stats shape.
        let row = StatsRow {
            total_sent: 0,
            total_opened: 0,
            total_clicked: 0,
            avg_minutes_to_open: None,
            last_sent_at: None,
            last_opened_at: None,
        };
        let stats = EmailStats::from_aggregate(
            row.total_sent,
            row.total_opened,
            row.total_clicked,
            row.avg_minutes_to_open,
            row.last_sent_at,
            row.last_opened_at,
        );
        assert_eq!(stats, EmailStats::empty());
    }
}
