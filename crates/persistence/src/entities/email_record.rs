//! Email record entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::email_record::EmailRecord;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for outbound proposal emails.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EmailRecordEntity {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub recipient_email: String,
    pub cc_email: Option<String>,
    pub subject: String,
    pub open_tracking_token: Option<String>,
    pub click_tracking_token: Option<String>,
    pub share_token: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub click_count: i32,
    pub failed: bool,
}

impl From<EmailRecordEntity> for EmailRecord {
    fn from(entity: EmailRecordEntity) -> Self {
        EmailRecord {
            id: entity.id,
            proposal_id: entity.proposal_id,
            recipient_email: entity.recipient_email,
            cc_email: entity.cc_email,
            subject: entity.subject,
            open_tracking_token: entity.open_tracking_token,
            click_tracking_token: entity.click_tracking_token,
            share_token: entity.share_token,
            sent_at: entity.sent_at,
            opened_at: entity.opened_at,
            click_count: entity.click_count,
            failed: entity.failed,
        }
    }
}

impl From<EmailRecord> for EmailRecordEntity {
    fn from(record: EmailRecord) -> Self {
        EmailRecordEntity {
            id: record.id,
            proposal_id: record.proposal_id,
            recipient_email: record.recipient_email,
            cc_email: record.cc_email,
            subject: record.subject,
            open_tracking_token: record.open_tracking_token,
            click_tracking_token: record.click_tracking_token,
            share_token: record.share_token,
            sent_at: record.sent_at,
            opened_at: record.opened_at,
            click_count: record.click_count,
            failed: record.failed,
        }
    }
}
