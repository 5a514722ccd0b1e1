//! Email record domain model, derived engagement status and stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Derived engagement status of a sent email.
///
/// `failed` is set explicitly at send time; the other three are derived
/// from open/click signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Delivered,
    Opened,
    Clicked,
    Failed,
}

impl std::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Opened => write!(f, "opened"),
            Self::Clicked => write!(f, "clicked"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Record of an outbound proposal email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailRecord {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub recipient_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_email: Option<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_tracking_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_tracking_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    pub click_count: i32,
    pub failed: bool,
}

impl EmailRecord {
    /// The single derivation site for engagement status. History listing
    /// and stats aggregation both go through here.
    pub fn status(&self) -> EmailStatus {
        if self.failed {
            EmailStatus::Failed
        } else if self.click_count > 0 {
            EmailStatus::Clicked
        } else if self.opened_at.is_some() {
            EmailStatus::Opened
        } else {
            EmailStatus::Delivered
        }
    }
}

/// Email record annotated with its derived status, as returned by the
/// history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailRecordResponse {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub recipient_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_email: Option<String>,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    pub click_count: i32,
    pub status: EmailStatus,
}

impl From<EmailRecord> for EmailRecordResponse {
    fn from(record: EmailRecord) -> Self {
        let status = record.status();
        Self {
            id: record.id,
            proposal_id: record.proposal_id,
            recipient_email: record.recipient_email,
            cc_email: record.cc_email,
            subject: record.subject,
            sent_at: record.sent_at,
            opened_at: record.opened_at,
            click_count: record.click_count,
            status,
        }
    }
}

/// Engagement statistics for a proposal's email history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailStats {
    pub total_sent: i64,
    pub total_opened: i64,
    pub total_clicked: i64,
    /// Percentage of sent emails that were opened, rounded to an integer.
    pub open_rate: i64,
    /// Percentage of sent emails that were clicked, rounded to an integer.
    pub click_rate: i64,
    /// Average minutes between send and first open, over opened records.
    pub average_time_to_open: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_at: Option<DateTime<Utc>>,
}

impl EmailStats {
    /// Stats for a proposal with no emails.
    pub fn empty() -> Self {
        Self {
            total_sent: 0,
            total_opened: 0,
            total_clicked: 0,
            open_rate: 0,
            click_rate: 0,
            average_time_to_open: 0.0,
            last_sent_at: None,
            last_opened_at: None,
        }
    }

    /// Build stats from raw aggregate values. Rates are 0 when nothing
    /// has been sent; average time to open is 0 when nothing was opened.
    pub fn from_aggregate(
        total_sent: i64,
        total_opened: i64,
        total_clicked: i64,
        avg_minutes_to_open: Option<f64>,
        last_sent_at: Option<DateTime<Utc>>,
        last_opened_at: Option<DateTime<Utc>>,
    ) -> Self {
        let rate = |count: i64| {
            if total_sent > 0 {
                ((100.0 * count as f64) / total_sent as f64).round() as i64
            } else {
                0
            }
        };
        Self {
            total_sent,
            total_opened,
            total_clicked,
            open_rate: rate(total_opened),
            click_rate: rate(total_clicked),
            average_time_to_open: avg_minutes_to_open.unwrap_or(0.0),
            last_sent_at,
            last_opened_at,
        }
    }
}

/// Request body for `POST /email/send`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SendEmailRequest {
    #[validate(custom(function = "shared::validation::validate_email_address"))]
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    pub proposal_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Proposal title is required"))]
    pub proposal_title: String,
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    #[serde(default)]
    pub include_attachment: bool,
    #[serde(default = "default_true")]
    pub track_opens: bool,
    #[serde(default = "default_true")]
    pub track_clicks: bool,
    #[validate(custom(function = "validate_optional_ttl"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_days: Option<i32>,
}

fn default_true() -> bool {
    true
}

fn validate_optional_ttl(days: i32) -> Result<(), validator::ValidationError> {
    shared::validation::validate_ttl_days(days)
}

impl SendEmailRequest {
    /// CC validation is separate because `validator` custom functions do
    /// not run on `Option<String>` fields directly.
    pub fn validate_cc(&self) -> Result<(), validator::ValidationError> {
        shared::validation::validate_optional_email(self.cc.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn record() -> EmailRecord {
        EmailRecord {
            id: Uuid::new_v4(),
            proposal_id: Uuid::new_v4(),
            recipient_email: SafeEmail().fake(),
            cc_email: None,
            subject: "Proposal for review".to_string(),
            open_tracking_token: Some("open_abc".to_string()),
            click_tracking_token: Some("click_abc".to_string()),
            share_token: Some("share_abc".to_string()),
            sent_at: Utc::now(),
            opened_at: None,
            click_count: 0,
            failed: false,
        }
    }

    #[test]
    fn test_status_delivered() {
        assert_eq!(record().status(), EmailStatus::Delivered);
    }

    #[test]
    fn test_status_opened() {
        let mut r = record();
        r.opened_at = Some(Utc::now());
        assert_eq!(r.status(), EmailStatus::Opened);
    }

    #[test]
    fn test_status_clicked_takes_precedence_over_opened() {
        let mut r = record();
        r.opened_at = Some(Utc::now());
        r.click_count = 3;
        assert_eq!(r.status(), EmailStatus::Clicked);
    }

    #[test]
    fn test_status_clicked_without_open() {
        // A click without a recorded open still counts as clicked; some
        // clients block images but follow links.
        let mut r = record();
        r.click_count = 1;
        assert_eq!(r.status(), EmailStatus::Clicked);
    }

    #[test]
    fn test_status_failed_wins() {
        let mut r = record();
        r.failed = true;
        r.opened_at = Some(Utc::now());
        r.click_count = 2;
        assert_eq!(r.status(), EmailStatus::Failed);
    }

    #[test]
    fn test_response_carries_derived_status() {
        let mut r = record();
        r.opened_at = Some(Utc::now());
        let response = EmailRecordResponse::from(r);
        assert_eq!(response.status, EmailStatus::Opened);
    }

    #[test]
    fn test_stats_empty() {
        let stats = EmailStats::empty();
        assert_eq!(stats.total_sent, 0);
        assert_eq!(stats.open_rate, 0);
        assert_eq!(stats.click_rate, 0);
        assert_eq!(stats.average_time_to_open, 0.0);
        assert!(stats.last_sent_at.is_none());
    }

    #[test]
    fn test_stats_rates_rounded() {
        let stats = EmailStats::from_aggregate(3, 2, 1, Some(12.5), None, None);
        assert_eq!(stats.open_rate, 67);
        assert_eq!(stats.click_rate, 33);
        assert_eq!(stats.average_time_to_open, 12.5);
    }

    #[test]
    fn test_stats_zero_sent_guards_division() {
        let stats = EmailStats::from_aggregate(0, 0, 0, None, None, None);
        assert_eq!(stats, EmailStats::empty());
    }

    #[test]
    fn test_send_request_validation() {
        let request = SendEmailRequest {
            to: "client@example.com".to_string(),
            cc: None,
            subject: "Proposal".to_string(),
            message: "Please find attached".to_string(),
            proposal_id: Uuid::new_v4(),
            proposal_title: "Website redesign".to_string(),
            client_name: "Acme Corp".to_string(),
            include_attachment: false,
            track_opens: true,
            track_clicks: true,
            expiry_days: Some(30),
        };
        assert!(request.validate().is_ok());
        assert!(request.validate_cc().is_ok());
    }

    #[test]
    fn test_send_request_invalid_recipient() {
        let request = SendEmailRequest {
            to: "not-an-email".to_string(),
            cc: None,
            subject: "Proposal".to_string(),
            message: "body".to_string(),
            proposal_id: Uuid::new_v4(),
            proposal_title: "t".to_string(),
            client_name: "c".to_string(),
            include_attachment: false,
            track_opens: true,
            track_clicks: true,
            expiry_days: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_send_request_invalid_cc() {
        let request = SendEmailRequest {
            to: "client@example.com".to_string(),
            cc: Some("bogus".to_string()),
            subject: "Proposal".to_string(),
            message: "body".to_string(),
            proposal_id: Uuid::new_v4(),
            proposal_title: "t".to_string(),
            client_name: "c".to_string(),
            include_attachment: false,
            track_opens: true,
            track_clicks: true,
            expiry_days: None,
        };
        assert!(request.validate_cc().is_err());
    }

    #[test]
    fn test_send_request_zero_expiry_rejected() {
        let request = SendEmailRequest {
            to: "client@example.com".to_string(),
            cc: None,
            subject: "Proposal".to_string(),
            message: "body".to_string(),
            proposal_id: Uuid::new_v4(),
            proposal_title: "t".to_string(),
            client_name: "c".to_string(),
            include_attachment: false,
            track_opens: true,
            track_clicks: true,
            expiry_days: Some(0),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_send_request_defaults_tracking_on() {
        let json = serde_json::json!({
            "to": "client@example.com",
            "subject": "Proposal",
            "message": "body",
            "proposal_id": Uuid::new_v4(),
            "proposal_title": "t",
            "client_name": "c"
        });
        let request: SendEmailRequest = serde_json::from_value(json).unwrap();
        assert!(request.track_opens);
        assert!(request.track_clicks);
        assert!(!request.include_attachment);
    }
}
