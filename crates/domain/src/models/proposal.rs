//! Proposal domain model and listing DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::PageMeta;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lifecycle status of a proposal.
///
/// Statuses move forward only: `draft` through `sent` and `viewed` to one
/// of the terminal states. `expired` is reachable from either `sent` or
/// `viewed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
}

impl ProposalStatus {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Whether the proposal is awaiting a response (eligible for expiry).
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Sent | Self::Viewed)
    }

    /// Whether the proposal can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Expired)
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "viewed" => Ok(Self::Viewed),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            other => Err(format!("Unknown proposal status: {}", other)),
        }
    }
}

/// Proposal domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Proposal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProposalStatus,
    pub amount: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Lifecycle timestamps must be non-decreasing: each is set at most
    /// once, and never earlier than the one before it.
    pub fn timestamps_monotonic(&self) -> bool {
        if let (Some(sent), Some(viewed)) = (self.sent_at, self.viewed_at) {
            if viewed < sent {
                return false;
            }
        }
        if let (Some(viewed), Some(responded)) = (self.viewed_at, self.responded_at) {
            if responded < viewed {
                return false;
            }
        }
        if let (Some(sent), Some(responded)) = (self.sent_at, self.responded_at) {
            if responded < sent {
                return false;
            }
        }
        true
    }
}

/// A titled free-text section of a proposal. `order_position` defines
/// display order and is unique per proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProposalSection {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub title: String,
    pub body: String,
    pub order_position: i32,
}

/// A billable line item. `amount` must equal `quantity * unit_price`,
/// checked at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProposalItem {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

/// Tolerance when checking `amount == quantity * unit_price` on f64 input.
const ITEM_AMOUNT_EPSILON: f64 = 0.005;

/// New section payload for proposal creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct NewProposalSection {
    #[validate(length(min = 1, max = 200, message = "Section title is required"))]
    pub title: String,
    pub body: String,
    pub order_position: i32,
}

/// New line-item payload for proposal creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_item_amount"))]
#[serde(rename_all = "snake_case")]
pub struct NewProposalItem {
    #[validate(length(min = 1, max = 500, message = "Item description is required"))]
    pub description: String,
    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: f64,
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub unit_price: f64,
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: f64,
}

fn validate_item_amount(item: &NewProposalItem) -> Result<(), ValidationError> {
    if (item.amount - item.quantity * item.unit_price).abs() <= ITEM_AMOUNT_EPSILON {
        Ok(())
    } else {
        let mut err = ValidationError::new("item_amount_mismatch");
        err.message = Some("Item amount must equal quantity * unit_price".into());
        Err(err)
    }
}

/// Request to create a proposal. Proposals always start in `draft`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_section_order"))]
#[serde(rename_all = "snake_case")]
pub struct CreateProposalRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: f64,
    #[validate(custom(function = "shared::validation::validate_currency_code"))]
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<NewProposalSection>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewProposalItem>,
}

fn validate_section_order(request: &CreateProposalRequest) -> Result<(), ValidationError> {
    let mut positions: Vec<i32> = request.sections.iter().map(|s| s.order_position).collect();
    positions.sort_unstable();
    positions.dedup();
    if positions.len() == request.sections.len() {
        Ok(())
    } else {
        let mut err = ValidationError::new("section_order_duplicate");
        err.message = Some("Section order positions must be unique".into());
        Err(err)
    }
}

/// Whitelisted sort columns for proposal listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSortField {
    CreatedAt,
    UpdatedAt,
    SentAt,
    Amount,
    Title,
    Status,
}

impl ProposalSortField {
    /// The database column this field sorts by.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::SentAt => "sent_at",
            Self::Amount => "amount",
            Self::Title => "title",
            Self::Status => "status",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query parameters for listing proposals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListProposalsQuery {
    /// Comma-separated status filter, e.g. `sent,viewed`.
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    /// Case-insensitive substring match over title, description and
    /// client name.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub sort_by: Option<ProposalSortField>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListProposalsQuery {
    /// Parse the status filter into a status set. An empty or missing
    /// filter yields `None` (no filtering).
    pub fn statuses(&self) -> Result<Option<Vec<ProposalStatus>>, String> {
        let raw = match self.status.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Ok(None),
        };
        let parsed = raw
            .split(',')
            .map(|part| part.trim().parse::<ProposalStatus>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(parsed))
    }
}

/// Response for proposal listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListProposalsResponse {
    pub data: Vec<Proposal>,
    pub pagination: PageMeta,
}
