//! Proposal entities for database operations.
//!
//! Columns are snake_case; the mapping into domain models is a pure 1:1
//! field transformation. Status is stored as text and parsed into the
//! closed enum on the way out, so an invalid persisted value surfaces as
//! a decode error instead of a phantom state.

use chrono::{DateTime, Utc};
use domain::models::proposal::{Proposal, ProposalItem, ProposalSection, ProposalStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for proposals.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProposalEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub valid_until: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProposalEntity> for Proposal {
    type Error = String;

    fn try_from(entity: ProposalEntity) -> Result<Self, Self::Error> {
        let status: ProposalStatus = entity.status.parse()?;
        Ok(Proposal {
            id: entity.id,
            user_id: entity.user_id,
            client_id: entity.client_id,
            client_name: entity.client_name,
            title: entity.title,
            description: entity.description,
            status,
            amount: entity.amount,
            currency: entity.currency,
            valid_until: entity.valid_until,
            sent_at: entity.sent_at,
            viewed_at: entity.viewed_at,
            responded_at: entity.responded_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<Proposal> for ProposalEntity {
    fn from(proposal: Proposal) -> Self {
        ProposalEntity {
            id: proposal.id,
            user_id: proposal.user_id,
            client_id: proposal.client_id,
            client_name: proposal.client_name,
            title: proposal.title,
            description: proposal.description,
            status: proposal.status.as_str().to_string(),
            amount: proposal.amount,
            currency: proposal.currency,
            valid_until: proposal.valid_until,
            sent_at: proposal.sent_at,
            viewed_at: proposal.viewed_at,
            responded_at: proposal.responded_at,
            created_at: proposal.created_at,
            updated_at: proposal.updated_at,
        }
    }
}

/// Database entity for proposal sections.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProposalSectionEntity {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub title: String,
    pub body: String,
    pub order_position: i32,
}

impl From<ProposalSectionEntity> for ProposalSection {
    fn from(entity: ProposalSectionEntity) -> Self {
        ProposalSection {
            id: entity.id,
            proposal_id: entity.proposal_id,
            title: entity.title,
            body: entity.body,
            order_position: entity.order_position,
        }
    }
}

/// Database entity for proposal line items.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProposalItemEntity {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

impl From<ProposalItemEntity> for ProposalItem {
    fn from(entity: ProposalItemEntity) -> Self {
        ProposalItem {
            id: entity.id,
            proposal_id: entity.proposal_id,
            description: entity.description,
            quantity: entity.quantity,
            unit_price: entity.unit_price,
            amount: entity.amount,
        }
    }
}
