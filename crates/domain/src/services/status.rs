//! Proposal status engine.
//!
//! The transition table is the single source of truth for legal status
//! changes. Persistence enforces the same guards with conditional
//! UPDATE statements so concurrent callers cannot race a proposal into
//! an illegal state; this module is the in-process counterpart used for
//! decisions and tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::proposal::ProposalStatus;

/// Events that can move a proposal through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    /// Owner sends the proposal to the client.
    Send,
    /// Recipient loads the tracking pixel.
    Open,
    /// Owner marks the proposal accepted.
    Accept,
    /// Owner marks the proposal rejected.
    Reject,
    /// `valid_until` has passed while the proposal was pending.
    Expire,
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::Open => write!(f, "open"),
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Expire => write!(f, "expire"),
        }
    }
}

/// Error for an event that is not legal in the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot apply event '{event}' to proposal in status '{from}'")]
    InvalidTransition {
        from: ProposalStatus,
        event: StatusEvent,
    },
}

/// Resolve the status an event leads to, or an error when the event is
/// not legal from the current status.
///
/// Accept and reject are allowed from `sent` as well as `viewed`: a
/// client may respond out of band without ever tripping the tracking
/// pixel. `Open` on anything past `sent` is reported as invalid; callers
/// on the tracking path treat that as a no-op.
pub fn next_status(
    from: ProposalStatus,
    event: StatusEvent,
) -> Result<ProposalStatus, TransitionError> {
    use ProposalStatus::*;
    use StatusEvent::*;

    match (from, event) {
        (Draft, Send) => Ok(Sent),
        (Sent, Open) => Ok(Viewed),
        (Sent | Viewed, Accept) => Ok(Accepted),
        (Sent | Viewed, Reject) => Ok(Rejected),
        (Sent | Viewed, Expire) => Ok(Expired),
        _ => Err(TransitionError::InvalidTransition { from, event }),
    }
}
