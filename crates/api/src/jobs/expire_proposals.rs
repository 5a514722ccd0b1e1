//! Proposal expiry sweep background job.

use persistence::repositories::ProposalRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics;

/// Moves pending proposals past their validity window to `expired`.
/// Subscribers pick the change up on their next fetch; on-demand sweeps
/// via the API additionally publish change events.
pub struct ExpireProposalsJob {
    repo: ProposalRepository,
}

impl ExpireProposalsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: ProposalRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for ExpireProposalsJob {
    fn name(&self) -> &'static str {
        "expire_proposals"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> Result<(), String> {
        let expired = self
            .repo
            .expire_pending()
            .await
            .map_err(|e| format!("Failed to expire pending proposals: {}", e))?;

        if !expired.is_empty() {
            metrics::record_proposals_expired(expired.len() as u64);
            info!(expired = expired.len(), "Expired pending proposals");
        }

        Ok(())
    }
}
