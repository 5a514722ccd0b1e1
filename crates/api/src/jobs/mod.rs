//! Background job scheduler and job implementations.

mod expire_proposals;
mod scheduler;

pub use expire_proposals::ExpireProposalsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
