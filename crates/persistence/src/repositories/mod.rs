//! Repositories encapsulating all SQL for the proposal subsystem.

pub mod email;
pub mod email_template;
pub mod proposal;
pub mod share_link;

pub use email::EmailRepository;
pub use email_template::EmailTemplateRepository;
pub use proposal::ProposalRepository;
pub use share_link::ShareLinkRepository;
