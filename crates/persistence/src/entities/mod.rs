//! Database entities (row mappings).

pub mod email_record;
pub mod email_template;
pub mod proposal;
pub mod share_link;

pub use email_record::EmailRecordEntity;
pub use email_template::EmailTemplateEntity;
pub use proposal::{ProposalEntity, ProposalItemEntity, ProposalSectionEntity};
pub use share_link::ShareLinkEntity;
