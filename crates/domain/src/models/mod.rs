//! Domain models.

pub mod email_record;
pub mod email_template;
pub mod proposal;
pub mod share_link;

pub use email_record::{
    EmailRecord, EmailRecordResponse, EmailStats, EmailStatus, SendEmailRequest,
};
pub use email_template::{
    CreateTemplateRequest, EmailTemplate, RenderedTemplate, TemplateVars, UpdateTemplateRequest,
};
pub use proposal::{
    CreateProposalRequest, ListProposalsQuery, ListProposalsResponse, NewProposalItem,
    NewProposalSection, Proposal, ProposalItem, ProposalSection, ProposalSortField,
    ProposalStatus, SortOrder,
};
pub use share_link::{
    calculate_expiry, CreateShareLinkRequest, ShareLink, ShareLinkValidation,
    ShareLinkValidationResponse, DEFAULT_TTL_DAYS,
};
