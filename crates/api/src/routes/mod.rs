//! HTTP route handlers.

pub mod emails;
pub mod health;
pub mod proposals;
pub mod share_links;
pub mod templates;
pub mod tracking;
