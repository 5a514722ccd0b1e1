//! Domain layer for the Proposal Desk backend.
//!
//! This crate contains:
//! - Domain models (Proposal, EmailRecord, ShareLink, EmailTemplate)
//! - The proposal status engine
//! - The realtime change notifier

pub mod models;
pub mod services;
