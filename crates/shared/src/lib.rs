//! Shared utilities and common types for the Proposal Desk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Opaque token generation (share links, tracking tokens)
//! - Offset pagination helpers
//! - Common validation logic
//! - JWT bearer-token utilities

pub mod jwt;
pub mod pagination;
pub mod token;
pub mod validation;
