//! Application services.

pub mod dispatch;
pub mod email;

pub use dispatch::EmailDispatcher;
pub use email::{EmailMessage, EmailService};
