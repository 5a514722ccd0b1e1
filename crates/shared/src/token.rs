//! Opaque token generation for share links and email tracking.
//!
//! Tokens are URL-safe base64 over cryptographically random bytes, with a
//! short prefix identifying their purpose. They are stored as-is and
//! compared by equality; unguessability is the only security property.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Prefix for proposal share-link tokens.
pub const SHARE_TOKEN_PREFIX: &str = "share_";

/// Prefix for open-tracking tokens (embedded in the pixel URL).
pub const OPEN_TOKEN_PREFIX: &str = "open_";

/// Prefix for click-tracking tokens (embedded in outbound links).
pub const CLICK_TOKEN_PREFIX: &str = "click_";

/// Length of random bytes per token.
const TOKEN_RANDOM_BYTES: usize = 32;

fn generate(prefix: &str) -> String {
    let mut bytes = [0u8; TOKEN_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", prefix, URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a new share-link token.
pub fn generate_share_token() -> String {
    generate(SHARE_TOKEN_PREFIX)
}

/// Generate a new open-tracking token.
pub fn generate_open_token() -> String {
    generate(OPEN_TOKEN_PREFIX)
}

/// Generate a new click-tracking token.
pub fn generate_click_token() -> String {
    generate(CLICK_TOKEN_PREFIX)
}
