//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to
//! this service and to `tower_http` request spans, with sqlx statement
//! logging capped at warn.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);

    if config.format == "json" {
        builder.json().with_current_span(true).init();
    } else {
        builder.pretty().init();
    }
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "proposal_desk_api={level},domain={level},persistence={level},shared={level},tower_http={level},sqlx=warn"
    ))
}
