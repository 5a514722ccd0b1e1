//! Application state and router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use domain::services::notifier::ChangeNotifier;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes;
use crate::services::{EmailDispatcher, EmailService};

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub notifier: ChangeNotifier,
    pub dispatcher: EmailDispatcher,
}

/// Build the full application router with all routes and middleware.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let notifier = ChangeNotifier::new();
    let email = EmailService::new(config.email.clone());
    let config = Arc::new(config);
    let dispatcher = EmailDispatcher::new(pool.clone(), email, notifier.clone(), &config);

    let state = AppState {
        pool,
        config: config.clone(),
        notifier,
        dispatcher,
    };

    let cors = build_cors_layer(&config.security.cors_origins);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::tracking::router())
        .merge(routes::proposals::router())
        .merge(routes::share_links::router())
        .merge(routes::emails::router())
        .merge(routes::templates::router())
        .route("/metrics", axum::routing::get(metrics_handler))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer. An empty origin list means permissive (dev).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
