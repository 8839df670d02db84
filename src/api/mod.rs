//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::domain::PriceTable;
use crate::handlers::AdminLocks;
use crate::store::Store;

pub use routes::{protected_router, public_router};

/// Behaviour switches read from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Settings {
    pub allow_published_upgrade: bool,
    pub allow_super_admin_signup: bool,
}

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenIssuer,
    pub prices: Arc<PriceTable>,
    pub locks: AdminLocks,
    pub settings: Settings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenIssuer,
        prices: PriceTable,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            tokens,
            prices: Arc::new(prices),
            locks: AdminLocks::new(),
            settings,
        }
    }

    /// State for `store` with tokens, prices and switches from `config`
    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        let tokens = TokenIssuer::new(
            config.token_secret.clone(),
            chrono::Duration::minutes(config.token_ttl_minutes),
        );
        let settings = Settings {
            allow_published_upgrade: config.allow_published_upgrade,
            allow_super_admin_signup: config.allow_super_admin_signup,
        };
        Self::new(store, tokens, config.prices.clone(), settings)
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Bearer auth only guards the protected routes
    let protected = protected_router().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    let api = public_router().merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ServiceBuilder runs layers top to bottom:
    // cors -> set request id -> trace -> propagate request id -> logging -> handler
    let layers = ServiceBuilder::new()
        .layer(cors)
        // Convert the body back to axum's Body so CorsLayer's `Default` bound holds
        .layer(MapResponseBodyLayer::new(axum::body::Body::new))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    Router::new()
        .nest("/api", api)
        .layer(layers)
        .with_state(state)
}
