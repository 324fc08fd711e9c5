use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::LocationIngestService;
use persistence::repositories::{
    AlertRepository, LocationLogRepository, PetRepository, SafeZoneRepository, UserRepository,
};
use shared::jwt::JwtVerifier;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth, trace_id,
    RateLimiterState,
};
use crate::routes::{alerts, health, locations};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub ingest: Arc<LocationIngestService>,
    pub jwt: Arc<JwtVerifier>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let config = Arc::new(config);

    let jwt = Arc::new(config.jwt.build_verifier()?);

    // Rate limiting is enabled when the per-minute budget is non-zero
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let ingest = Arc::new(LocationIngestService::new(
        Arc::new(LocationLogRepository::new(pool.clone())),
        Arc::new(SafeZoneRepository::new(pool.clone())),
        Arc::new(AlertRepository::new(pool.clone())),
        Arc::new(PetRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool.clone())),
        config.tracking.ingest_config(),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        ingest,
        jwt,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Protected routes (require user JWT authentication)
    // Middleware order: auth runs first, then rate limiting (keyed on the
    // authenticated user)
    let protected_routes = Router::new()
        .route("/api/v1/locations", post(locations::submit_location))
        .route(
            "/api/v1/pets/:pet_id/locations/latest",
            get(locations::get_latest_location),
        )
        .route(
            "/api/v1/pets/:pet_id/locations",
            get(locations::get_location_history),
        )
        .route("/api/v1/pets/:pet_id/alerts", get(alerts::list_alerts))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes with global middleware (bottom layers run first)
    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(app)
}
