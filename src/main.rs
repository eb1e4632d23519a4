mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod lookup_client;
mod models;
mod normalizer;
mod payment_handlers;
mod razorpay_client;
mod wallet;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::lookup_client::LookupClient;
use crate::razorpay_client::RazorpayClient;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the database pool, the external
/// gateway clients, and the HTTP routes with their middleware (CORS, rate
/// limiting, body size limit), then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "osint_credits_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Initialize lookup provider client (investigation requests fail closed
    // with a configuration error while this is None)
    let lookup_client = match &config.lookup_api_token {
        Some(token) => {
            match LookupClient::new(config.lookup_base_url.clone(), token.clone()) {
                Ok(client) => {
                    tracing::info!("Lookup provider client initialized: {}", config.lookup_base_url);
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to initialize lookup client: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    // Initialize Razorpay client (payment endpoints fail closed while None)
    let razorpay_client = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
        (Some(key_id), Some(key_secret)) => {
            match RazorpayClient::new(
                config.razorpay_base_url.clone(),
                key_id.clone(),
                key_secret.clone(),
            ) {
                Ok(client) => {
                    tracing::info!("Razorpay client initialized: {}", config.razorpay_base_url);
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to initialize Razorpay client: {}", e);
                    None
                }
            }
        }
        _ => None,
    };

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        lookup_client,
        razorpay_client,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route("/api/v1/investigation", post(handlers::investigate))
        .route(
            "/api/v1/payments/orders",
            post(payment_handlers::create_order),
        )
        .route(
            "/api/v1/payments/verify",
            post(payment_handlers::verify_payment),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
