//! Batchgate server binary.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use batchgate::adapters::auth::JwtSessionValidator;
use batchgate::adapters::http::{api_router, AppState, AuthState};
use batchgate::adapters::postgres::{
    PostgresBatchRepository, PostgresEntitlementRepository, PostgresIdentityResolver,
    PostgresStudentRepository,
};
use batchgate::adapters::razorpay::{RazorpayConfig, RazorpayOrderGateway};
use batchgate::config::AppConfig;
use batchgate::domain::enrollment::PaymentVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let state = AppState {
        batches: Arc::new(PostgresBatchRepository::new(pool.clone())),
        students: Arc::new(PostgresStudentRepository::new(pool.clone())),
        entitlements: Arc::new(PostgresEntitlementRepository::new(pool.clone())),
        order_gateway: Arc::new(RazorpayOrderGateway::new(RazorpayConfig::new(
            &config.payment.key_id,
            &config.payment.key_secret,
            &config.payment.currency,
        ))),
        verifier: Arc::new(PaymentVerifier::new(&config.payment.key_secret)),
        renewal_days: config.payment.renewal_days,
    };

    let auth = AuthState {
        validator: Arc::new(JwtSessionValidator::new(&config.auth.jwt_secret)),
        resolver: Arc::new(PostgresIdentityResolver::new(pool)),
    };

    let app = api_router(state, auth)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, test_mode = config.payment.is_test_mode(), "batchgate listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let parsed: Vec<http::HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
