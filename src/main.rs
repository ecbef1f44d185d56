//! Launchkit API server binary.
//!
//! Loads configuration, connects Postgres, wires the production adapters
//! into the router, and serves.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use launchkit::adapters::auth::{Argon2PasswordHasher, GoogleIdentityVerifier, JwtTokenCodec};
use launchkit::adapters::email::ResendMailer;
use launchkit::adapters::http::{self, api_router, AppState, CookieSettings};
use launchkit::adapters::postgres::{
    PostgresAccountRepository, PostgresNoteRepository, PostgresPriceCatalog,
    PostgresResetTokenRepository, PostgresWebhookLedger,
};
use launchkit::adapters::stripe::{StripeClient, StripeClientConfig};
use launchkit::config::AppConfig;
use launchkit::domain::billing::{StripeWebhookVerifier, SubscriptionReconciler};
use launchkit::ports::{BillingProvider, PriceCatalog};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);
    http::expose_error_details(!config.is_production());

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!().run(&pool).await?;
    }

    let accounts = Arc::new(PostgresAccountRepository::new(pool.clone()));
    let notes = Arc::new(PostgresNoteRepository::new(pool.clone()));
    let reset_tokens = Arc::new(PostgresResetTokenRepository::new(pool.clone()));
    let prices: Arc<dyn PriceCatalog> = Arc::new(PostgresPriceCatalog::new(pool.clone()));
    let ledger = Arc::new(PostgresWebhookLedger::new(pool.clone()));

    let billing: Arc<dyn BillingProvider> = Arc::new(StripeClient::new(StripeClientConfig::new(
        config.payment.stripe_api_key.clone(),
    )));
    let identity = Arc::new(GoogleIdentityVerifier::new(
        config.auth.google_client_id.clone(),
    ));
    let mailer = Arc::new(ResendMailer::new(
        config.email.resend_api_key.clone(),
        config.email.from_header(),
    ));

    let webhook_verifier = Arc::new(StripeWebhookVerifier::new(
        config.payment.stripe_webhook_secret.clone(),
    ));
    let reconciler = Arc::new(SubscriptionReconciler::new(ledger, billing.clone()));

    refresh_price_mirror(billing.as_ref(), prices.as_ref()).await;

    let state = AppState {
        accounts,
        notes,
        reset_tokens,
        prices,
        billing,
        identity,
        mailer,
        password_hasher: Arc::new(Argon2PasswordHasher),
        token_codec: Arc::new(JwtTokenCodec::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl(),
        )),
        webhook_verifier,
        reconciler,
        cookies: CookieSettings::from_config(&config.auth, &config.server.environment),
        app_base_url: config.email.app_base_url.clone(),
    };

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, environment = ?config.server.environment, "launchkit listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Refresh the local plans mirror from the provider catalog.
///
/// A failure is logged and tolerated: the API can serve with a stale (or
/// empty) mirror, and the next restart retries.
async fn refresh_price_mirror(billing: &dyn BillingProvider, prices: &dyn PriceCatalog) {
    match billing.list_prices().await {
        Ok(fetched) => {
            let count = fetched.len();
            match prices.replace_all(fetched).await {
                Ok(()) => tracing::info!(count, "price mirror refreshed"),
                Err(err) => tracing::warn!(error = %err, "failed to store price mirror"),
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to fetch provider prices"),
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        // No origins configured: wide open, without credentials.
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
