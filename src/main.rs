//! Server entry point: configuration, adapter wiring, and serving.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use profile_market::adapters::clerk::{ClerkConfig, ClerkSessionValidator, ClerkUserDirectory};
use profile_market::adapters::http::{build_router, AppState};
use profile_market::adapters::jobs::{InngestConfig, InngestDispatcher};
use profile_market::adapters::postgres::{PostgresTransactionRepository, PostgresUserRepository};
use profile_market::adapters::stripe::{StripeClient, StripeClientConfig};
use profile_market::application::handlers::{FinalizePurchaseHandler, SyncUserHandler};
use profile_market::config::AppConfig;
use profile_market::domain::webhook::WebhookVerifier;
use profile_market::ports::{
    IdentityProvider, JobDispatcher, PaymentProvider, SessionValidator, TransactionRepository,
    UserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let transactions: Arc<dyn TransactionRepository> =
        Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool));

    let payment_provider: Arc<dyn PaymentProvider> =
        Arc::new(StripeClient::new(StripeClientConfig::from(&config.payment))?);
    let jobs: Arc<dyn JobDispatcher> =
        Arc::new(InngestDispatcher::new(InngestConfig::from(&config.jobs))?);

    let sessions: Arc<dyn SessionValidator> = Arc::new(ClerkSessionValidator::new(
        ClerkConfig::new(config.auth.jwks_url.clone(), config.auth.issuer.clone()),
    )?);
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(ClerkUserDirectory::from_config(&config.auth)?);

    let verifier = WebhookVerifier::new(config.payment.webhook_secret.expose_secret().as_str());

    let finalize_purchase = Arc::new(FinalizePurchaseHandler::new(
        verifier,
        payment_provider,
        transactions,
        jobs,
        config.payment.app_id.clone(),
    ));
    let sync_user = Arc::new(SyncUserHandler::new(users, identity.clone()));

    let state = AppState::new(
        finalize_purchase,
        sync_user,
        sessions,
        identity,
        config.auth.admin_email_list(),
    );

    let app = build_router(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Server is live!");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "profile_market=info,tower_http=info,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
