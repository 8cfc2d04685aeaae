use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use bookings::{
    config::AppConfig,
    handlers::{
        create_booking_handler, list_bookings_handler, list_transactions_handler,
        payment_return_handler, update_payment_status_handler, webhook_handler,
    },
    notify::LogMailer,
    state::AppState,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookings=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:bookings.db".to_string());
    let bind_addr =
        std::env::var("BOOKINGS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(&pool)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let config = AppConfig::from_env();
    tracing::info!(
        environment = %config.gateway.environment,
        mail_relay = %config.mail.smtp_host,
        mail_port = config.mail.smtp_port,
        signature_verification = config.webhook_secret.is_some(),
        "starting booking backend"
    );
    if config.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET not set; webhook signature verification is disabled");
    }

    let state = AppState {
        pool,
        config: Arc::new(config),
        mailer: Arc::new(LogMailer),
    };

    let app = Router::new()
        .route(
            "/api/bookings",
            post(create_booking_handler).get(list_bookings_handler),
        )
        .route(
            "/api/bookings/payment-status",
            post(update_payment_status_handler),
        )
        .route(
            "/api/bookings/:booking_id/transactions",
            get(list_transactions_handler),
        )
        .route("/webhook/payment", post(webhook_handler).get(webhook_handler))
        .route("/payment/return", get(payment_return_handler))
        .with_state(state);

    let addr: SocketAddr = bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
