use std::net::SocketAddr;
use std::sync::Arc;

use patio_api::{app, state::{AppState, AuthConfig}};
use patio_domain::ParkingExchange;
use patio_store::{
    DbClient, PostgresFamilyDirectory, PostgresOfferRepository, PostgresRequestRepository,
    PostgresSpotRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patio_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = patio_store::app_config::Config::load()?;
    tracing::info!("Starting Patio API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let exchange = Arc::new(ParkingExchange::new(
        Arc::new(PostgresOfferRepository { pool: db.pool.clone() }),
        Arc::new(PostgresRequestRepository { pool: db.pool.clone() }),
        Arc::new(PostgresSpotRepository { pool: db.pool.clone() }),
        config.exchange.clone(),
    ));

    let state = AppState {
        exchange,
        directory: Arc::new(PostgresFamilyDirectory { pool: db.pool.clone() }),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
