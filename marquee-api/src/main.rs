use std::net::SocketAddr;
use std::time::Duration;

use marquee_api::{app, state::AuthConfig, AppState};
use marquee_store::Db;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "marquee_api=debug,marquee_reserve=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::app_config::Config::load()?;
    let rules = config.business_rules.clone();
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let db = Db::connect(
        &config.database.url,
        Duration::from_secs(rules.lock_wait_seconds),
    )
    .await?;
    db.init_schema().await?;

    // The sweeper races acquire/commit on the same rows by design; it only
    // ever deletes locks already past expiry.
    tokio::spawn(marquee_reserve::sweeper::run(
        db.pool.clone(),
        Duration::from_secs(rules.lock_sweep_interval_seconds),
    ));

    let state = AppState::build(
        db,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        rules,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
