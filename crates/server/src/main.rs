use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use centime_server::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let db = centime_storage::create_db(&config.storage.database).await?;
    centime_storage::seed_default_accounts(&db).await?;
    tracing::info!("database ready at {}", config.storage.database.display());

    let state = Arc::new(AppState {
        db,
        profile: config.profile.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
