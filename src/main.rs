// region:    --- Imports
use auction_listings::app::{build_router, AppStateInner};
use auction_listings::auth::SessionKeys;
use auction_listings::config::Config;
use auction_listings::database::DatabaseManager;
use auction_listings::store::{AuctionStore, MemoryStore, PostgresStore};
use auction_listings::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    telemetry::init();

    let config = Config::from_env()?;

    let store: Arc<dyn AuctionStore> = match &config.database_url {
        Some(database_url) => {
            let db_manager = Arc::new(
                DatabaseManager::new(database_url, config.database_max_connections).await?,
            );
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> database initialisation failed: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> database ready", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL not set, data is kept in memory only",
                "Main"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let sessions = SessionKeys::new(&config.session_secret, config.session_ttl);
    let routes_all = build_router(AppStateInner::new(store, sessions));

    let listener = TcpListener::bind(config.addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> failed to listen for ctrl-c: {}", "Main", e);
        std::future::pending::<()>().await;
    }
    info!("{:<12} --> shutting down", "Main");
}
// endregion: --- Main
