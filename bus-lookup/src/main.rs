use std::error::Error;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bus_lookup::config::{ServerArgs, ServerConfig};
use bus_lookup::store::{InMemoryStore, SqlStore};
use bus_lookup::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bus_lookup=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::try_from(ServerArgs::parse())?;

    // Build app state
    let state = match &config.fixture {
        Some(path) => {
            info!(path = %path.display(), "serving schedule fixture from memory");
            AppState::new(InMemoryStore::from_json_file(path)?)
        }
        None => AppState::new(SqlStore::connect(&config.store).await?),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "bus lookup listening");
    info!("endpoints: /health /regions /stops /buses /bus-details /nearest");

    axum::serve(listener, app).await?;
    Ok(())
}
