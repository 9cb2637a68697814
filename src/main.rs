use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use twaddle_gateway::adapters::memory::MemoryStore;
use twaddle_gateway::adapters::postgres;
use twaddle_gateway::adapters::websocket::{websocket_router, GatewayState};
use twaddle_gateway::application::{Gateway, GatewayDeps};
use twaddle_gateway::config::{AppConfig, DatabaseConfig, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        backend = ?config.storage.backend,
        "Twaddle gateway starting"
    );

    let deps = match config.storage.backend {
        StorageBackend::Postgres => postgres_deps(&config.database).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            GatewayDeps::from_store(Arc::new(MemoryStore::new()))
        }
    };

    let gateway = Arc::new(Gateway::new(deps, config.gateway.settings()));
    let app = websocket_router(GatewayState::new(gateway, config.gateway.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, path = %config.gateway.path, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.server.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init();
    }
}

async fn postgres_deps(
    database: &DatabaseConfig,
) -> Result<GatewayDeps, Box<dyn std::error::Error>> {
    let pool = database.pool_options().connect(&database.url).await?;
    tracing::info!(max_connections = database.max_connections, "Connected to PostgreSQL");

    if database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let (users, chats, messages) = postgres::repositories(pool);
    Ok(GatewayDeps {
        users,
        chats,
        messages,
    })
}
