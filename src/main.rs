//! Process entry point: load configuration, connect to storage, wire the
//! engine and live-session endpoint together, serve until signaled to stop.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webcli_core::auth::TokenKeys;
use webcli_core::bus::BusClient;
use webcli_core::config::Config;
use webcli_core::db::DataAccessor;
use webcli_core::engine::{ActionEngine, Handler};
use webcli_core::handlers::system::SystemHandler;
use webcli_core::session::{self, SessionState};

fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = Config::from_env()?;
    info!(bind_addr = %config.bind_addr, "starting webcli-core");

    let data = Arc::new(DataAccessor::connect(&config.database_url).await?);
    data.migrate().await?;
    info!("database migrations applied");

    let private_key = tokio::fs::read(&config.jwt_private_key_path).await?;
    let public_key = tokio::fs::read(&config.jwt_public_key_path).await?;
    let _token_keys = Arc::new(TokenKeys::from_pem(&private_key, &public_key)?);

    let bus = BusClient::spawn(config.subscriber_queue_capacity);

    let handlers: Vec<Arc<dyn Handler>> = vec![Arc::new(SystemHandler::new(config.users_home_dir.clone()))];

    let engine = Arc::new(ActionEngine::new(handlers, config.worker_pool_size, data.clone(), bus.clone(), config.resource_dir.clone()));
    engine.startup().await;

    let session_state = SessionState { bus: bus.clone(), keepalive_interval: config.keepalive_interval() };
    let app = session::router(session_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "listening");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!(%err, "server error");
    }

    engine.shutdown().await;
    info!("webcli-core stopped");
    Ok(())
}
