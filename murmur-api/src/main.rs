use murmur_common::model::ModelValidationError;
use murmur_db::{MemoryStore, PgStore, Store, StoreError};
use serde::Deserialize;
use server::ServerState;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error setting up the store: {0}")]
    Store(#[from] StoreError),
    #[error("Error building the demo data: {0}")]
    Seed(#[from] ModelValidationError),
    #[error("DATABASE_URL must be set when STORE=postgres")]
    MissingDatabaseUrl,
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoreKind {
    #[default]
    Memory,
    Postgres,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    #[serde(default)]
    store: StoreKind,
    database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
    #[serde(default = "default_seed_demo_data")]
    seed_demo_data: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_seed_demo_data() -> bool {
    true
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "murmur_api=debug,murmur_db=debug,murmur_common=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn build_store(env: &Env) -> Result<Arc<dyn Store>, InitError> {
    match env.store {
        StoreKind::Memory => {
            let store = if env.seed_demo_data {
                MemoryStore::with_demo_data()?
            } else {
                MemoryStore::new()
            };

            info!(seeded = env.seed_demo_data, "Using in-memory store");
            Ok(Arc::new(store))
        }
        StoreKind::Postgres => {
            let database_url = env
                .database_url
                .as_deref()
                .ok_or(InitError::MissingDatabaseUrl)?;

            let store = PgStore::connect(database_url, env.database_max_connections).await?;
            store.init_schema().await?;
            store.ping().await?;

            info!(
                max_connections = env.database_max_connections,
                "Using postgres store"
            );
            Ok(Arc::new(store))
        }
    }
}

fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Could not listen for ctrl-c");
            return;
        }

        info!("Received ctrl-c, shutting down");
        shutdown.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let store = build_store(&env).await?;

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes()
        .with_state(ServerState { store })
        .layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
