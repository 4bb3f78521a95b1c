use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use crates::infra::db::postgres::postgres_connection::{self, PoolOptions};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:?}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!(stage = %dotenvy_env.stage, "ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        &PoolOptions {
            max_connections: dotenvy_env.database.max_connections,
            connect_timeout_secs: dotenvy_env.database.connect_timeout,
        },
    )?;
    info!("Postgres connection has been established");

    let db_pool = Arc::new(postgres_pool);
    http_serve::start(Arc::new(dotenvy_env), Arc::clone(&db_pool)).await?;

    // The server has drained; dropping the last handle closes pooled connections.
    drop(db_pool);
    info!("Postgres connection pool has been released");

    Ok(())
}
