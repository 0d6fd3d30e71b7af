use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use prefpop::api::{router, AppState};
use prefpop::{ResasConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let resas = ResasConfig::from_env().context("cannot start without upstream credentials")?;
    let state = AppState::connect(&resas)
        .await
        .context("failed to load the prefecture list at startup")?;
    let server = ServerConfig::from_env();

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .context("invalid HOST/PORT")?;
    info!(upstream = %resas.base_url, "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind failed")?;
    axum::serve(listener, router(state)).await.context("server failed")?;
    Ok(())
}
