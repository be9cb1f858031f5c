use anyhow::Context;
use demo_site::{PostStore, app};
use prerender_kit_core::protocol::SSG_CONTEXT_ENV;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8787;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };

    let store = PostStore::bundled().context("Failed to load bundled posts")?;
    let (router, table) = app(store);

    if std::env::var_os(SSG_CONTEXT_ENV).is_some() {
        tracing::info!(routes = table.len(), "running under a static build");
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("demo site listening on http://{}", addr);

    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}
