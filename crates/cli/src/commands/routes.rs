use anyhow::{Context, Result};
use prerender_kit_core::UrlSet;
use prerender_kit_core::config::Config;
use prerender_kit_generator::enumerate;
use prerender_kit_server::{LiveServer, resolve_route_table};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::load_config;
use super::validate::check_routes;

/// Start the app and print the URL set without writing anything
pub async fn run(path: PathBuf) -> Result<()> {
    let config = load_config(&path)?;

    println!("🔎 Enumerating routes...");
    println!("   App: {}", config.server.base_url);

    let urls = with_server(&path, &config).await?;

    println!();
    for url in &urls {
        println!("{}", url);
    }
    println!();
    println!("✓ {} URL(s)", urls.len());

    Ok(())
}

async fn with_server(path: &Path, config: &Config) -> Result<UrlSet> {
    let server = LiveServer::start(&config.server, path)
        .await
        .context("Failed to start app")?;

    let result = tokio::select! {
        result = list_urls(config, &server) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
    };

    if let Err(e) = server.shutdown().await {
        warn!(error = %e, "failed to stop app server");
    }
    result
}

async fn list_urls(config: &Config, server: &LiveServer) -> Result<UrlSet> {
    let table = resolve_route_table(config, server.app())
        .await
        .context("Failed to resolve routes")?;
    check_routes(&table)?;
    enumerate(&table, server.app())
        .await
        .context("Failed to enumerate routes")
}
