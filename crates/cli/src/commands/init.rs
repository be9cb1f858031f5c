use anyhow::{Context, Result};
use prerender_kit_core::config::{CONFIG_FILE_NAME, parse_config_str};
use std::fs;
use std::path::PathBuf;

const STARTER_CONFIG: &str = r##"# Generated by prerender-kit init

[server]
# Command that starts the app. Leave it out if the app is already running.
# It is started with SSG_CONTEXT=true in its environment.
# command = ["cargo", "run", "--quiet"]
base_url = "http://127.0.0.1:8787"
ready_timeout_secs = 30
# request_timeout_secs = 30

# Endpoint returning the app's routes as [{"method": "GET", "path": "/posts/:id"}]
# routes_path = "/_ssg/routes"

# [server.env]
# DATABASE_URL = "sqlite://dev.db"

[build]
output = "dist"
concurrency = 1
clean = false

[[route]]
method = "GET"
path = "/"

# Dynamic routes answer a request carrying `x-ssg-params: true` with
# {"params": [{"id": "1"}, {"id": "2"}]}
# [[route]]
# method = "GET"
# path = "/posts/:id"
"##;

/// Write a starter `prerender.toml` into an existing directory.
///
/// Fails if the directory is missing or already has a config file.
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Initializing project: {}", path.display());

    if !path.exists() {
        anyhow::bail!(
            "Directory '{}' does not exist. Create it first: mkdir {}",
            path.display(),
            path.display()
        );
    }

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            CONFIG_FILE_NAME,
            config_path.display()
        );
    }

    parse_config_str(STARTER_CONFIG)
        .context("Starter config is invalid - this is a bug in prerender-kit init")?;
    fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✓ Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} (server command, routes)", CONFIG_FILE_NAME);
    println!("  2. Check it: prerender-kit validate {}", path.display());
    println!("  3. Build: prerender-kit build {}", path.display());

    Ok(())
}
