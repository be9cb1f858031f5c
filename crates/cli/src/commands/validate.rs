use anyhow::Result;
use prerender_kit_generator::RouteTable;
use prerender_kit_validator::validate_routes;
use std::path::PathBuf;

use super::load_config;

/// Parse the config and check the declared route templates
pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating project at: {}", path.display());

    let config = load_config(&path)?;

    println!("✓ prerender.toml valid");
    println!("  App: {}", config.server.base_url);
    match &config.server.command {
        Some(command) => println!("  Command: {}", command.join(" ")),
        None => println!("  Command: none (app must already be running)"),
    }
    println!("  Output: {}", path.join(&config.build.output).display());
    println!("  Declared routes: {}", config.routes.len());

    check_routes(&RouteTable::negotiated(config.routes.clone()))?;

    if let Some(listing) = &config.server.routes_path {
        println!(
            "ℹ Routes listed at {} are checked once the app runs (prerender-kit routes)",
            listing
        );
    }

    Ok(())
}

/// Print the validation report for `table`, failing on any error
pub(crate) fn check_routes(table: &RouteTable) -> Result<()> {
    let report = validate_routes(table);
    if !report.errors.is_empty() || !report.warnings.is_empty() || !report.info.is_empty() {
        println!();
        print!("{}", report);
    }

    if !report.is_ok() {
        anyhow::bail!("{} route error(s)", report.errors.len());
    }
    println!("\n✓ Routes valid");
    Ok(())
}
