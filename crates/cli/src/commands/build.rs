use anyhow::{Context, Result};
use prerender_kit_core::config::Config;
use prerender_kit_generator::{BuildReport, GenerateOptions, generate};
use prerender_kit_server::{LiveServer, resolve_route_table};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::load_config;
use super::validate::check_routes;

/// Pre-render the project's app into static HTML.
///
/// This command:
/// - Loads prerender.toml
/// - Starts the app (or checks that it is reachable)
/// - Resolves and validates the route table
/// - Enumerates every URL and writes each 200 response
/// - Stops the app, including on failure or Ctrl+C
pub async fn run(
    path: PathBuf,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
    clean: bool,
) -> Result<()> {
    let config = load_config(&path)?;
    let options = build_options(&path, &config, output, concurrency, clean)?;

    println!("🔨 Pre-rendering site...");
    println!("   Project: {}", path.display());
    println!("   App: {}", config.server.base_url);
    println!("   Output: {}", options.output.display());
    println!();

    if config.server.command.is_some() {
        println!("🚀 Starting app...");
    }
    let server = LiveServer::start(&config.server, &path)
        .await
        .context("Failed to start app")?;
    println!("   ✓ App ready");

    let result = tokio::select! {
        result = build_site(&config, &server, &options) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
    };

    if server.is_managed() {
        println!("🛑 Stopping app...");
    }
    if let Err(e) = server.shutdown().await {
        warn!(error = %e, "failed to stop app server");
    }

    print_report(&result?);
    Ok(())
}

/// Merge command-line overrides over `[build]`
fn build_options(
    path: &Path,
    config: &Config,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
    clean: bool,
) -> Result<GenerateOptions> {
    let concurrency = concurrency.unwrap_or(config.build.concurrency);
    if concurrency == 0 {
        anyhow::bail!("--concurrency must be at least 1");
    }

    let output = output.unwrap_or_else(|| path.join(&config.build.output));
    let clean = clean || config.build.clean;
    if clean && encloses(&output, path) {
        anyhow::bail!(
            "Refusing to clean {}: it contains the project directory\nChoose a different --output",
            output.display()
        );
    }

    Ok(GenerateOptions {
        output,
        concurrency,
        clean,
    })
}

/// True when `dir` resolves to `inner` or one of its ancestors
fn encloses(dir: &Path, inner: &Path) -> bool {
    match (dir.canonicalize(), inner.canonicalize()) {
        (Ok(dir), Ok(inner)) => inner.starts_with(dir),
        _ => false,
    }
}

async fn build_site(
    config: &Config,
    server: &LiveServer,
    options: &GenerateOptions,
) -> Result<BuildReport> {
    println!("🧭 Resolving routes...");
    let table = resolve_route_table(config, server.app())
        .await
        .context("Failed to resolve routes")?;
    println!("   ✓ {} route(s)", table.len());
    check_routes(&table)?;

    println!("📄 Rendering pages...");
    generate(&table, server.app(), options)
        .await
        .context("Build failed")
}

fn print_report(report: &BuildReport) {
    println!("   ✓ Wrote {} page(s)", report.written.len());
    for (url, status) in &report.skipped {
        println!("   ⚠ Skipped {} (status {})", url, status);
    }

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", report.output.display());
    println!();
    println!("To test locally:");
    println!("   prerender-kit preview {}", report.output.display());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path as UrlPath;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use prerender_kit_core::config::{CONFIG_FILE_NAME, parse_config_str};
    use prerender_kit_core::param_set;
    use prerender_kit_generator::StaticParams;
    use prerender_kit_server::SsgRouter;
    use std::fs;

    async fn show_post(UrlPath(id): UrlPath<String>) -> Response {
        match id.as_str() {
            "gone" => StatusCode::GONE.into_response(),
            _ => format!("<h1>{}</h1>", id).into_response(),
        }
    }

    async fn serve_site() -> String {
        let (router, _): (axum::Router, _) = SsgRouter::new()
            .page("/", || async { "<h1>home</h1>" })
            .dynamic(
                "/posts/:id",
                StaticParams(vec![
                    param_set([("id", "first")]),
                    param_set([("id", "gone")]),
                ]),
                show_post,
            )
            .with_route_listing("/_ssg/routes")
            .into_parts();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_build_options_use_config_defaults() {
        let config = parse_config_str(
            "[build]\noutput = \"public\"\nconcurrency = 3\n\n[[route]]\nmethod = \"GET\"\npath = \"/\"\n",
        )
        .unwrap();

        let options = build_options(Path::new("site"), &config, None, None, false).unwrap();
        assert_eq!(options.output, PathBuf::from("site/public"));
        assert_eq!(options.concurrency, 3);
        assert!(!options.clean);
    }

    #[test]
    fn test_build_options_flags_override() {
        let config = parse_config_str("[[route]]\nmethod = \"GET\"\npath = \"/\"\n").unwrap();

        let options = build_options(
            Path::new("site"),
            &config,
            Some(PathBuf::from("/tmp/out")),
            Some(8),
            true,
        )
        .unwrap();
        assert_eq!(options.output, PathBuf::from("/tmp/out"));
        assert_eq!(options.concurrency, 8);
        assert!(options.clean);

        assert!(build_options(Path::new("site"), &config, None, Some(0), false).is_err());
    }

    #[test]
    fn test_build_options_refuse_cleaning_project_dir() {
        let project = tempfile::tempdir().unwrap();
        let config = parse_config_str("[[route]]\nmethod = \"GET\"\npath = \"/\"\n").unwrap();

        let err = build_options(
            project.path(),
            &config,
            Some(project.path().join(".")),
            None,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Refusing to clean"));

        let parent = project.path().join("..");
        assert!(build_options(project.path(), &config, Some(parent), None, true).is_err());

        let dist = project.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        assert!(build_options(project.path(), &config, Some(dist), None, true).is_ok());

        // Same output without cleaning is allowed
        assert!(
            build_options(project.path(), &config, Some(project.path().to_path_buf()), None, false)
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_build_against_running_app() {
        let base_url = serve_site().await;
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            format!(
                "[server]\nbase_url = \"{}\"\nroutes_path = \"/_ssg/routes\"\n",
                base_url
            ),
        )
        .unwrap();

        run(dir.path().to_path_buf(), None, Some(2), false)
            .await
            .unwrap();

        let dist = dir.path().join("dist");
        assert_eq!(
            fs::read_to_string(dist.join("index.html")).unwrap(),
            "<h1>home</h1>"
        );
        assert_eq!(
            fs::read_to_string(dist.join("posts/first.html")).unwrap(),
            "<h1>first</h1>"
        );
        assert!(!dist.join("posts/gone.html").exists());
    }
}
