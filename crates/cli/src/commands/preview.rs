use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, path::PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Serve a built output directory the way a static host would.
///
/// `/posts/1` is answered from `posts/1.html` and `/` from `index.html`.
pub async fn run(dir: PathBuf, port: u16) -> Result<()> {
    println!("🌐 Starting preview server...");
    println!("   Site: {}", dir.display());

    if !dir.join("index.html").exists() {
        anyhow::bail!(
            "No index.html in {}\nRun 'prerender-kit build' first",
            dir.display()
        );
    }

    let app = site_router(dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    Ok(())
}

fn site_router(dir: PathBuf) -> Router {
    Router::new()
        .fallback(serve_page)
        .with_state(ServeDir::new(dir))
        .layer(TraceLayer::new_for_http())
}

async fn serve_page(State(pages): State<ServeDir>, request: Request) -> Response {
    let method = request.method().clone();
    let headers = request.headers().clone();
    let html_uri = html_uri(request.uri());

    let response = match pages.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() != StatusCode::NOT_FOUND {
        return response.into_response();
    }
    let Some(uri) = html_uri else {
        return response.into_response();
    };

    let mut retry = Request::new(Body::empty());
    *retry.method_mut() = method;
    *retry.uri_mut() = uri;
    *retry.headers_mut() = headers;

    match pages.oneshot(retry).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// `/posts/1` -> `/posts/1.html`; directories and paths with an extension are left alone
fn html_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last.contains('.') {
        return None;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{}.html?{}", path, query),
        None => format!("{}.html", path),
    };
    rewritten.parse().ok()
}
