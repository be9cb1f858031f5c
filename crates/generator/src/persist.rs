use futures::stream::{self, StreamExt};
use prerender_kit_core::{ConcreteUrl, RenderedPage, Result, UrlSet, output_path};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::app::{App, FetchRequest};

/// Outcome of writing a URL set to disk
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub output: PathBuf,
    pub written: Vec<PathBuf>,
    /// URLs whose fetch did not return 200, with the status received
    pub skipped: Vec<(ConcreteUrl, u16)>,
}

enum Outcome {
    Written(PathBuf),
    Skipped(ConcreteUrl, u16),
}

/// Fetch every URL and write successful pages under `output`.
///
/// Up to `concurrency` pages are in flight at once; `1` processes the set
/// strictly in order. The first fatal error aborts the run.
pub async fn persist(
    urls: &UrlSet,
    app: &dyn App,
    output: &Path,
    concurrency: usize,
) -> Result<BuildReport> {
    let mut report = BuildReport {
        output: output.to_path_buf(),
        ..Default::default()
    };

    let mut pages = stream::iter(urls.iter())
        .map(|url| persist_one(url, app, output))
        .buffer_unordered(concurrency.max(1));

    while let Some(outcome) = pages.next().await {
        match outcome? {
            Outcome::Written(path) => report.written.push(path),
            Outcome::Skipped(url, status) => report.skipped.push((url, status)),
        }
    }

    Ok(report)
}

async fn persist_one(url: &ConcreteUrl, app: &dyn App, output: &Path) -> Result<Outcome> {
    let page = fetch_page(app, url).await?;
    if !page.is_persistable() {
        debug!(url = %page.url, status = page.status, "skipping page");
        return Ok(Outcome::Skipped(page.url, page.status));
    }
    let path = write_page(output, &page).await?;
    Ok(Outcome::Written(path))
}

/// Plain (unmarked) request for a single URL
pub async fn fetch_page(app: &dyn App, url: &ConcreteUrl) -> Result<RenderedPage> {
    let response = app.fetch(FetchRequest::page(url.as_str())).await?;
    Ok(RenderedPage {
        url: url.clone(),
        status: response.status,
        body: response.body,
    })
}

/// Write a page to its output file, creating parent directories and overwriting any existing file
pub async fn write_page(output: &Path, page: &RenderedPage) -> Result<PathBuf> {
    let path = output_path(output, &page.url)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&path, &page.body).await?;
    info!(url = %page.url, path = %path.display(), "wrote page");
    Ok(path)
}
