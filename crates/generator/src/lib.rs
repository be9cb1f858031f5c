//! Route enumeration and the fetch-and-persist driver.
//!
//! [`generate`] runs the whole pipeline against an [`App`]: the route table is
//! expanded into a [`UrlSet`], then every URL is fetched and written to disk.

pub mod app;
pub mod enumerate;
pub mod persist;
pub mod routes;

pub use app::{App, AppResponse, FetchRequest};
pub use enumerate::enumerate;
pub use persist::{BuildReport, persist};
pub use routes::{BoxError, ParamSource, ParamsProvider, RouteTable, StaticParams};

use prerender_kit_core::config::CONFIG_FILE_NAME;
use prerender_kit_core::{Error, Result, UrlSet};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: PathBuf,
    pub concurrency: usize,
    /// Remove the output directory before writing
    pub clean: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            concurrency: 1,
            clean: false,
        }
    }
}

/// Enumerate `table` against `app` and write every successful page
pub async fn generate(
    table: &RouteTable,
    app: &dyn App,
    options: &GenerateOptions,
) -> Result<BuildReport> {
    let urls: UrlSet = enumerate(table, app).await?;
    info!(routes = table.len(), urls = urls.len(), "enumerated routes");

    if options.clean {
        clean_output(&options.output).await?;
    }

    persist(&urls, app, &options.output, options.concurrency).await
}

/// Remove a previous build. A directory holding a project config is never
/// removed, whatever path it was reached through.
async fn clean_output(output: &Path) -> Result<()> {
    if !tokio::fs::try_exists(output).await? {
        return Ok(());
    }
    if tokio::fs::try_exists(output.join(CONFIG_FILE_NAME)).await? {
        return Err(Error::InvalidData(format!(
            "Refusing to clean {}: it contains {} (is the output the project directory?)",
            output.display(),
            CONFIG_FILE_NAME
        )));
    }
    tokio::fs::remove_dir_all(output).await?;
    Ok(())
}
