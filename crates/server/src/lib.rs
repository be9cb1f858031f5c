//! Access to the application under build.
//!
//! - [`HttpApp`]: a running app reached over HTTP
//! - [`ServerProcess`]: the app started as a child process for the length of a build
//! - [`RouterApp`] / [`SsgRouter`]: an axum app served in-process
//! - [`params_middleware`]: handler side of the params protocol

pub mod http;
pub mod params;
pub mod process;
pub mod router;

pub use http::HttpApp;
pub use params::{params_middleware, params_response};
pub use process::ServerProcess;
pub use router::{RouterApp, SsgRouter};

use prerender_kit_core::config::ServerConfig;
use prerender_kit_core::{Config, Error, Result, Route};
use prerender_kit_generator::RouteTable;
use std::path::Path;
use tracing::{debug, warn};

/// A reachable app for the duration of a build. Owns the child process when
/// the app was started from `server.command`.
pub struct LiveServer {
    app: HttpApp,
    process: Option<ServerProcess>,
}

impl LiveServer {
    /// Start the configured command (if any) from `project_dir` and wait
    /// until the app answers
    pub async fn start(config: &ServerConfig, project_dir: &Path) -> Result<Self> {
        let app = HttpApp::new(config.base_url.clone(), config.request_timeout)?;

        let process = match &config.command {
            Some(command) => {
                let mut process = ServerProcess::spawn(command, &config.env, project_dir)?;
                if let Err(e) = process.wait_ready(&app, config.ready_timeout).await {
                    if let Err(stop_err) = process.shutdown().await {
                        warn!(error = %stop_err, "failed to stop app server");
                    }
                    return Err(e);
                }
                Some(process)
            }
            None => {
                if !app.ping().await {
                    return Err(Error::Server(format!(
                        "No app reachable at {} (set server.command to start one)",
                        config.base_url
                    )));
                }
                None
            }
        };

        Ok(Self { app, process })
    }

    pub fn app(&self) -> &HttpApp {
        &self.app
    }

    pub fn is_managed(&self) -> bool {
        self.process.is_some()
    }

    /// Stop the app if this handle started it
    pub async fn shutdown(self) -> Result<()> {
        if let Some(process) = self.process {
            process.shutdown().await?;
        }
        Ok(())
    }
}

/// Build the route table for an external app: declared routes first, then
/// any routes from the app's listing endpoint that were not declared.
pub async fn resolve_route_table(config: &Config, app: &HttpApp) -> Result<RouteTable> {
    let mut routes: Vec<Route> = config.routes.clone();

    if let Some(listing_path) = &config.server.routes_path {
        let listed = app.route_listing(listing_path).await?;
        debug!(count = listed.len(), path = %listing_path, "fetched route listing");
        for route in listed {
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
    }

    Ok(RouteTable::negotiated(routes))
}
