use prerender_kit_core::protocol::SSG_CONTEXT_ENV;
use prerender_kit_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::http::HttpApp;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The application under build, running as a child process.
///
/// The child is killed when the handle is dropped; call [`ServerProcess::shutdown`]
/// to stop it and wait for it to exit.
pub struct ServerProcess {
    child: Child,
    program: String,
}

impl ServerProcess {
    /// Run `command` from `dir` with `SSG_CONTEXT=true` plus `env` set
    pub fn spawn(command: &[String], env: &BTreeMap<String, String>, dir: &Path) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Server("Empty server command".to_string()))?;

        let child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .env(SSG_CONTEXT_ENV, "true")
            .envs(env)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Server(format!("Failed to start '{}': {}", program, e)))?;

        info!(program = %program, pid = ?child.id(), "started app server");
        Ok(Self {
            child,
            program: program.clone(),
        })
    }

    /// Poll until the app answers on its base URL, the process exits, or `timeout` passes
    pub async fn wait_ready(&mut self, app: &HttpApp, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Err(Error::Server(format!(
                    "'{}' exited before becoming ready ({})",
                    self.program, status
                )));
            }
            if app.ping().await {
                debug!(url = %app.base_url(), "app server is ready");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Server(format!(
                    "'{}' not reachable at {} after {}s",
                    self.program,
                    app.base_url(),
                    timeout.as_secs()
                )));
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Stop the process and wait for it to exit. Returns the reaped status,
    /// whether the process was killed here or had already exited.
    pub async fn shutdown(mut self) -> Result<ExitStatus> {
        if let Some(status) = self.child.try_wait()? {
            warn!(program = %self.program, %status, "app server had already exited");
            return Ok(status);
        }
        self.child.kill().await?;
        let status = self.child.wait().await?;
        debug!(program = %self.program, %status, "stopped app server");
        Ok(status)
    }
}
