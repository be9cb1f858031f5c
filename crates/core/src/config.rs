use crate::error::{Error, Result};
use crate::types::Route;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "prerender.toml";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787";
const DEFAULT_OUTPUT: &str = "dist";
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// Complete pre-render configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub build: BuildConfig,
    /// Routes declared in the config file, in declaration order
    pub routes: Vec<Route>,
}

/// How to reach (and optionally start) the application under build
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Program and arguments used to start the app; `None` means it is already running
    pub command: Option<Vec<String>>,
    pub base_url: Url,
    pub env: BTreeMap<String, String>,
    pub ready_timeout: Duration,
    pub request_timeout: Option<Duration>,
    /// Endpoint on the app that lists its routes as `[{method, path}]`
    pub routes_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub output: PathBuf,
    pub concurrency: usize,
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            concurrency: 1,
            clean: false,
        }
    }
}

/// Raw TOML configuration structure
/// This matches the prerender.toml file structure exactly
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: RawServerConfig,
    #[serde(default)]
    build: RawBuildConfig,
    #[serde(default)]
    route: Vec<Route>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServerConfig {
    command: Option<Vec<String>>,
    base_url: Option<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    ready_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    routes_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuildConfig {
    output: Option<String>,
    concurrency: Option<usize>,
    #[serde(default)]
    clean: bool,
}

/// Parse prerender.toml from a file path
pub fn parse_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse prerender.toml from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    let base_url = raw.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let base_url = Url::parse(base_url)
        .map_err(|e| Error::ConfigParse(format!("Invalid server.base_url '{}': {}", base_url, e)))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(Error::ConfigParse(format!(
            "server.base_url must be http or https, got '{}'",
            base_url.scheme()
        )));
    }

    let command = match raw.server.command {
        Some(command) if command.is_empty() => {
            return Err(Error::ConfigParse(
                "server.command must name a program".to_string(),
            ));
        }
        other => other,
    };

    let routes_path = raw
        .server
        .routes_path
        .map(|p| validate_route_path(&p, "server.routes_path").map(|_| p))
        .transpose()?;

    for (i, route) in raw.route.iter().enumerate() {
        validate_route_path(&route.path, &format!("route[{}].path", i))?;
    }

    if raw.route.is_empty() && routes_path.is_none() {
        return Err(Error::ConfigParse(
            "No routes: declare [[route]] entries or set server.routes_path".to_string(),
        ));
    }

    let output = match raw.build.output {
        Some(output) => validate_path(&output, "build.output")?,
        None => PathBuf::from(DEFAULT_OUTPUT),
    };

    let concurrency = raw.build.concurrency.unwrap_or(1);
    if concurrency == 0 {
        return Err(Error::ConfigParse(
            "build.concurrency must be at least 1".to_string(),
        ));
    }

    Ok(Config {
        server: ServerConfig {
            command,
            base_url,
            env: raw.server.env,
            ready_timeout: Duration::from_secs(
                raw.server
                    .ready_timeout_secs
                    .unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
            ),
            request_timeout: raw.server.request_timeout_secs.map(Duration::from_secs),
            routes_path,
        },
        build: BuildConfig {
            output,
            concurrency,
            clean: raw.build.clean,
        },
        routes: raw.route,
    })
}

fn validate_route_path(path: &str, field_name: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "'{}' must start with '/': '{}'",
            field_name, path
        )));
    }
    Ok(())
}

/// Validate and convert the output directory string to PathBuf.
///
/// The output directory is resolved against the project directory, so it must
/// stay strictly inside it: absolute paths, `..` components and paths that
/// name the project directory itself (`.`) are rejected.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    if path
        .components()
        .all(|component| component == std::path::Component::CurDir)
    {
        return Err(Error::ConfigParse(format!(
            "'{}' must name a directory below the project, not the project itself: '{}'",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path.to_path_buf())
}
