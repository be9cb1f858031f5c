use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// A route echoed the params header but its payload was not `{ params: [...] }`
    #[error("Malformed params payload from route '{route}': {reason}")]
    MalformedParams { route: String, reason: String },

    #[error("Params provider for route '{route}' failed: {message}")]
    Provider { route: String, message: String },

    #[error("Route '{route}' expanded to '{url}' with unresolved parameters: {}", missing.join(", "))]
    UnresolvedParams {
        route: String,
        url: String,
        missing: Vec<String>,
    },

    #[error("Invalid output path for '{url}': {reason}")]
    InvalidOutputPath { url: String, reason: String },

    #[error("Server error: {0}")]
    Server(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
