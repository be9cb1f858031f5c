pub mod config;
pub mod error;
pub mod output;
pub mod protocol;
pub mod template;
pub mod types;

pub use config::{Config, parse_config};
pub use error::{Error, Result};
pub use output::output_path;
pub use template::substitute;
pub use types::*;
