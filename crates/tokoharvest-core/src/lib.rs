pub mod env;
pub mod fetch_config;
pub mod products;

use thiserror::Error;

/// Errors raised while loading or validating job configuration and inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("failed to read products file {path}")]
    ProductsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse products file: {0}")]
    ProductsFileParse(#[from] serde_json::Error),
}
