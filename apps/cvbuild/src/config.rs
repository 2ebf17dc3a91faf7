use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
/// Read only by `serve`. Every variable is optional; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// Upper bound on the `document` and `template` fields of a request.
    pub max_document_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_document_bytes: std::env::var("MAX_DOCUMENT_BYTES")
                .unwrap_or_else(|_| "1048576".to_string())
                .parse::<usize>()
                .context("MAX_DOCUMENT_BYTES must be a positive integer")?,
        })
    }
}
