//! Command-line and environment configuration for parkfinder
//!
//! Every option has an environment fallback, so running without flags uses the
//! defaults plus whatever `.env` or the shell provides (notably the MapQuest
//! API key).

use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_FILE;
use crate::data::nps::NPS_BASE_URL;

/// Error types for startup configuration
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL could not be parsed
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// parkfinder - browse national park sites by state and find places nearby
#[derive(Parser, Debug)]
#[command(name = "parkfinder")]
#[command(about = "Browse National Park Service sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// JSON file holding cached pages and places results
    #[arg(long, value_name = "PATH", env = "PARKFINDER_CACHE_FILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// MapQuest API key used for nearby-place lookups
    #[arg(long, value_name = "KEY", env = "MAPQUEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Root of the park service website
    #[arg(long, value_name = "URL", env = "PARKFINDER_BASE_URL", default_value = NPS_BASE_URL)]
    pub base_url: String,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Where the response cache lives
    pub cache_file: PathBuf,
    /// MapQuest API key, if any
    pub api_key: Option<String>,
    /// Validated site root
    pub base_url: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            api_key: None,
            base_url: NPS_BASE_URL.to_string(),
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// A blank API key is treated as absent.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the base URL is not a valid URL
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Url::parse(&cli.base_url).map_err(|e| CliError::InvalidBaseUrl {
            url: cli.base_url.clone(),
            reason: e.to_string(),
        })?;

        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(StartupConfig {
            cache_file: cli.cache_file.clone(),
            api_key,
            base_url: cli.base_url.clone(),
        })
    }
}
