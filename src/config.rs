// src/config.rs
use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use log::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const API_URL_VAR: &str = "STOCKFOLIO_API_URL";
pub const TOKEN_FILE_VAR: &str = "STOCKFOLIO_TOKEN_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub token_file: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, token_file: impl Into<PathBuf>) -> Self {
        Self {
            api_url: normalize_url(api_url),
            token_file: token_file.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token_file = lookup(TOKEN_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_token_file);

        let config = Self::new(&api_url, token_file);
        debug!(
            "Using backend {} with token file {:?}",
            config.api_url, config.token_file
        );
        config
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_token_file() -> PathBuf {
    ProjectDirs::from("com", "stockfolio", "stockfolio")
        .map(|dirs| dirs.config_dir().join("token"))
        .unwrap_or_else(|| PathBuf::from(".stockfolio-token"))
}
