//! Where to find the backend and where to keep the session.

use std::path::PathBuf;
use url::Url;

/// The hosted backend.
pub const DEFAULT_BASE_URL: &str = "https://hormigapp.onrender.com/api";
pub const API_URL_VAR: &str = "HORMIGAPP_API_URL";
pub const SESSION_FILE_VAR: &str = "HORMIGAPP_SESSION_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Every endpoint path is appended to this, prefix included.
    pub base_url: Url,
    pub session_file: PathBuf,
}

impl Config {
    /// Read `HORMIGAPP_API_URL` and `HORMIGAPP_SESSION_FILE`, falling back
    /// to the hosted backend and `~/.hormigapp/session.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let session_file = match lookup(SESSION_FILE_VAR) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file(lookup("HOME")),
        };

        Ok(Config {
            base_url: parse_base_url(&base_url)?,
            session_file,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    pub fn with_session_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.session_file = path.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL
                .parse()
                .expect("The default base URL is always valid"),
            session_file: default_session_file(std::env::var("HOME").ok()),
        }
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".hormigapp").join("session.json"),
        None => PathBuf::from(".hormigapp-session.json"),
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::BadBaseUrl {
        url: raw.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase(raw.to_string()));
    }

    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("\"{}\" is not a valid base URL", url)]
    BadBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("\"{0}\" can't have endpoint paths appended to it")]
    NotABase(String),
}
