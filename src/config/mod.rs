//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults,
//! so the binary runs out of the box against the live site. `Config::from_env`
//! performs the loading; validation hooks can grow into `ConfigError` later.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names. Keeping them public lets tests and deployment
/// scripts refer to them directly.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_SITE_ORIGIN: &str = "SITE_ORIGIN";
pub const ENV_SUBJECT_TOPIC_CAP: &str = "SUBJECT_TOPIC_CAP";
pub const ENV_EXPAND_SETTLE_MS: &str = "EXPAND_SETTLE_MS";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SITE_ORIGIN: &str = "https://www.sanfoundry.com";
const DEFAULT_SUBJECT_TOPIC_CAP: usize = 10;
const DEFAULT_EXPAND_SETTLE_MS: u64 = 750;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    site_origin: String,
    subject_topic_cap: usize,
    expand_settle_ms: u64,
    chrome_executable: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let site_origin =
            env::var(ENV_SITE_ORIGIN).unwrap_or_else(|_| DEFAULT_SITE_ORIGIN.to_string());
        let subject_topic_cap = parse_env(ENV_SUBJECT_TOPIC_CAP, DEFAULT_SUBJECT_TOPIC_CAP)?;
        let expand_settle_ms = parse_env(ENV_EXPAND_SETTLE_MS, DEFAULT_EXPAND_SETTLE_MS)?;
        let chrome_executable = env::var(ENV_CHROME_EXECUTABLE).ok();

        if url::Url::parse(&site_origin).is_err() {
            return Err(ConfigError::InvalidValue {
                field: ENV_SITE_ORIGIN,
                reason: format!("not a valid URL: {site_origin}"),
            });
        }

        Ok(Self {
            bind_addr,
            site_origin,
            subject_topic_cap,
            expand_settle_ms,
            chrome_executable,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Base origin of the scraped site, used to absolutize relative image
    /// sources and to recognize same-site topic links.
    pub fn site_origin(&self) -> &str {
        &self.site_origin
    }
    /// Maximum number of topics scraped from a subject index page.
    pub fn subject_topic_cap(&self) -> usize {
        self.subject_topic_cap
    }
    /// Settle delay after force-expanding collapsible sections.
    pub fn expand_settle_ms(&self) -> u64 {
        self.expand_settle_ms
    }
    /// Explicit Chrome/Chromium binary path; autodetected when absent.
    pub fn chrome_executable(&self) -> Option<&str> {
        self.chrome_executable.as_deref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            subject_topic_cap: DEFAULT_SUBJECT_TOPIC_CAP,
            expand_settle_ms: DEFAULT_EXPAND_SETTLE_MS,
            chrome_executable: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            field: key,
            reason: format!("cannot parse '{raw}'"),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
