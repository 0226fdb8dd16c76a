//! TOML configuration parsing and validation.
//!
//! ```toml
//! mode = "development"            # "production" disables ingest
//!
//! [corpus]
//! path = "./public/horcrux.json"
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! static_route = "/horcrux.json"
//!
//! [retrieval]
//! remote_base = "https://mcp.example.com"   # optional
//! static_url = "http://127.0.0.1:3000/horcrux.json"   # optional
//! timeout_secs = 5
//! ```
//!
//! After parsing, the environment variables `HORCRUX_MODE`, `HORCRUX_JSON`,
//! and `HORCRUX_MCP_BASE` override `mode`, `corpus.path`, and
//! `retrieval.remote_base` respectively.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_MODE: &str = "HORCRUX_MODE";
pub const ENV_CORPUS_PATH: &str = "HORCRUX_JSON";
pub const ENV_REMOTE_BASE: &str = "HORCRUX_MCP_BASE";

/// Routes owned by the server that the static route must not shadow.
const RESERVED_ROUTES: &[&str] = &["/api/ingest", "/health"];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mode: DeploymentMode,
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Deployment-wide switch. `Production` disables the append operation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Development,
    Production,
}

impl DeploymentMode {
    pub fn ingest_enabled(self) -> bool {
        self == DeploymentMode::Development
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentMode::Development),
            "production" | "prod" => Ok(DeploymentMode::Production),
            other => bail!(
                "Unknown mode: '{}'. Must be development or production.",
                other
            ),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Development => write!(f, "development"),
            DeploymentMode::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_route")]
    pub static_route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_route: default_static_route(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_static_route() -> String {
    "/horcrux.json".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub remote_base: Option<String>,
    #[serde(default)]
    pub static_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            remote_base: None,
            static_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    /// A development config pointing at `path`, with every other setting
    /// at its default.
    pub fn for_corpus(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: DeploymentMode::default(),
            corpus: CorpusConfig { path: path.into() },
            server: ServerConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// An empty `HORCRUX_MCP_BASE` unsets the remote base.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup(ENV_MODE) {
        config.mode = DeploymentMode::parse(&mode)?;
    }
    if let Some(path) = lookup(ENV_CORPUS_PATH).filter(|p| !p.trim().is_empty()) {
        config.corpus.path = PathBuf::from(path.trim());
    }
    if let Some(base) = lookup(ENV_REMOTE_BASE) {
        let base = base.trim();
        config.retrieval.remote_base = if base.is_empty() {
            None
        } else {
            Some(base.to_string())
        };
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<()> {
    if config.corpus.path.as_os_str().is_empty() {
        bail!("corpus.path must not be empty");
    }

    let route = &config.server.static_route;
    if !route.starts_with('/') || route.len() < 2 {
        bail!("server.static_route must start with '/' and name a path");
    }
    if route.contains([':', '*', '{', '}']) {
        bail!(
            "server.static_route must be a literal path without ':', '*', '{{' or '}}', got '{}'",
            route
        );
    }
    if RESERVED_ROUTES.contains(&route.as_str()) {
        bail!("server.static_route must not be {}", route);
    }

    if config.retrieval.timeout_secs == 0 {
        bail!("retrieval.timeout_secs must be > 0");
    }
    for (key, value) in [
        ("retrieval.remote_base", &config.retrieval.remote_base),
        ("retrieval.static_url", &config.retrieval.static_url),
    ] {
        if let Some(url) = value {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{} must be an http:// or https:// URL, got '{}'", key, url);
            }
        }
    }

    Ok(())
}
