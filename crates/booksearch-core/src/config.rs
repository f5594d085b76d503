//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `booksearch.toml` +
//! `booksearch.<env>.toml` + `BOOKSEARCH_*` env vars. Provides helpers to
//! expand `~` and `${VAR}` and to resolve relative paths against a known base
//! directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::IndexName;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9200";
pub const DEFAULT_INDEX: &str = "books";
pub const ENV_PREFIX: &str = "BOOKSEARCH_";

/// Everything the runner and the connector need to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base address of the search service.
    pub endpoint: String,
    /// Discover cluster nodes from the endpoint before issuing requests.
    pub sniff: bool,
    /// Ping the endpoint once when the client is built.
    pub healthcheck: bool,
    /// Per-request timeout. Unset means the transport default (no timeout).
    pub timeout_secs: Option<u64>,
    /// Indexes to bootstrap and search, in order.
    pub indexes: Vec<String>,
    /// Directory holding the `mapping_<index>.json` files.
    pub mapping_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sniff: false,
            healthcheck: true,
            timeout_secs: None,
            indexes: vec![DEFAULT_INDEX.to_string()],
            mapping_dir: ".".to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.indexes.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one index must be configured".into(),
            ));
        }
        self.index_names().map(|_| ())
    }

    pub fn index_names(&self) -> Result<Vec<IndexName>> {
        self.indexes
            .iter()
            .map(|name| IndexName::new(name.as_str()))
            .collect()
    }

    /// Mapping directory after `~`/`$VAR` expansion, resolved against `base`.
    pub fn mapping_dir_in(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.mapping_dir)
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("booksearch.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("booksearch.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("booksearch.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("booksearch.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        Ok(Self::from_figment(figment))
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
