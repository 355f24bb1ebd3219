//! Host-owned adjuster settings.
//!
//! Loaded once (YAML file and/or environment) and shared read-only by every
//! adjuster instance.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const MAX_RESULT_WINDOW_ENV: &str = "OMNI_ADJUST_MAX_RESULT_WINDOW";
pub(crate) const GRAPH_URL_ENV: &str = "OMNI_ADJUST_GRAPH_URL";
pub(crate) const GRAPH_DATABASE_ENV: &str = "OMNI_ADJUST_GRAPH_DATABASE";
pub(crate) const GRAPH_USERNAME_ENV: &str = "OMNI_ADJUST_GRAPH_USERNAME";
pub(crate) const GRAPH_PASSWORD_ENV: &str = "OMNI_ADJUST_GRAPH_PASSWORD";
pub(crate) const ON_SOURCE_ERROR_ENV: &str = "OMNI_ADJUST_ON_SOURCE_ERROR";

/// Default `index.max_result_window` of the search engine.
pub const DEFAULT_MAX_RESULT_WINDOW: usize = 10_000;

/// What an adjuster does when the external source fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFailurePolicy {
    /// Treat the failure as an empty fact set.
    ///
    /// Exclude-mode filtering keeps every hit, include-mode keeps none,
    /// rescoring leaves scores untouched.
    #[default]
    FailOpen,
    /// Reject the request with [`crate::AdjustError::ExternalSource`].
    Reject,
}

impl SourceFailurePolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "fail-open" | "open" => Some(Self::FailOpen),
            "reject" | "fail_closed" | "fail-closed" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Neo4j transactional HTTP endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Base URL, scheme included (e.g. `http://localhost:7474`).
    pub url: String,
    /// Database name used in the commit path.
    pub database: String,
    /// Basic-auth user.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Per-request HTTP timeout (0 disables it).
    pub timeout_secs: u64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Settings shared by all adjusters of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjusterSettings {
    /// Upper bound for the upstream fetch size when `maxResultSize` is absent.
    pub max_result_window: usize,
    /// Behaviour on external source failure.
    pub on_source_error: SourceFailurePolicy,
    /// Graph endpoint.
    pub graph: GraphSettings,
}

impl Default for AdjusterSettings {
    fn default() -> Self {
        Self {
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
            on_source_error: SourceFailurePolicy::default(),
            graph: GraphSettings::default(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AdjusterSettings {
    /// Parse settings from YAML text; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is malformed.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("failed to parse adjuster settings yaml")
    }

    /// Load settings from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read adjuster settings: {}", path.display()))?;
        let mut settings = Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid adjuster settings: {}", path.display()))?;
        settings.apply_env_overrides();
        log::info!(
            "Loaded adjuster settings from {} (max_result_window={}, graph={})",
            path.display(),
            settings.max_result_window,
            settings.graph.url
        );
        Ok(settings)
    }

    /// Apply `OMNI_ADJUST_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(non_empty_env);
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(MAX_RESULT_WINDOW_ENV) {
            match raw.parse::<usize>() {
                Ok(value) => self.max_result_window = value,
                Err(_) => log::warn!("ignoring invalid {MAX_RESULT_WINDOW_ENV}={raw}"),
            }
        }
        if let Some(raw) = lookup(ON_SOURCE_ERROR_ENV) {
            match SourceFailurePolicy::parse(&raw) {
                Some(policy) => self.on_source_error = policy,
                None => log::warn!("ignoring invalid {ON_SOURCE_ERROR_ENV}={raw}"),
            }
        }
        if let Some(url) = lookup(GRAPH_URL_ENV) {
            self.graph.url = url;
        }
        if let Some(database) = lookup(GRAPH_DATABASE_ENV) {
            self.graph.database = database;
        }
        if let Some(username) = lookup(GRAPH_USERNAME_ENV) {
            self.graph.username = Some(username);
        }
        if let Some(password) = lookup(GRAPH_PASSWORD_ENV) {
            self.graph.password = Some(password);
        }
    }
}
