use serde::Deserialize;
use std::path::PathBuf;

/// Default chart directory prefix; version 8.8 resolves to `camunda-platform-8.8/`.
pub const DEFAULT_CHART_PREFIX: &str = "camunda-platform-";

/// Settings for locating schemas on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaSourceSettings {
    /// Root holding one directory per chart version
    pub schema_dir: PathBuf,
    /// Prefix of each chart directory name
    pub chart_prefix: String,
}

impl Default for SchemaSourceSettings {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            chart_prefix: DEFAULT_CHART_PREFIX.to_string(),
        }
    }
}

impl SchemaSourceSettings {
    /// Load settings from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit lookup (useful for testing).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            schema_dir: lookup("HELMKIT_SCHEMA_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_schema_dir),
            chart_prefix: lookup("HELMKIT_CHART_PREFIX")
                .unwrap_or_else(|| DEFAULT_CHART_PREFIX.to_string()),
        }
    }
}

/// `~/.helmkit/schemas`, or `.helmkit/schemas` when there is no home directory.
fn default_schema_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".helmkit").join("schemas"),
        None => PathBuf::from(".helmkit").join("schemas"),
    }
}
