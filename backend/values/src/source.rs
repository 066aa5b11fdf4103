//! Concrete [`SchemaSource`] implementations.
//!
//! - [`SchemaStore`]: caller-owned in-memory store
//! - [`DirectorySchemaSource`]: `values.schema.json` files laid out per chart version
//! - [`FallbackSchemaSource`]: primary source, then a secondary one

use anyhow::{Context, Result};
use async_trait::async_trait;
use helmkit_core::{ChartVersion, HelmKitError, JsonSchema, SchemaSource};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::settings::SchemaSourceSettings;

/// File name of the values schema inside a chart directory.
pub const SCHEMA_FILE_NAME: &str = "values.schema.json";

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory schemas keyed by chart version.
///
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct SchemaStore {
    schemas: Arc<RwLock<HashMap<ChartVersion, JsonSchema>>>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the schema for `version`.
    pub async fn insert(&self, version: ChartVersion, schema: JsonSchema) {
        self.schemas.write().await.insert(version, schema);
    }

    pub async fn remove(&self, version: &ChartVersion) -> Option<JsonSchema> {
        self.schemas.write().await.remove(version)
    }

    pub async fn get(&self, version: &ChartVersion) -> Option<JsonSchema> {
        self.schemas.read().await.get(version).cloned()
    }

    pub async fn contains(&self, version: &ChartVersion) -> bool {
        self.schemas.read().await.contains_key(version)
    }

    /// Stored versions, ascending.
    pub async fn versions(&self) -> Vec<ChartVersion> {
        let mut versions: Vec<_> = self.schemas.read().await.keys().copied().collect();
        versions.sort();
        versions
    }

    pub async fn len(&self) -> usize {
        self.schemas.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.schemas.read().await.is_empty()
    }
}

#[async_trait]
impl SchemaSource for SchemaStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_schema(&self, version: &ChartVersion) -> Result<Option<JsonSchema>> {
        Ok(self.get(version).await)
    }
}

// ---------------------------------------------------------------------------
// Directory source
// ---------------------------------------------------------------------------

/// Reads `<root>/<prefix><version>/values.schema.json`.
///
/// Parsed schemas are kept for the lifetime of the source; a missing file is
/// not remembered, so it is picked up once it appears.
#[derive(Debug, Clone)]
pub struct DirectorySchemaSource {
    root: PathBuf,
    chart_prefix: String,
    loaded: SchemaStore,
}

impl DirectorySchemaSource {
    pub fn new(root: impl Into<PathBuf>, chart_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            chart_prefix: chart_prefix.into(),
            loaded: SchemaStore::new(),
        }
    }

    pub fn from_settings(settings: &SchemaSourceSettings) -> Self {
        Self::new(&settings.schema_dir, &settings.chart_prefix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the schema file for `version`.
    pub fn schema_path(&self, version: &ChartVersion) -> PathBuf {
        self.root
            .join(format!("{}{}", self.chart_prefix, version))
            .join(SCHEMA_FILE_NAME)
    }

    async fn load(&self, path: &Path) -> Result<JsonSchema> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        let schema = serde_json::from_str(&raw).map_err(|e| HelmKitError::SchemaParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(schema)
    }
}

#[async_trait]
impl SchemaSource for DirectorySchemaSource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn fetch_schema(&self, version: &ChartVersion) -> Result<Option<JsonSchema>> {
        if let Some(schema) = self.loaded.get(version).await {
            debug!(version = %version, "Schema cache hit");
            return Ok(Some(schema));
        }

        let path = self.schema_path(version);
        let exists = fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check schema file: {}", path.display()))?;
        if !exists {
            debug!(path = %path.display(), "Schema file does not exist");
            return Ok(None);
        }

        let schema = self.load(&path).await?;
        info!(path = %path.display(), version = %version, "Loaded values schema");
        self.loaded.insert(*version, schema.clone()).await;
        Ok(Some(schema))
    }
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

/// Asks `primary` first and falls back to `secondary` when it has no schema.
pub struct FallbackSchemaSource {
    primary: Arc<dyn SchemaSource>,
    secondary: Arc<dyn SchemaSource>,
}

impl FallbackSchemaSource {
    pub fn new(primary: Arc<dyn SchemaSource>, secondary: Arc<dyn SchemaSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl SchemaSource for FallbackSchemaSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch_schema(&self, version: &ChartVersion) -> Result<Option<JsonSchema>> {
        if let Some(schema) = self.primary.fetch_schema(version).await? {
            return Ok(Some(schema));
        }
        debug!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            version = %version,
            "Falling back to secondary schema source"
        );
        self.secondary.fetch_schema(version).await
    }
}
