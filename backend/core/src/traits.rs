use anyhow::Result;
use async_trait::async_trait;

use crate::schema::JsonSchema;
use crate::version::ChartVersion;

/// Supplies the values schema for a chart version.
///
/// `Ok(None)` means no schema is available for that version; callers degrade
/// to unfiltered output. Errors are propagated to the caller unchanged.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Human-readable name of this source (e.g., "directory", "memory").
    fn name(&self) -> &str;

    /// Fetch the schema for `version`.
    async fn fetch_schema(&self, version: &ChartVersion) -> Result<Option<JsonSchema>>;
}
