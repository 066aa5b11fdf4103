//! `helmkit-values` — chart values migration and schema filtering.
//!
//! Provides:
//! - Schema-driven pruning of values documents at every depth
//! - Migration between the legacy and unified (8.8+) chart layouts
//! - Layout detection and dry-run migration reports
//! - Rule-based validation with user-friendly messages
//! - In-memory and on-disk schema sources

pub mod filter;
pub mod migration;
pub mod schema;
pub mod settings;
pub mod source;
pub mod validation;

// Re-export most-used items at crate root.
pub use filter::{filter_values_with_schema, is_path_valid_in_schema, SchemaFilterResult};
pub use migration::{
    clean_empty_objects, detect_values_version, get_required_migrations, migrate_values,
    migrate_values_with_schema, MigrationResult, StructuralMigration, ValuesLayout,
    UNIFIED_COMPONENTS, UNIFIED_WRAPPER_KEY,
};
pub use schema::{
    allows_additional_properties, property_schema, schema_properties, valid_top_level_keys,
};
pub use settings::SchemaSourceSettings;
pub use source::{DirectorySchemaSource, FallbackSchemaSource, SchemaStore, SCHEMA_FILE_NAME};
pub use validation::{validate_values, ValidationIssue, ValidationReport};

pub use helmkit_core::{ChartVersion, HelmKitError, JsonSchema, SchemaSource};
