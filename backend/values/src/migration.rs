//! Values migration between the legacy and unified chart layouts.
//!
//! Charts before 8.8 keep the orchestration components (`zeebe`,
//! `zeebeGateway`, `operate`, `tasklist`) at the top level; 8.8+ nests them
//! under `orchestration`. A migration runs three stages in order:
//!
//! 1. structural: move components in or out of the wrapper key
//! 2. schema: strictly filter against the target version's schema, if any
//! 3. cleanup: drop mappings left empty, bottom-up

use anyhow::Result;
use helmkit_core::{ChartVersion, SchemaSource};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::filter::filter_values_with_schema;
use crate::validation::{is_truthy, validate_values, ValidationReport};

/// Wrapper key for the components in the unified layout.
pub const UNIFIED_WRAPPER_KEY: &str = "orchestration";

/// Components that move under [`UNIFIED_WRAPPER_KEY`] from 8.8 onwards.
pub const UNIFIED_COMPONENTS: [&str; 4] = ["zeebe", "zeebeGateway", "operate", "tasklist"];

/// Layout detected from the shape of a values document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValuesLayout {
    /// Components at the top level (before 8.8).
    Legacy,
    /// Components under the wrapper key (8.8+).
    Unified,
    Unknown,
}

/// Output of [`migrate_values_with_schema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub values: Map<String, Value>,
    pub changes: Vec<String>,
    pub removed_paths: Vec<String>,
    pub warnings: Vec<String>,
    /// Rule-based report for the target version. Informational only.
    pub validation: ValidationReport,
    /// Whether a target schema was available and applied.
    pub schema_used: bool,
}

/// Output of [`migrate_values`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralMigration {
    pub values: Map<String, Value>,
    pub changes: Vec<String>,
    pub warnings: Vec<String>,
    pub validation: ValidationReport,
}

/// Migrate `values` from `from` to `to`, filtering against the target schema.
///
/// A missing schema is not an error: the result carries a warning and
/// `schema_used == false`. Errors from `source` are returned as-is.
pub async fn migrate_values_with_schema<S>(
    values: Map<String, Value>,
    from: &ChartVersion,
    to: &ChartVersion,
    source: &S,
) -> Result<MigrationResult>
where
    S: SchemaSource + ?Sized,
{
    let mut changes = Vec::new();
    let mut warnings = Vec::new();

    let mut values = apply_structural_migration(values, from, to, &mut changes, &mut warnings);

    let mut removed_paths = Vec::new();
    let schema_used = match source.fetch_schema(to).await? {
        Some(schema) => {
            let filtered = filter_values_with_schema(values, &schema, true);
            debug!(
                source = source.name(),
                version = %to,
                removed = filtered.removed_paths.len(),
                "Applied target schema"
            );
            values = filtered.filtered_values;
            for path in &filtered.removed_paths {
                changes.push(format!(
                    "Removed '{path}' (not valid in chart version {to} schema)"
                ));
            }
            removed_paths = filtered.removed_paths;
            warnings.extend(filtered.warnings);
            true
        }
        None => {
            warn!(
                source = source.name(),
                version = %to,
                "No schema available; skipping schema validation"
            );
            warnings.push(format!(
                "Could not fetch schema for version {to}, skipping schema validation"
            ));
            false
        }
    };

    apply_cleanup(&mut values, to);

    let validation = validate_values(&values, to);
    info!(
        from = %from,
        to = %to,
        changes = changes.len(),
        schema_used,
        "Migrated values"
    );

    Ok(MigrationResult {
        values,
        changes,
        removed_paths,
        warnings,
        validation,
        schema_used,
    })
}

/// Migrate `values` without a schema: structural stage and cleanup only.
pub fn migrate_values(
    values: Map<String, Value>,
    from: &ChartVersion,
    to: &ChartVersion,
) -> StructuralMigration {
    let mut changes = Vec::new();
    let mut warnings = Vec::new();

    let mut values = apply_structural_migration(values, from, to, &mut changes, &mut warnings);
    apply_cleanup(&mut values, to);
    let validation = validate_values(&values, to);

    StructuralMigration {
        values,
        changes,
        warnings,
        validation,
    }
}

fn apply_structural_migration(
    mut values: Map<String, Value>,
    from: &ChartVersion,
    to: &ChartVersion,
    changes: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> Map<String, Value> {
    match (from.uses_unified_layout(), to.uses_unified_layout()) {
        (false, true) => {
            for name in UNIFIED_COMPONENTS {
                move_into_wrapper(&mut values, name, changes, warnings);
            }
            info!(from = %from, to = %to, "Moved components under '{UNIFIED_WRAPPER_KEY}'");
        }
        (true, false) => {
            move_out_of_wrapper(&mut values, changes);
            info!(from = %from, to = %to, "Moved components out of '{UNIFIED_WRAPPER_KEY}'");
        }
        _ => debug!(from = %from, to = %to, "Same layout; no structural changes"),
    }
    values
}

/// legacy -> unified for one component. Non-mapping values stay where they are.
fn move_into_wrapper(
    values: &mut Map<String, Value>,
    name: &str,
    changes: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    if !matches!(values.get(name), Some(Value::Object(_))) {
        return;
    }

    match values.get(UNIFIED_WRAPPER_KEY) {
        Some(Value::Object(_)) => {}
        Some(existing) if is_truthy(existing) => {
            warnings.push(format!(
                "Cannot move '{name}' under '{UNIFIED_WRAPPER_KEY}': \
                 existing '{UNIFIED_WRAPPER_KEY}' is not a mapping"
            ));
            return;
        }
        _ => {
            values.insert(UNIFIED_WRAPPER_KEY.to_string(), Value::Object(Map::new()));
        }
    }

    if let Some(component) = values.remove(name) {
        if let Some(Value::Object(wrapper)) = values.get_mut(UNIFIED_WRAPPER_KEY) {
            wrapper.insert(name.to_string(), component);
            changes.push(format!("Moved '{name}' -> '{UNIFIED_WRAPPER_KEY}.{name}'"));
        }
    }
}

/// unified -> legacy for every component, then drop an emptied wrapper.
fn move_out_of_wrapper(values: &mut Map<String, Value>, changes: &mut Vec<String>) {
    let Some(Value::Object(wrapper)) = values.get_mut(UNIFIED_WRAPPER_KEY) else {
        return;
    };

    let mut moved = Vec::new();
    for name in UNIFIED_COMPONENTS {
        if matches!(wrapper.get(name), Some(Value::Object(_))) {
            if let Some(component) = wrapper.remove(name) {
                moved.push((name, component));
            }
        }
    }
    let emptied = wrapper.is_empty();

    for (name, component) in moved {
        values.insert(name.to_string(), component);
        changes.push(format!("Moved '{UNIFIED_WRAPPER_KEY}.{name}' -> '{name}'"));
    }

    if emptied {
        values.remove(UNIFIED_WRAPPER_KEY);
        changes.push(format!("Removed empty '{UNIFIED_WRAPPER_KEY}' section"));
    }
}

/// Recursively remove mappings with no keys, innermost first, and return how
/// many were removed. Sequences are not descended into.
pub fn clean_empty_objects(values: &mut Map<String, Value>) -> usize {
    let mut removed = 0;
    values.retain(|_, value| match value {
        Value::Object(child) => {
            removed += clean_empty_objects(child);
            let keep = !child.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        }
        _ => true,
    });
    removed
}

fn apply_cleanup(values: &mut Map<String, Value>, to: &ChartVersion) {
    let removed = clean_empty_objects(values);
    debug!(version = %to, removed, "Removed empty mappings");
}

/// Detect the layout of a values document from its shape alone.
///
/// The wrapper key is checked first, so a document with both signals is
/// reported as unified.
pub fn detect_values_version(values: &Map<String, Value>) -> ValuesLayout {
    let present = |key: &str| values.get(key).is_some_and(is_truthy);

    if present(UNIFIED_WRAPPER_KEY) {
        ValuesLayout::Unified
    } else if UNIFIED_COMPONENTS.iter().any(|name| present(*name)) {
        ValuesLayout::Legacy
    } else {
        ValuesLayout::Unknown
    }
}

/// The moves the structural stage would perform, without performing them.
pub fn get_required_migrations(
    values: &Map<String, Value>,
    from: &ChartVersion,
    to: &ChartVersion,
) -> Vec<String> {
    match (from.uses_unified_layout(), to.uses_unified_layout()) {
        (false, true) => {
            let wrapper_blocked = values
                .get(UNIFIED_WRAPPER_KEY)
                .is_some_and(|w| is_truthy(w) && !w.is_object());
            if wrapper_blocked {
                return Vec::new();
            }
            UNIFIED_COMPONENTS
                .iter()
                .filter(|name| matches!(values.get(**name), Some(Value::Object(_))))
                .map(|name| format!("{name} -> {UNIFIED_WRAPPER_KEY}.{name}"))
                .collect()
        }
        (true, false) => {
            let Some(Value::Object(wrapper)) = values.get(UNIFIED_WRAPPER_KEY) else {
                return Vec::new();
            };
            UNIFIED_COMPONENTS
                .iter()
                .filter(|name| matches!(wrapper.get(**name), Some(Value::Object(_))))
                .map(|name| format!("{UNIFIED_WRAPPER_KEY}.{name} -> {name}"))
                .collect()
        }
        _ => Vec::new(),
    }
}
