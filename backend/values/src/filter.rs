//! Schema-driven pruning of values documents.
//!
//! Walks a values mapping alongside its schema and keeps only the keys the
//! schema permits, at every depth. Scalars, sequences and nulls are kept
//! verbatim once their key is accepted; declared `type`s are not checked.

use helmkit_core::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{allows_additional_properties, property_schema, schema_properties};

/// Output of [`filter_values_with_schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFilterResult {
    pub filtered_values: Map<String, Value>,
    /// Dotted paths of dropped keys, in traversal order.
    pub removed_paths: Vec<String>,
    pub warnings: Vec<String>,
}

/// Prune `values` against `schema`.
///
/// In `strict` mode a key missing from the declared properties is dropped even
/// when the schema allows additional properties; otherwise such keys are kept
/// with a warning.
pub fn filter_values_with_schema(
    values: Map<String, Value>,
    schema: &JsonSchema,
    strict: bool,
) -> SchemaFilterResult {
    let mut removed_paths = Vec::new();
    let mut warnings = Vec::new();
    let filtered_values = filter_level(
        values,
        schema,
        "",
        strict,
        &mut removed_paths,
        &mut warnings,
    );
    SchemaFilterResult {
        filtered_values,
        removed_paths,
        warnings,
    }
}

fn filter_level(
    values: Map<String, Value>,
    schema: &JsonSchema,
    path: &str,
    strict: bool,
    removed_paths: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> Map<String, Value> {
    // No declared shape: free-form section.
    if schema.properties.is_none() && !schema.has_combinators() {
        return values;
    }

    let valid = schema_properties(schema);
    let allows_extra = allows_additional_properties(schema);
    let mut filtered = Map::new();

    for (key, value) in values {
        let key_path = join_path(path, &key);

        if valid.contains(key.as_str()) {
            let kept = match (value, property_schema(schema, &key)) {
                (Value::Object(child), Some(child_schema)) => Value::Object(filter_level(
                    child,
                    child_schema,
                    &key_path,
                    strict,
                    removed_paths,
                    warnings,
                )),
                (other, _) => other,
            };
            filtered.insert(key, kept);
        } else if allows_extra && !strict {
            warnings.push(format!(
                "Key '{key_path}' is not in schema but additionalProperties is allowed"
            ));
            filtered.insert(key, value);
        } else {
            removed_paths.push(key_path);
        }
    }

    filtered
}

/// Whether a dotted path is plausible under `schema`.
///
/// Returns `true` as soon as an unknown segment meets a level that allows
/// additional properties: this is "no evidence of invalidity", not proof.
pub fn is_path_valid_in_schema(schema: &JsonSchema, path: &str) -> bool {
    let mut current = schema;
    for segment in path.split('.') {
        if !schema_properties(current).contains(segment) {
            return allows_additional_properties(current);
        }
        match property_schema(current, segment) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(v: Value) -> JsonSchema {
        serde_json::from_value(v).unwrap()
    }

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    fn chart_schema() -> JsonSchema {
        schema(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "global": {
                    "type": "object",
                    "properties": {
                        "image": {
                            "type": "object",
                            "additionalProperties": false,
                            "properties": { "tag": { "type": "string" } }
                        }
                    }
                },
                "orchestration": {
                    "type": "object",
                    "properties": {
                        "zeebe": {
                            "type": "object",
                            "properties": {
                                "clusterSize": { "type": "integer" },
                                "env": { "type": "array" }
                            }
                        }
                    }
                },
                "extraObjects": { "type": "object" }
            }
        }))
    }

    #[test]
    fn removes_unknown_keys_at_every_depth() {
        let values = map(json!({
            "global": { "image": { "tag": "8.8.0", "digest": "sha256:x" } },
            "orchestration": { "zeebe": { "clusterSize": 3, "legacyFlag": true } },
            "bogus": 1
        }));
        let result = filter_values_with_schema(values, &chart_schema(), false);

        assert_eq!(
            Value::Object(result.filtered_values),
            json!({
                "global": { "image": { "tag": "8.8.0" } },
                "orchestration": { "zeebe": { "clusterSize": 3, "legacyFlag": true } }
            })
        );
        assert_eq!(result.removed_paths, vec!["bogus", "global.image.digest"]);
        assert_eq!(
            result.warnings,
            vec![
                "Key 'orchestration.zeebe.legacyFlag' is not in schema \
                 but additionalProperties is allowed"
            ]
        );
    }

    #[test]
    fn strict_mode_drops_extra_keys_without_warning() {
        let values = map(json!({
            "orchestration": { "zeebe": { "clusterSize": 3, "legacyFlag": true } }
        }));
        let result = filter_values_with_schema(values, &chart_schema(), true);

        assert_eq!(result.removed_paths, vec!["orchestration.zeebe.legacyFlag"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn shapeless_schema_keeps_everything() {
        let values = map(json!({ "anything": { "goes": [1, 2] }, "x": null }));
        let shapeless = schema(json!({ "type": "object" }));
        let result = filter_values_with_schema(values.clone(), &shapeless, true);
        assert_eq!(result.filtered_values, values);
        assert!(result.removed_paths.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn free_form_child_is_not_descended() {
        let values = map(json!({
            "extraObjects": { "kind": "ConfigMap", "data": { "a": "b" } }
        }));
        let result = filter_values_with_schema(values.clone(), &chart_schema(), true);
        assert_eq!(result.filtered_values, values);
    }

    #[test]
    fn accepted_keys_pass_through_without_type_checks() {
        // clusterSize is declared as integer and env as array; neither is enforced.
        let values = map(json!({
            "orchestration": { "zeebe": { "clusterSize": "three", "env": null } }
        }));
        let result = filter_values_with_schema(values.clone(), &chart_schema(), true);
        assert_eq!(result.filtered_values, values);
    }

    #[test]
    fn combinator_branches_contribute_keys() {
        let s = schema(json!({
            "additionalProperties": false,
            "properties": { "global": {} },
            "anyOf": [ {
                "properties": {
                    "optimize": { "additionalProperties": false, "properties": { "enabled": {} } }
                }
            } ]
        }));
        let values = map(json!({
            "global": {},
            "optimize": { "enabled": true, "junk": 1 },
            "nope": 0
        }));
        let result = filter_values_with_schema(values, &s, false);

        assert_eq!(
            Value::Object(result.filtered_values),
            json!({ "global": {}, "optimize": { "enabled": true } })
        );
        assert_eq!(result.removed_paths, vec!["nope", "optimize.junk"]);
    }

    #[test]
    fn boolean_subschemas_filter_as_open_and_closed() {
        let s = schema(json!({
            "additionalProperties": false,
            "properties": {
                "extraObjects": true,
                "retired": false,
                "zeebe": { "type": "object" }
            }
        }));
        let values = map(json!({
            "extraObjects": { "kind": "ConfigMap", "data": { "a": "b" } },
            "retired": { "enabled": true },
            "zeebe": { "clusterSize": 3 }
        }));
        let result = filter_values_with_schema(values, &s, true);

        assert_eq!(
            Value::Object(result.filtered_values),
            json!({
                "extraObjects": { "kind": "ConfigMap", "data": { "a": "b" } },
                "retired": {},
                "zeebe": { "clusterSize": 3 }
            })
        );
        assert_eq!(result.removed_paths, vec!["retired.enabled"]);
        assert!(is_path_valid_in_schema(&s, "extraObjects.anything.below"));
        assert!(!is_path_valid_in_schema(&s, "retired.enabled"));
    }

    #[test]
    fn filtering_is_idempotent() {
        let values = map(json!({
            "global": { "image": { "tag": "x", "digest": "y" } },
            "orchestration": { "zeebe": { "clusterSize": 3, "extra": {} } },
            "bogus": true
        }));
        for strict in [false, true] {
            let once = filter_values_with_schema(values.clone(), &chart_schema(), strict);
            let twice =
                filter_values_with_schema(once.filtered_values.clone(), &chart_schema(), strict);
            assert_eq!(twice.filtered_values, once.filtered_values);
            assert!(twice.removed_paths.is_empty());
        }
    }

    #[test]
    fn strict_removes_a_superset_of_permissive() {
        let values = map(json!({
            "global": { "image": { "tag": "x", "digest": "y" }, "custom": 1 },
            "orchestration": { "zeebe": { "extra": {} }, "operate": {} },
            "bogus": true
        }));
        let loose = filter_values_with_schema(values.clone(), &chart_schema(), false);
        let strict = filter_values_with_schema(values, &chart_schema(), true);

        for path in &loose.removed_paths {
            assert!(strict.removed_paths.contains(path), "{path}");
        }
        assert!(strict.removed_paths.len() > loose.removed_paths.len());
    }

    #[test]
    fn path_validity_walks_properties() {
        let s = chart_schema();
        assert!(is_path_valid_in_schema(&s, "global.image.tag"));
        assert!(is_path_valid_in_schema(&s, "orchestration.zeebe.clusterSize"));
        assert!(!is_path_valid_in_schema(&s, "bogus"));
        assert!(!is_path_valid_in_schema(&s, "global.image.digest"));
        // zeebe allows extra keys, so anything below it is optimistic.
        assert!(is_path_valid_in_schema(&s, "orchestration.zeebe.unknown.deeper"));
    }
}
