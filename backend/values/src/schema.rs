//! Navigation helpers over [`JsonSchema`].
//!
//! `allOf`/`anyOf`/`oneOf` are merged as plain unions: a key is known at a
//! level if the level itself or any combinator branch declares it.

use helmkit_core::{AdditionalProperties, JsonSchema};
use std::collections::BTreeSet;

/// Every property key declared at this level, combinator branches included.
pub fn schema_properties(schema: &JsonSchema) -> BTreeSet<&str> {
    let mut keys = BTreeSet::new();
    collect_properties(schema, &mut keys);
    keys
}

fn collect_properties<'a>(schema: &'a JsonSchema, out: &mut BTreeSet<&'a str>) {
    if let Some(props) = &schema.properties {
        out.extend(props.keys().map(String::as_str));
    }
    for branch in schema.combinators() {
        collect_properties(branch, out);
    }
}

/// Schema for a single property: direct properties first, then each
/// combinator branch in order. First match wins.
pub fn property_schema<'a>(schema: &'a JsonSchema, name: &str) -> Option<&'a JsonSchema> {
    if let Some(found) = schema.properties.as_ref().and_then(|p| p.get(name)) {
        return Some(found);
    }
    schema
        .combinators()
        .find_map(|branch| property_schema(branch, name))
}

/// `additionalProperties` defaults to permissive; only an explicit `false` forbids.
pub fn allows_additional_properties(schema: &JsonSchema) -> bool {
    !matches!(
        schema.additional_properties,
        Some(AdditionalProperties::Allowed(false))
    )
}

/// Keys permitted at the root of a values document, sorted.
pub fn valid_top_level_keys(schema: &JsonSchema) -> Vec<String> {
    schema_properties(schema)
        .into_iter()
        .map(str::to_string)
        .collect()
}
