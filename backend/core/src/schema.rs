//! JSON-Schema subset used to describe chart values (`values.schema.json`).
//!
//! Only the keywords that drive key filtering are modelled. Everything else
//! (`$ref`, `$defs`, `default`, ...) is ignored on load. A boolean schema is
//! accepted wherever a schema is: `true` permits everything, `false` nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One level of a values schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SchemaRepr")]
pub struct JsonSchema {
    /// Declared type tag. Never checked against values by the filter.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared child keys. `None` and an empty map behave differently:
    /// a schema without `properties` permits every key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,

    /// Defaults to permissive when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<JsonSchema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<JsonSchema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<JsonSchema>,
}

/// `type` may be a single tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// `additionalProperties` is either a flag or a schema for the extra keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<JsonSchema>),
}

/// Wire form of a schema: an object or a boolean.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaRepr {
    Bool(bool),
    Object(Box<SchemaObject>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaObject {
    #[serde(rename = "type", default)]
    schema_type: Option<SchemaType>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(default)]
    additional_properties: Option<AdditionalProperties>,
    #[serde(default)]
    items: Option<Box<JsonSchema>>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    all_of: Vec<JsonSchema>,
    #[serde(default)]
    any_of: Vec<JsonSchema>,
    #[serde(default)]
    one_of: Vec<JsonSchema>,
}

impl From<SchemaRepr> for JsonSchema {
    fn from(repr: SchemaRepr) -> Self {
        match repr {
            SchemaRepr::Bool(true) => JsonSchema::default(),
            SchemaRepr::Bool(false) => JsonSchema::deny_all(),
            SchemaRepr::Object(object) => {
                let SchemaObject {
                    schema_type,
                    description,
                    properties,
                    additional_properties,
                    items,
                    required,
                    all_of,
                    any_of,
                    one_of,
                } = *object;
                JsonSchema {
                    schema_type,
                    description,
                    properties,
                    additional_properties,
                    items,
                    required,
                    all_of,
                    any_of,
                    one_of,
                }
            }
        }
    }
}

impl JsonSchema {
    /// Schema that accepts no keys at all (the `false` schema).
    pub fn deny_all() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            additional_properties: Some(AdditionalProperties::Allowed(false)),
            ..Default::default()
        }
    }

    /// Schema with the given object properties and nothing else.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonSchema)>,
        K: Into<String>,
    {
        Self {
            schema_type: Some(SchemaType::Single("object".to_string())),
            properties: Some(
                properties
                    .into_iter()
                    .map(|(k, v)| (k.into(), v))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Leaf schema carrying only a type tag.
    pub fn typed(tag: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(tag.to_string())),
            ..Default::default()
        }
    }

    /// Builder-style setter for `additionalProperties: <bool>`.
    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(AdditionalProperties::Allowed(allowed));
        self
    }

    /// All `allOf`/`anyOf`/`oneOf` branches, in that order.
    pub fn combinators(&self) -> impl Iterator<Item = &JsonSchema> {
        self.all_of.iter().chain(self.any_of.iter()).chain(self.one_of.iter())
    }

    pub fn has_combinators(&self) -> bool {
        !(self.all_of.is_empty() && self.any_of.is_empty() && self.one_of.is_empty())
    }
}
