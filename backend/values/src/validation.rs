//! Rule-based values validation with user-friendly messages.
//!
//! These rules encode fixed platform knowledge (which top-level sections exist
//! per layout, sane replica and resource settings) and are independent of any
//! fetched schema, so they can disagree with it.

use helmkit_core::ChartVersion;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::migration::{UNIFIED_COMPONENTS, UNIFIED_WRAPPER_KEY};

/// Top-level sections of a legacy-layout values file.
pub const LEGACY_TOP_LEVEL_KEYS: &[&str] = &[
    "global",
    "zeebe",
    "zeebeGateway",
    "operate",
    "tasklist",
    "optimize",
    "identity",
    "webModeler",
    "connectors",
    "console",
    "elasticsearch",
    "postgresql",
    "retentionPolicy",
];

/// Top-level sections of a unified-layout values file.
pub const UNIFIED_TOP_LEVEL_KEYS: &[&str] = &[
    "global",
    "orchestration",
    "optimize",
    "identity",
    "webModeler",
    "connectors",
    "console",
    "elasticsearch",
    "postgresql",
    "retentionPolicy",
];

/// Legacy sections whose bodies get component checks.
const LEGACY_COMPONENT_SECTIONS: &[&str] = &[
    "zeebe",
    "zeebeGateway",
    "operate",
    "tasklist",
    "optimize",
    "identity",
    "webModeler",
    "connectors",
    "console",
];

/// Components checked under the wrapper in the unified layout.
const UNIFIED_COMPONENT_SECTIONS: &[&str] = &["zeebe", "operate", "tasklist"];

const RESOURCE_KEYS: &[&str] = &["cpu", "memory", "ephemeral-storage"];

const PULL_POLICIES: &[&str] = &["Always", "IfNotPresent", "Never"];

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            expected: None,
            actual: None,
            suggestion: None,
        }
    }

    fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    fn actual(mut self, actual: &Value) -> Self {
        self.actual = Some(actual.clone());
        self
    }

    fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Errors and warnings found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    fn warn(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}

/// Validate a values document for `version` and return every finding.
pub fn validate_values(values: &Map<String, Value>, version: &ChartVersion) -> ValidationReport {
    let mut report = ValidationReport::default();
    let unified = version.uses_unified_layout();

    validate_top_level_keys(values, version, &mut report);

    if let Some(Value::Object(global)) = values.get("global") {
        validate_global(global, &mut report);
    }

    if unified {
        validate_unified_sections(values, &mut report);
    } else {
        validate_legacy_sections(values, &mut report);
    }

    check_common_misconfigurations(values, unified, &mut report);
    report
}

fn validate_top_level_keys(
    values: &Map<String, Value>,
    version: &ChartVersion,
    report: &mut ValidationReport,
) {
    let unified = version.uses_unified_layout();
    let expected = if unified {
        UNIFIED_TOP_LEVEL_KEYS
    } else {
        LEGACY_TOP_LEVEL_KEYS
    };

    for key in values.keys() {
        let key = key.as_str();
        if expected.contains(&key) {
            continue;
        }
        let legacy_only =
            LEGACY_TOP_LEVEL_KEYS.contains(&key) && !UNIFIED_TOP_LEVEL_KEYS.contains(&key);
        let unified_only =
            UNIFIED_TOP_LEVEL_KEYS.contains(&key) && !LEGACY_TOP_LEVEL_KEYS.contains(&key);

        if unified && legacy_only {
            report.error(
                ValidationIssue::new(
                    key,
                    format!(
                        "Key '{key}' is not valid for chart version {version}. \
                         This appears to be a pre-8.8 configuration key."
                    ),
                )
                .expected(format!(
                    "Chart version 8.8+ uses '{UNIFIED_WRAPPER_KEY}' \
                     instead of individual component keys"
                )),
            );
        } else if !unified && unified_only {
            report.error(
                ValidationIssue::new(
                    key,
                    format!(
                        "Key '{key}' is not valid for chart version {version}. \
                         This appears to be a 8.8+ configuration key."
                    ),
                )
                .expected(format!(
                    "Chart versions before 8.8 use individual component keys ({})",
                    UNIFIED_COMPONENTS.join(", ")
                )),
            );
        } else {
            report.warn(
                ValidationIssue::new(key, format!("Unknown top-level key '{key}'"))
                    .suggestion("Verify this key is valid for your chart version"),
            );
        }
    }
}

fn validate_global(global: &Map<String, Value>, report: &mut ValidationReport) {
    if let Some(Value::Object(image)) = global.get("image") {
        if let Some(tag) = image.get("tag").filter(|t| is_truthy(t)) {
            if !tag.is_string() {
                report.error(
                    ValidationIssue::new("global.image.tag", "Image tag must be a string")
                        .expected("string")
                        .actual(tag),
                );
            }
        }
    }

    let auth = global
        .get("identity")
        .and_then(Value::as_object)
        .and_then(|identity| identity.get("auth"))
        .and_then(Value::as_object);
    if let Some(auth) = auth {
        let enabled = auth.get("enabled") == Some(&Value::Bool(true));
        let has_issuer = auth.get("issuer").is_some_and(is_truthy)
            || auth.get("publicIssuerUrl").is_some_and(is_truthy);
        if enabled && !has_issuer {
            report.warn(
                ValidationIssue::new(
                    "global.identity.auth",
                    "Identity auth is enabled but no issuer URL is configured",
                )
                .suggestion("Set global.identity.auth.publicIssuerUrl for production deployments"),
            );
        }
    }
}

fn validate_unified_sections(values: &Map<String, Value>, report: &mut ValidationReport) {
    let wrapper = match values.get(UNIFIED_WRAPPER_KEY) {
        Some(v) if is_truthy(v) => v,
        _ => {
            report.warn(
                ValidationIssue::new(UNIFIED_WRAPPER_KEY, "No orchestration configuration found")
                    .suggestion(
                        "Add orchestration section for Zeebe, Operate, and Tasklist configuration",
                    ),
            );
            return;
        }
    };
    let Value::Object(wrapper) = wrapper else {
        return;
    };

    for name in UNIFIED_COMPONENT_SECTIONS {
        if let Some(Value::Object(component)) = wrapper.get(*name) {
            validate_component(&format!("{UNIFIED_WRAPPER_KEY}.{name}"), component, report);
        }
    }
}

fn validate_legacy_sections(values: &Map<String, Value>, report: &mut ValidationReport) {
    for name in LEGACY_COMPONENT_SECTIONS {
        if let Some(Value::Object(component)) = values.get(*name) {
            validate_component(name, component, report);
        }
    }
}

fn validate_component(path: &str, component: &Map<String, Value>, report: &mut ValidationReport) {
    if let Some(replicas) = component.get("replicas") {
        let ok = replicas.as_f64().is_some_and(|n| n >= 0.0);
        if !ok {
            report.error(
                ValidationIssue::new(
                    format!("{path}.replicas"),
                    "Replicas must be a non-negative number",
                )
                .expected("number >= 0")
                .actual(replicas),
            );
        }
    }

    if let Some(Value::Object(resources)) = component.get("resources") {
        for section in ["requests", "limits"] {
            if let Some(spec) = resources.get(section) {
                validate_resource_spec(&format!("{path}.resources.{section}"), spec, report);
            }
        }
    }

    if let Some(Value::Object(image)) = component.get("image") {
        if let Some(policy) = image.get("pullPolicy").filter(|p| is_truthy(p)) {
            let known = policy.as_str().is_some_and(|p| PULL_POLICIES.contains(&p));
            if !known {
                report.error(
                    ValidationIssue::new(format!("{path}.image.pullPolicy"), "Invalid pullPolicy")
                        .expected(PULL_POLICIES.join(" | "))
                        .actual(policy),
                );
            }
        }
    }
}

fn validate_resource_spec(path: &str, spec: &Value, report: &mut ValidationReport) {
    if !is_truthy(spec) {
        return;
    }
    let Value::Object(spec) = spec else {
        report.error(
            ValidationIssue::new(path, "Resource specification must be an object")
                .expected("object")
                .actual(spec),
        );
        return;
    };

    for key in spec.keys() {
        if !RESOURCE_KEYS.contains(&key.as_str()) {
            report.error(
                ValidationIssue::new(
                    format!("{path}.{key}"),
                    format!("Unknown resource type '{key}'"),
                )
                .expected(RESOURCE_KEYS.join(" | ")),
            );
        }
    }
}

fn check_common_misconfigurations(
    values: &Map<String, Value>,
    unified: bool,
    report: &mut ValidationReport,
) {
    let elasticsearch = values
        .get("global")
        .and_then(Value::as_object)
        .and_then(|g| g.get("elasticsearch"))
        .and_then(Value::as_object);
    if let Some(es) = elasticsearch {
        if es.get("enabled") == Some(&Value::Bool(false)) {
            let has_external =
                es.get("host").is_some_and(is_truthy) || es.get("url").is_some_and(is_truthy);
            let has_opensearch = values.get("opensearch").is_some_and(is_truthy);
            if !has_external && !has_opensearch {
                report.warn(
                    ValidationIssue::new(
                        "global.elasticsearch",
                        "Elasticsearch is disabled but no external search backend configured",
                    )
                    .suggestion(
                        "Configure global.elasticsearch.host for external ES, \
                         or enable built-in Elasticsearch",
                    ),
                );
            }
        }
    }

    let (zeebe_path, zeebe) = if unified {
        let zeebe = values
            .get(UNIFIED_WRAPPER_KEY)
            .and_then(Value::as_object)
            .and_then(|w| w.get("zeebe"));
        (format!("{UNIFIED_WRAPPER_KEY}.zeebe"), zeebe)
    } else {
        ("zeebe".to_string(), values.get("zeebe"))
    };
    let Some(Value::Object(zeebe)) = zeebe else {
        return;
    };

    let number = |key: &str| zeebe.get(key).and_then(Value::as_f64);
    let cluster_size = number("clusterSize");
    let replicas = number("replicas");
    let replication_factor = number("replicationFactor");

    if cluster_size == Some(1.0) || replicas == Some(1.0) {
        report.warn(
            ValidationIssue::new(
                zeebe_path.clone(),
                "Single-node Zeebe cluster configured - not recommended for production",
            )
            .suggestion("Use at least 3 replicas with replicationFactor 3 for high availability"),
        );
    }

    if let (Some(rf), Some(size)) = (replication_factor, cluster_size) {
        if rf != 0.0 && size != 0.0 && rf > size {
            let mut issue = ValidationIssue::new(
                zeebe_path,
                "Replication factor cannot be greater than cluster size",
            )
            .expected(format!("replicationFactor <= clusterSize ({size})"));
            if let Some(raw) = zeebe.get("replicationFactor") {
                issue = issue.actual(raw);
            }
            report.error(issue);
        }
    }
}

/// JavaScript-style truthiness: null, false, 0 and "" count as unset.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(s: &str) -> ChartVersion {
        s.parse().unwrap()
    }

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_document_is_valid_for_legacy() {
        let report = validate_values(&Map::new(), &v("8.7"));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unified_without_wrapper_warns() {
        let report = validate_values(&Map::new(), &v("8.8"));
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "orchestration");
    }

    #[test]
    fn replication_factor_above_cluster_size() {
        let values = map(json!({ "zeebe": { "clusterSize": 1, "replicationFactor": 3 } }));
        let report = validate_values(&values, &v("8.7"));

        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "zeebe");
        assert_eq!(
            report.errors[0].message,
            "Replication factor cannot be greater than cluster size"
        );
        assert_eq!(report.errors[0].actual, Some(json!(3)));
        assert_eq!(
            report.errors[0].expected.as_deref(),
            Some("replicationFactor <= clusterSize (1)")
        );
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("Single-node Zeebe cluster")));
    }

    #[test]
    fn cluster_heuristics_use_wrapper_path_when_unified() {
        let values = map(json!({
            "orchestration": {
                "zeebe": { "clusterSize": 2, "replicationFactor": 3, "replicas": 1 }
            }
        }));
        let report = validate_values(&values, &v("8.8"));
        assert_eq!(report.errors[0].path, "orchestration.zeebe");
        assert_eq!(report.warnings[0].path, "orchestration.zeebe");
    }

    #[test]
    fn keys_from_the_other_layout_are_errors() {
        let report = validate_values(&map(json!({ "zeebe": {} })), &v("8.8"));
        assert_eq!(report.errors[0].path, "zeebe");
        assert!(report.errors[0].message.contains("pre-8.8"));

        let report = validate_values(&map(json!({ "orchestration": {} })), &v("8.6"));
        assert_eq!(report.errors[0].path, "orchestration");
        assert!(report.errors[0].message.contains("8.8+"));
    }

    #[test]
    fn unknown_top_level_key_is_a_warning() {
        let report = validate_values(&map(json!({ "whatever": 1 })), &v("8.7"));
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].message, "Unknown top-level key 'whatever'");
    }

    #[test]
    fn component_checks() {
        let values = map(json!({
            "operate": {
                "replicas": -1,
                "resources": {
                    "requests": { "cpu": "1", "gpu": "1" },
                    "limits": "2Gi"
                },
                "image": { "pullPolicy": "Sometimes" }
            }
        }));
        let report = validate_values(&values, &v("8.7"));
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "operate.replicas",
                "operate.resources.requests.gpu",
                "operate.resources.limits",
                "operate.image.pullPolicy",
            ]
        );
        assert_eq!(report.errors[0].actual, Some(json!(-1)));
    }

    #[test]
    fn non_numeric_replicas_is_error() {
        let values = map(json!({ "orchestration": { "tasklist": { "replicas": "2" } } }));
        let report = validate_values(&values, &v("8.8"));
        assert_eq!(report.errors[0].path, "orchestration.tasklist.replicas");
    }

    #[test]
    fn global_section_checks() {
        let values = map(json!({
            "global": {
                "image": { "tag": 8.7 },
                "identity": { "auth": { "enabled": true } },
                "elasticsearch": { "enabled": false }
            }
        }));
        let report = validate_values(&values, &v("8.7"));
        assert_eq!(report.errors[0].path, "global.image.tag");
        let warned: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(warned, vec!["global.identity.auth", "global.elasticsearch"]);
    }

    #[test]
    fn external_search_backend_silences_warning() {
        let values = map(json!({
            "global": { "elasticsearch": { "enabled": false, "url": "https://es:9200" } }
        }));
        assert!(validate_values(&values, &v("8.7")).warnings.is_empty());
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy}");
        }
        for truthy in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy}");
        }
    }
}
