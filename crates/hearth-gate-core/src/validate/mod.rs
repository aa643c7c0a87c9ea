// hearth-gate-core/src/validate/mod.rs
// ============================================================================
// Module: Payload Validators
// Description: Per-kind structural and semantic payload validation.
// Purpose: Accept or reject create/update payloads before they reach the store.
// Dependencies: serde_json, regex
// ============================================================================

//! ## Overview
//! One validator per resource kind. Validation is structural and semantic:
//! required fields, value ranges, and cross-field constraints. On update the
//! patch is merged over the existing record before cross-field checks run, so
//! changing only `max` still satisfies `min <= max` against the stored `min`.
//! Validators collect every violated field, never mutate the store, and
//! return a normalized attribute map on success.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod helper;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::error::FieldIssue;
use crate::kinds::CategoryScope;
use crate::kinds::ResourceKind;

// ============================================================================
// SECTION: Validate Mode
// ============================================================================

/// Validation mode for a payload.
#[derive(Debug, Clone, Copy)]
pub enum ValidateMode<'a> {
    /// Full payload for a new record; defaults are applied.
    Create,
    /// Partial patch merged over the existing record's attributes.
    Update {
        /// Attributes of the stored record being patched.
        existing: &'a Map<String, Value>,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Validates a payload for a kind and returns the normalized attribute map.
///
/// # Errors
///
/// Returns every violated field when the payload is structurally or
/// semantically invalid.
pub fn validate_payload(
    kind: ResourceKind,
    payload: &Map<String, Value>,
    mode: ValidateMode<'_>,
) -> Result<Map<String, Value>, Vec<FieldIssue>> {
    let merged = match mode {
        ValidateMode::Create => {
            let mut merged = payload.clone();
            apply_defaults(kind, &mut merged);
            merged
        }
        ValidateMode::Update {
            existing,
        } => {
            let mut merged = existing.clone();
            for (field, value) in payload {
                merged.insert(field.clone(), value.clone());
            }
            merged
        }
    };
    let mut issues = Vec::new();
    match kind {
        ResourceKind::Dashboard => check_dashboard(&merged, &mut issues),
        ResourceKind::Automation => check_automation(&merged, &mut issues),
        ResourceKind::Script => check_script(&merged, &mut issues),
        ResourceKind::Scene => check_scene(&merged, &mut issues),
        ResourceKind::Helper(domain) => helper::check_helper(domain, &merged, &mut issues),
        ResourceKind::Category => check_category(&merged, &mut issues),
        ResourceKind::Label => check_label(&merged, &mut issues),
    }
    if issues.is_empty() { Ok(merged) } else { Err(issues) }
}

/// Applies kind-specific defaults to a create payload.
fn apply_defaults(kind: ResourceKind, merged: &mut Map<String, Value>) {
    let defaults: Vec<(&str, Value)> = match kind {
        ResourceKind::Dashboard => vec![
            ("show_in_sidebar", Value::Bool(true)),
            ("require_admin", Value::Bool(false)),
            ("mode", Value::String("storage".to_string())),
        ],
        ResourceKind::Automation => vec![("conditions", Value::Array(Vec::new()))],
        ResourceKind::Scene => vec![("entities", Value::Object(Map::new()))],
        ResourceKind::Helper(domain) => helper::domain_defaults(domain),
        _ => Vec::new(),
    };
    for (field, value) in defaults {
        if !merged.contains_key(field) {
            merged.insert(field.to_string(), value);
        }
    }
}

// ============================================================================
// SECTION: Kind Checks
// ============================================================================

/// Execution modes accepted for automations and scripts.
const EXECUTION_MODES: [&str; 4] = ["single", "restart", "queued", "parallel"];

/// Checks dashboard attributes.
fn check_dashboard(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "title", issues);
    if let Some(url_path) = require_non_empty_str(attrs, "url_path", issues) {
        if !is_url_slug(url_path) {
            issues.push(FieldIssue::new(
                "url_path",
                "must contain only lowercase letters, digits, dashes, and underscores",
            ));
        }
    }
    optional_str(attrs, "icon", issues);
    optional_bool(attrs, "show_in_sidebar", issues);
    optional_bool(attrs, "require_admin", issues);
    if let Some(mode) = optional_str(attrs, "mode", issues) {
        if mode != "storage" && mode != "yaml" {
            issues.push(FieldIssue::new("mode", "must be one of: storage, yaml"));
        }
    }
}

/// Checks automation attributes.
fn check_automation(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "alias", issues);
    require_non_empty_array(attrs, "triggers", "at least one trigger is required", issues);
    require_non_empty_array(attrs, "actions", "at least one action is required", issues);
    optional_array(attrs, "conditions", issues);
    optional_str(attrs, "description", issues);
    check_execution_mode(attrs, issues);
}

/// Checks script attributes.
fn check_script(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "alias", issues);
    require_non_empty_array(attrs, "sequence", "at least one step is required", issues);
    optional_str(attrs, "description", issues);
    check_execution_mode(attrs, issues);
}

/// Checks scene attributes.
fn check_scene(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "name", issues);
    if let Some(entities) = attrs.get("entities") {
        if !entities.is_object() {
            issues.push(FieldIssue::new("entities", "must be an object"));
        }
    }
    optional_str(attrs, "icon", issues);
}

/// Checks category attributes.
fn check_category(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "name", issues);
    match attrs.get("scope").and_then(Value::as_str) {
        Some(scope) if CategoryScope::parse(scope).is_some() => {}
        Some(scope) => {
            issues.push(FieldIssue::new(
                "scope",
                format!("unknown scope '{scope}'; expected one of: automation, script, helper"),
            ));
        }
        None => issues.push(FieldIssue::new("scope", "is required")),
    }
    optional_str(attrs, "icon", issues);
}

/// Checks label attributes.
fn check_label(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    require_non_empty_str(attrs, "name", issues);
    optional_str(attrs, "icon", issues);
    if let Some(color) = optional_str(attrs, "color", issues) {
        if !is_color_token(color) {
            issues.push(FieldIssue::new(
                "color",
                "must be a hex color (#rgb or #rrggbb) or a lowercase color name",
            ));
        }
    }
}

/// Checks the shared execution `mode` field.
fn check_execution_mode(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    if let Some(mode) = optional_str(attrs, "mode", issues) {
        if !EXECUTION_MODES.contains(&mode) {
            issues.push(FieldIssue::new(
                "mode",
                format!("must be one of: {}", EXECUTION_MODES.join(", ")),
            ));
        }
    }
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Requires a non-empty string field; records an issue otherwise.
fn require_non_empty_str<'a>(
    attrs: &'a Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<&'a str> {
    match attrs.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
        Some(Value::String(_)) => {
            issues.push(FieldIssue::new(field, "must not be empty"));
            None
        }
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a string"));
            None
        }
        None => {
            issues.push(FieldIssue::new(field, "is required"));
            None
        }
    }
}

/// Requires a non-empty array field; records an issue otherwise.
fn require_non_empty_array(
    attrs: &Map<String, Value>,
    field: &str,
    empty_message: &str,
    issues: &mut Vec<FieldIssue>,
) {
    match attrs.get(field) {
        Some(Value::Array(items)) if !items.is_empty() => {}
        Some(Value::Array(_)) => issues.push(FieldIssue::new(field, empty_message)),
        Some(_) => issues.push(FieldIssue::new(field, "must be an array")),
        None => issues.push(FieldIssue::new(field, empty_message)),
    }
}

/// Type-checks an optional string field.
fn optional_str<'a>(
    attrs: &'a Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<&'a str> {
    match attrs.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a string"));
            None
        }
    }
}

/// Type-checks an optional boolean field.
fn optional_bool(
    attrs: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<bool> {
    match attrs.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a boolean"));
            None
        }
    }
}

/// Type-checks an optional array field.
fn optional_array(attrs: &Map<String, Value>, field: &str, issues: &mut Vec<FieldIssue>) {
    if let Some(value) = attrs.get(field) {
        if !value.is_array() && !value.is_null() {
            issues.push(FieldIssue::new(field, "must be an array"));
        }
    }
}

/// Type-checks an optional numeric field.
fn optional_number(
    attrs: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<f64> {
    match attrs.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Number(value)) => value.as_f64(),
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a number"));
            None
        }
    }
}

/// Type-checks an optional integer field.
fn optional_integer(
    attrs: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<i64> {
    match attrs.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Number(value)) => match value.as_i64() {
            Some(integer) => Some(integer),
            None => {
                issues.push(FieldIssue::new(field, "must be an integer"));
                None
            }
        },
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be an integer"));
            None
        }
    }
}

/// Returns true when the value is a valid dashboard url slug.
fn is_url_slug(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}

/// Returns true when the value is an acceptable color token.
fn is_color_token(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|ch| ch.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_lowercase())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
