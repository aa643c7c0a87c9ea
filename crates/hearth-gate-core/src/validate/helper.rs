// hearth-gate-core/src/validate/helper.rs
// ============================================================================
// Module: Helper Validators
// Description: Per-domain validation for the seven helper sub-kinds.
// Purpose: Enforce the field constraints that distinguish helper domains.
// Dependencies: serde_json, regex
// ============================================================================

//! ## Overview
//! Helpers share identity and lifecycle; they differ only in field
//! validation. Each domain check operates on the merged attribute map, so
//! update patches are checked against stored values for cross-field
//! constraints such as `min <= max`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::optional_bool;
use super::optional_integer;
use super::optional_number;
use super::optional_str;
use super::require_non_empty_str;
use crate::error::FieldIssue;
use crate::kinds::HelperDomain;

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Checks helper attributes for one domain.
pub(super) fn check_helper(
    domain: HelperDomain,
    attrs: &Map<String, Value>,
    issues: &mut Vec<FieldIssue>,
) {
    require_non_empty_str(attrs, "name", issues);
    optional_str(attrs, "icon", issues);
    match domain {
        HelperDomain::InputBoolean => check_input_boolean(attrs, issues),
        HelperDomain::InputNumber => check_input_number(attrs, issues),
        HelperDomain::InputText => check_input_text(attrs, issues),
        HelperDomain::InputSelect => check_input_select(attrs, issues),
        HelperDomain::InputDatetime => check_input_datetime(attrs, issues),
        HelperDomain::Counter => check_counter(attrs, issues),
        HelperDomain::Timer => check_timer(attrs, issues),
    }
}

/// Returns create-time defaults for one domain.
pub(super) fn domain_defaults(domain: HelperDomain) -> Vec<(&'static str, Value)> {
    match domain {
        HelperDomain::InputNumber => vec![("step", json!(1.0))],
        HelperDomain::Counter => vec![("step", json!(1)), ("initial", json!(0))],
        HelperDomain::Timer => vec![("duration", json!("0:00:00"))],
        _ => Vec::new(),
    }
}

// ============================================================================
// SECTION: Domain Checks
// ============================================================================

/// Checks `input_boolean` attributes.
fn check_input_boolean(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    optional_bool(attrs, "initial", issues);
}

/// Checks `input_number` attributes.
fn check_input_number(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    let min = optional_number(attrs, "min", issues);
    let max = optional_number(attrs, "max", issues);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            issues.push(FieldIssue::new("min", "must not exceed max"));
        }
    }
    if let Some(step) = optional_number(attrs, "step", issues) {
        if step <= 0.0 {
            issues.push(FieldIssue::new("step", "must be greater than zero"));
        }
    }
    if let Some(initial) = optional_number(attrs, "initial", issues) {
        let below = min.is_some_and(|min| initial < min);
        let above = max.is_some_and(|max| initial > max);
        if below || above {
            issues.push(FieldIssue::new("initial", "must lie within [min, max]"));
        }
    }
}

/// Checks `input_text` attributes.
fn check_input_text(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    let min_length = optional_integer(attrs, "min_length", issues);
    let max_length = optional_integer(attrs, "max_length", issues);
    for (field, value) in [("min_length", min_length), ("max_length", max_length)] {
        if value.is_some_and(|length| length < 0) {
            issues.push(FieldIssue::new(field, "must not be negative"));
        }
    }
    if let (Some(min), Some(max)) = (min_length, max_length) {
        if min > max {
            issues.push(FieldIssue::new("min_length", "must not exceed max_length"));
        }
    }
    if let Some(pattern) = optional_str(attrs, "pattern", issues) {
        if regex::Regex::new(pattern).is_err() {
            issues.push(FieldIssue::new("pattern", "must be a valid regular expression"));
        }
    }
    optional_str(attrs, "initial", issues);
}

/// Checks `input_select` attributes.
fn check_input_select(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    let options = match attrs.get("options") {
        Some(Value::Array(items)) if !items.is_empty() => {
            let mut seen = Vec::with_capacity(items.len());
            let mut valid = true;
            for item in items {
                match item.as_str() {
                    Some(option) if !option.is_empty() => {
                        if seen.contains(&option) {
                            issues.push(FieldIssue::new(
                                "options",
                                format!("duplicate option '{option}'"),
                            ));
                            valid = false;
                        }
                        seen.push(option);
                    }
                    _ => {
                        issues.push(FieldIssue::new(
                            "options",
                            "must contain only non-empty strings",
                        ));
                        valid = false;
                    }
                }
            }
            if valid { Some(seen) } else { None }
        }
        Some(Value::Array(_)) => {
            issues.push(FieldIssue::new("options", "must not be empty"));
            None
        }
        Some(_) => {
            issues.push(FieldIssue::new("options", "must be an array of strings"));
            None
        }
        None => {
            issues.push(FieldIssue::new("options", "is required"));
            None
        }
    };
    if let Some(initial) = optional_str(attrs, "initial", issues) {
        if let Some(options) = options {
            if !options.contains(&initial) {
                issues.push(FieldIssue::new("initial", "must be one of options"));
            }
        }
    }
}

/// Checks `input_datetime` attributes.
fn check_input_datetime(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    let has_date = optional_bool(attrs, "has_date", issues).unwrap_or(false);
    let has_time = optional_bool(attrs, "has_time", issues).unwrap_or(false);
    if !has_date && !has_time {
        issues.push(FieldIssue::new(
            "has_date",
            "at least one of has_date or has_time must be true",
        ));
    }
}

/// Checks `counter` attributes.
fn check_counter(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    let minimum = optional_integer(attrs, "minimum", issues);
    let maximum = optional_integer(attrs, "maximum", issues);
    if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
        if minimum > maximum {
            issues.push(FieldIssue::new("minimum", "must not exceed maximum"));
        }
    }
    if let Some(step) = optional_integer(attrs, "step", issues) {
        if step <= 0 {
            issues.push(FieldIssue::new("step", "must be greater than zero"));
        }
    }
    if let Some(initial) = optional_integer(attrs, "initial", issues) {
        let below = minimum.is_some_and(|minimum| initial < minimum);
        let above = maximum.is_some_and(|maximum| initial > maximum);
        if below || above {
            issues.push(FieldIssue::new("initial", "must lie within [minimum, maximum]"));
        }
    }
}

/// Checks `timer` attributes.
fn check_timer(attrs: &Map<String, Value>, issues: &mut Vec<FieldIssue>) {
    match attrs.get("duration") {
        None | Some(Value::Null) => {}
        Some(Value::String(duration)) => {
            if parse_duration_seconds(duration).is_none() {
                issues.push(FieldIssue::new(
                    "duration",
                    "must be a non-negative duration (seconds or HH:MM:SS)",
                ));
            }
        }
        Some(Value::Number(duration)) => {
            if duration.as_i64().is_none_or(|seconds| seconds < 0) {
                issues.push(FieldIssue::new("duration", "must not be negative"));
            }
        }
        Some(_) => {
            issues.push(FieldIssue::new("duration", "must be a string or integer"));
        }
    }
    optional_bool(attrs, "restore", issues);
}

/// Parses `SS`, `MM:SS`, or `HH:MM:SS` into whole seconds.
fn parse_duration_seconds(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut seconds: u64 = 0;
    for part in &parts {
        if part.is_empty() {
            return None;
        }
        let field: u64 = part.parse().ok()?;
        seconds = seconds.checked_mul(60)?.checked_add(field)?;
    }
    Some(seconds)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::Map;
    use serde_json::Value;
    use serde_json::json;

    use super::parse_duration_seconds;
    use crate::kinds::HelperDomain;
    use crate::kinds::ResourceKind;
    use crate::validate::ValidateMode;
    use crate::validate::validate_payload;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn create(domain: HelperDomain, payload: Value) -> Result<Map<String, Value>, Vec<String>> {
        validate_payload(ResourceKind::Helper(domain), &map(payload), ValidateMode::Create)
            .map_err(|issues| issues.into_iter().map(|issue| issue.field).collect())
    }

    #[test]
    fn input_number_boundary_cases() {
        let equal = create(
            HelperDomain::InputNumber,
            json!({"name": "Volume", "min": 5, "max": 5, "step": 1}),
        );
        assert!(equal.is_ok(), "min == max is accepted");
        let inverted = create(
            HelperDomain::InputNumber,
            json!({"name": "Volume", "min": 10, "max": 0, "step": 1}),
        );
        assert_eq!(inverted.unwrap_err(), vec!["min".to_string()]);
    }

    #[test]
    fn input_number_initial_out_of_range() {
        let fields = create(
            HelperDomain::InputNumber,
            json!({"name": "Volume", "min": 0, "max": 10, "step": 1, "initial": 15}),
        )
        .unwrap_err();
        assert_eq!(fields, vec!["initial".to_string()]);
        let ok = create(
            HelperDomain::InputNumber,
            json!({"name": "Volume", "min": 0, "max": 10, "step": 1, "initial": 5}),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn input_number_update_checks_against_stored_min() {
        let existing = map(json!({"name": "Volume", "min": 0, "max": 10, "step": 1}));
        let patch = map(json!({"max": -5}));
        let issues = validate_payload(
            ResourceKind::Helper(HelperDomain::InputNumber),
            &patch,
            ValidateMode::Update {
                existing: &existing,
            },
        )
        .unwrap_err();
        assert!(issues.iter().any(|issue| issue.field == "min"));
    }

    #[test]
    fn input_text_pattern_must_compile() {
        let fields = create(
            HelperDomain::InputText,
            json!({"name": "Code", "pattern": "[unclosed"}),
        )
        .unwrap_err();
        assert_eq!(fields, vec!["pattern".to_string()]);
        let ok = create(
            HelperDomain::InputText,
            json!({"name": "Code", "pattern": "^[0-9]{4}$", "min_length": 1, "max_length": 4}),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn input_text_length_ordering() {
        let fields = create(
            HelperDomain::InputText,
            json!({"name": "Code", "min_length": 8, "max_length": 4}),
        )
        .unwrap_err();
        assert_eq!(fields, vec!["min_length".to_string()]);
    }

    #[test]
    fn input_select_options_and_initial() {
        let fields = create(HelperDomain::InputSelect, json!({"name": "Mode"})).unwrap_err();
        assert_eq!(fields, vec!["options".to_string()]);
        let duplicate = create(
            HelperDomain::InputSelect,
            json!({"name": "Mode", "options": ["eco", "eco"]}),
        )
        .unwrap_err();
        assert_eq!(duplicate, vec!["options".to_string()]);
        let stray_initial = create(
            HelperDomain::InputSelect,
            json!({"name": "Mode", "options": ["eco", "boost"], "initial": "off"}),
        )
        .unwrap_err();
        assert_eq!(stray_initial, vec!["initial".to_string()]);
    }

    #[test]
    fn input_datetime_needs_date_or_time() {
        let fields = create(HelperDomain::InputDatetime, json!({"name": "Alarm"})).unwrap_err();
        assert_eq!(fields, vec!["has_date".to_string()]);
        let ok = create(
            HelperDomain::InputDatetime,
            json!({"name": "Alarm", "has_time": true}),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn counter_bounds_and_step() {
        let fields = create(
            HelperDomain::Counter,
            json!({"name": "Visitors", "minimum": 10, "maximum": 0, "step": 0}),
        )
        .unwrap_err();
        assert!(fields.contains(&"minimum".to_string()));
        assert!(fields.contains(&"step".to_string()));
    }

    #[test]
    fn timer_duration_formats() {
        for duration in ["90", "1:30", "0:01:30"] {
            let ok = create(
                HelperDomain::Timer,
                json!({"name": "Laundry", "duration": duration}),
            );
            assert!(ok.is_ok(), "duration {duration}");
        }
        let fields = create(
            HelperDomain::Timer,
            json!({"name": "Laundry", "duration": "later"}),
        )
        .unwrap_err();
        assert_eq!(fields, vec!["duration".to_string()]);
    }

    #[test]
    fn duration_parse_accepts_colon_forms() {
        assert_eq!(parse_duration_seconds("90"), Some(90));
        assert_eq!(parse_duration_seconds("1:30"), Some(90));
        assert_eq!(parse_duration_seconds("0:01:30"), Some(90));
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("1:-30"), None);
    }
}
