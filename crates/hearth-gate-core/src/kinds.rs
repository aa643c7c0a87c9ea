// hearth-gate-core/src/kinds.rs
// ============================================================================
// Module: Resource Kinds
// Description: Closed enumeration of managed resource kinds.
// Purpose: Provide tagged-variant dispatch keys for the operation registry.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Resource kinds form a closed enumeration. Helpers are one family with
//! per-domain schema variants rather than seven unrelated kinds: they share
//! identity, lifecycle, and permission gating and differ only in field
//! validation. Adding a kind is a compile-time edit, which keeps the
//! fail-closed permission guarantee checkable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Helper Domains
// ============================================================================

/// Helper sub-kinds managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperDomain {
    /// Boolean toggle helper.
    InputBoolean,
    /// Numeric slider/box helper.
    InputNumber,
    /// Free-text helper.
    InputText,
    /// Ordered-options dropdown helper.
    InputSelect,
    /// Date and/or time helper.
    InputDatetime,
    /// Incrementing counter helper.
    Counter,
    /// Countdown timer helper.
    Timer,
}

impl HelperDomain {
    /// All helper domains in canonical order.
    pub const ALL: [Self; 7] = [
        Self::InputBoolean,
        Self::InputNumber,
        Self::InputText,
        Self::InputSelect,
        Self::InputDatetime,
        Self::Counter,
        Self::Timer,
    ];

    /// Returns the wire label for the domain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputBoolean => "input_boolean",
            Self::InputNumber => "input_number",
            Self::InputText => "input_text",
            Self::InputSelect => "input_select",
            Self::InputDatetime => "input_datetime",
            Self::Counter => "counter",
            Self::Timer => "timer",
        }
    }

    /// Parses a wire label into a helper domain.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|domain| domain.as_str() == label)
    }
}

// ============================================================================
// SECTION: Resource Kind
// ============================================================================

/// Categories of manageable configuration objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Lovelace-style dashboard.
    Dashboard,
    /// Trigger/condition/action automation.
    Automation,
    /// Callable action sequence.
    Script,
    /// Entity-state snapshot scene.
    Scene,
    /// Helper entity with a domain-specific schema.
    Helper(HelperDomain),
    /// Scoped organization category.
    Category,
    /// Scope-free organization label.
    Label,
}

impl ResourceKind {
    /// All resource kinds in canonical order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut kinds = vec![Self::Dashboard, Self::Automation, Self::Script, Self::Scene];
        for domain in HelperDomain::ALL {
            kinds.push(Self::Helper(domain));
        }
        kinds.push(Self::Category);
        kinds.push(Self::Label);
        kinds
    }

    /// Returns the wire label for the kind.
    #[must_use]
    pub fn as_str(self) -> String {
        match self {
            Self::Dashboard => "dashboard".to_string(),
            Self::Automation => "automation".to_string(),
            Self::Script => "script".to_string(),
            Self::Scene => "scene".to_string(),
            Self::Helper(domain) => format!("helper:{}", domain.as_str()),
            Self::Category => "category".to_string(),
            Self::Label => "label".to_string(),
        }
    }

    /// Parses a wire label into a resource kind.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "dashboard" => Some(Self::Dashboard),
            "automation" => Some(Self::Automation),
            "script" => Some(Self::Script),
            "scene" => Some(Self::Scene),
            "category" => Some(Self::Category),
            "label" => Some(Self::Label),
            other => {
                let domain = other.strip_prefix("helper:")?;
                HelperDomain::parse(domain).map(Self::Helper)
            }
        }
    }

    /// Returns the permission-group label used by the capability document.
    ///
    /// All helper domains share one permission group; they differ only in
    /// field validation.
    #[must_use]
    pub const fn permission_group(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboards",
            Self::Automation => "automations",
            Self::Script => "scripts",
            Self::Scene => "scenes",
            Self::Helper(_) => "helpers",
            Self::Category => "categories",
            Self::Label => "labels",
        }
    }

    /// Returns the payload field carrying the caller-supplied identifier.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Dashboard => "url_path",
            _ => "id",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown resource kind: {label}")))
    }
}

// ============================================================================
// SECTION: Category Scope
// ============================================================================

/// Scopes under which categories are namespaced.
///
/// Category identifiers and names are unique within a scope, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScope {
    /// Automation categories.
    Automation,
    /// Script categories.
    Script,
    /// Helper categories.
    Helper,
}

impl CategoryScope {
    /// All category scopes in canonical order.
    pub const ALL: [Self; 3] = [Self::Automation, Self::Script, Self::Helper];

    /// Returns the wire label for the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automation => "automation",
            Self::Script => "script",
            Self::Helper => "helper",
        }
    }

    /// Parses a wire label into a category scope.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.as_str() == label)
    }
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

    use super::HelperDomain;
    use super::ResourceKind;

    #[test]
    fn kind_labels_round_trip() {
        for kind in ResourceKind::all() {
            let label = kind.as_str();
            assert_eq!(ResourceKind::parse(&label), Some(kind), "label {label}");
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(ResourceKind::parse("widget"), None);
        assert_eq!(ResourceKind::parse("helper:widget"), None);
        assert_eq!(ResourceKind::parse("helper:"), None);
    }

    #[test]
    fn helper_domains_share_one_permission_group() {
        for domain in HelperDomain::ALL {
            assert_eq!(ResourceKind::Helper(domain).permission_group(), "helpers");
        }
    }
}
