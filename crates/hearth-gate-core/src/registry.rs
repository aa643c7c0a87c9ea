// hearth-gate-core/src/registry.rs
// ============================================================================
// Module: Operation Registry
// Description: Declarative table of every (kind, operation) pair that exists.
// Purpose: Single source of truth for dispatch, gating, and advertisement.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The registry binds each (kind, operation) pair to its permission class,
//! tool name, and REST route fragment. It is built once from a static table
//! and immutable after startup; lookup is pure. A missing entry is how
//! "helper domain not supported" or "verb not applicable to this kind" are
//! surfaced, distinctly from a permission denial.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::kinds::ResourceKind;
use crate::ops::Operation;
use crate::ops::OperationClass;

// ============================================================================
// SECTION: Operation Descriptor
// ============================================================================

/// Descriptor binding one (kind, operation) pair to its dispatch metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Resource kind the operation belongs to.
    pub kind: ResourceKind,
    /// Concrete operation.
    pub operation: Operation,
    /// Permission class gating the operation.
    pub class: OperationClass,
    /// Whether the operation carries a payload to validate.
    pub validates_payload: bool,
    /// MCP tool name advertised for this pair.
    pub tool_name: String,
    /// REST route fragment under the API base path.
    pub rest_path: String,
}

// ============================================================================
// SECTION: Operation Registry
// ============================================================================

/// Immutable registry of every operation the gateway exposes.
pub struct OperationRegistry {
    /// Descriptors keyed by (kind, operation).
    entries: BTreeMap<(ResourceKind, Operation), OperationDescriptor>,
    /// Tool-name index for the MCP adapter.
    by_tool: BTreeMap<String, (ResourceKind, Operation)>,
}

impl OperationRegistry {
    /// Builds the standard registry covering all managed kinds.
    #[must_use]
    pub fn standard() -> Self {
        let mut entries = BTreeMap::new();
        let mut by_tool = BTreeMap::new();
        for kind in ResourceKind::all() {
            for operation in kind_operations(kind) {
                let descriptor = OperationDescriptor {
                    kind,
                    operation,
                    class: operation.class(),
                    validates_payload: operation.validates_payload(),
                    tool_name: tool_name(kind, operation),
                    rest_path: rest_path(kind),
                };
                by_tool.insert(descriptor.tool_name.clone(), (kind, operation));
                entries.insert((kind, operation), descriptor);
            }
        }
        Self {
            entries,
            by_tool,
        }
    }

    /// Resolves a (kind, operation) pair.
    #[must_use]
    pub fn resolve(&self, kind: ResourceKind, operation: Operation) -> Option<&OperationDescriptor> {
        self.entries.get(&(kind, operation))
    }

    /// Resolves an MCP tool name into its (kind, operation) pair.
    #[must_use]
    pub fn resolve_tool(&self, name: &str) -> Option<&OperationDescriptor> {
        let key = self.by_tool.get(name)?;
        self.entries.get(key)
    }

    /// Iterates all descriptors in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.entries.values()
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// SECTION: Static Table
// ============================================================================

/// CRUD operations shared by every kind.
const CRUD: [Operation; 5] =
    [Operation::List, Operation::Get, Operation::Create, Operation::Update, Operation::Delete];

/// Returns the operations applicable to a kind.
fn kind_operations(kind: ResourceKind) -> Vec<Operation> {
    let mut operations = CRUD.to_vec();
    match kind {
        ResourceKind::Scene => operations.push(Operation::Activate),
        ResourceKind::Script => {
            operations.push(Operation::Run);
            operations.push(Operation::Stop);
        }
        ResourceKind::Automation => {
            operations.push(Operation::Trigger);
            operations.push(Operation::Enable);
            operations.push(Operation::Disable);
        }
        _ => {}
    }
    operations
}

/// Returns the singular tool slug for a kind.
fn kind_slug(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Dashboard => "dashboard",
        ResourceKind::Automation => "automation",
        ResourceKind::Script => "script",
        ResourceKind::Scene => "scene",
        ResourceKind::Helper(domain) => domain.as_str(),
        ResourceKind::Category => "category",
        ResourceKind::Label => "label",
    }
}

/// Returns the plural tool slug for a kind.
fn kind_slug_plural(kind: ResourceKind) -> String {
    match kind {
        ResourceKind::Category => "categories".to_string(),
        other => format!("{}s", kind_slug(other)),
    }
}

/// Builds the advertised tool name for a (kind, operation) pair.
fn tool_name(kind: ResourceKind, operation: Operation) -> String {
    match operation {
        Operation::List => format!("ha_list_{}", kind_slug_plural(kind)),
        other => format!("ha_{}_{}", other.as_str(), kind_slug(kind)),
    }
}

/// Returns the REST route fragment for a kind.
fn rest_path(kind: ResourceKind) -> String {
    match kind {
        ResourceKind::Helper(domain) => format!("helpers/{}", domain.as_str()),
        other => kind_slug_plural(other),
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

    use super::OperationRegistry;
    use crate::kinds::HelperDomain;
    use crate::kinds::ResourceKind;
    use crate::ops::Operation;

    #[test]
    fn registry_covers_all_kinds_and_verbs() {
        let registry = OperationRegistry::standard();
        // 12 kinds x 5 CRUD + activate + run/stop + trigger/enable/disable.
        assert_eq!(registry.len(), 12 * 5 + 1 + 2 + 3);
        assert!(registry.resolve(ResourceKind::Scene, Operation::Activate).is_some());
        assert!(registry.resolve(ResourceKind::Script, Operation::Run).is_some());
        assert!(registry.resolve(ResourceKind::Automation, Operation::Trigger).is_some());
    }

    #[test]
    fn verbs_do_not_leak_across_kinds() {
        let registry = OperationRegistry::standard();
        assert!(registry.resolve(ResourceKind::Dashboard, Operation::Activate).is_none());
        assert!(registry.resolve(ResourceKind::Scene, Operation::Run).is_none());
        assert!(
            registry
                .resolve(ResourceKind::Helper(HelperDomain::Counter), Operation::Trigger)
                .is_none()
        );
    }

    #[test]
    fn tool_names_are_unique_and_resolvable() {
        let registry = OperationRegistry::standard();
        for descriptor in registry.iter() {
            let resolved = registry.resolve_tool(&descriptor.tool_name);
            assert_eq!(
                resolved.map(|entry| (entry.kind, entry.operation)),
                Some((descriptor.kind, descriptor.operation)),
                "tool {}",
                descriptor.tool_name
            );
        }
        assert!(registry.resolve_tool("ha_eject_dashboard").is_none());
    }

    #[test]
    fn list_tools_use_plural_slugs() {
        let registry = OperationRegistry::standard();
        let descriptor = registry
            .resolve(ResourceKind::Category, Operation::List)
            .unwrap();
        assert_eq!(descriptor.tool_name, "ha_list_categories");
        assert_eq!(descriptor.rest_path, "categories");
        let helper = registry
            .resolve(ResourceKind::Helper(HelperDomain::InputNumber), Operation::List)
            .unwrap();
        assert_eq!(helper.tool_name, "ha_list_input_numbers");
        assert_eq!(helper.rest_path, "helpers/input_number");
    }
}
