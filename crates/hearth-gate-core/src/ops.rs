// hearth-gate-core/src/ops.rs
// ============================================================================
// Module: Operations
// Description: Operation and operation-class enumerations.
// Purpose: Map concrete verbs onto the four permission classes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every operation belongs to exactly one resource kind and maps onto one of
//! four permission classes. Lifecycle verbs (activate/run/stop/trigger/
//! enable/disable) mutate runtime state without touching stored fields; they
//! are gated under the `update` class via [`LIFECYCLE_CLASS`], a policy
//! constant rather than a hidden assumption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Operation Class
// ============================================================================

/// Permission class a concrete operation is gated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    /// Read-only access (list, get).
    Read,
    /// Record creation.
    Create,
    /// Record mutation and lifecycle verbs.
    Update,
    /// Record removal.
    Delete,
}

impl OperationClass {
    /// Returns the wire label for the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Permission class gating lifecycle verbs.
pub const LIFECYCLE_CLASS: OperationClass = OperationClass::Update;

// ============================================================================
// SECTION: Lifecycle Verbs
// ============================================================================

/// Kind-specific lifecycle verbs forwarded to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleVerb {
    /// Apply a scene.
    Activate,
    /// Start a script.
    Run,
    /// Stop a running script.
    Stop,
    /// Fire an automation immediately.
    Trigger,
    /// Enable an automation.
    Enable,
    /// Disable an automation.
    Disable,
}

impl LifecycleVerb {
    /// Returns the wire label for the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Run => "run",
            Self::Stop => "stop",
            Self::Trigger => "trigger",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }
}

// ============================================================================
// SECTION: Operation
// ============================================================================

/// Operations exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// List records of a kind.
    List,
    /// Fetch a single record by identifier.
    Get,
    /// Create a record.
    Create,
    /// Partially update a record.
    Update,
    /// Delete a record.
    Delete,
    /// Apply a scene.
    Activate,
    /// Start a script.
    Run,
    /// Stop a running script.
    Stop,
    /// Fire an automation immediately.
    Trigger,
    /// Enable an automation.
    Enable,
    /// Disable an automation.
    Disable,
}

impl Operation {
    /// All operations in canonical order.
    pub const ALL: [Self; 11] = [
        Self::List,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Activate,
        Self::Run,
        Self::Stop,
        Self::Trigger,
        Self::Enable,
        Self::Disable,
    ];

    /// Returns the wire label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Activate => "activate",
            Self::Run => "run",
            Self::Stop => "stop",
            Self::Trigger => "trigger",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }

    /// Parses a wire label into an operation.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|operation| operation.as_str() == label)
    }

    /// Returns the permission class the operation is gated under.
    #[must_use]
    pub const fn class(self) -> OperationClass {
        match self {
            Self::List | Self::Get => OperationClass::Read,
            Self::Create => OperationClass::Create,
            Self::Update => OperationClass::Update,
            Self::Delete => OperationClass::Delete,
            Self::Activate
            | Self::Run
            | Self::Stop
            | Self::Trigger
            | Self::Enable
            | Self::Disable => LIFECYCLE_CLASS,
        }
    }

    /// Returns the lifecycle verb for verb-style operations.
    #[must_use]
    pub const fn lifecycle_verb(self) -> Option<LifecycleVerb> {
        match self {
            Self::Activate => Some(LifecycleVerb::Activate),
            Self::Run => Some(LifecycleVerb::Run),
            Self::Stop => Some(LifecycleVerb::Stop),
            Self::Trigger => Some(LifecycleVerb::Trigger),
            Self::Enable => Some(LifecycleVerb::Enable),
            Self::Disable => Some(LifecycleVerb::Disable),
            _ => None,
        }
    }

    /// Returns true when the operation carries a payload to validate.
    #[must_use]
    pub const fn validates_payload(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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

    use super::LIFECYCLE_CLASS;
    use super::Operation;
    use super::OperationClass;

    #[test]
    fn operation_labels_round_trip() {
        for operation in Operation::ALL {
            assert_eq!(Operation::parse(operation.as_str()), Some(operation));
        }
    }

    #[test]
    fn lifecycle_verbs_gate_under_update() {
        for operation in [
            Operation::Activate,
            Operation::Run,
            Operation::Stop,
            Operation::Trigger,
            Operation::Enable,
            Operation::Disable,
        ] {
            assert_eq!(operation.class(), LIFECYCLE_CLASS);
            assert!(operation.lifecycle_verb().is_some());
        }
    }

    #[test]
    fn only_create_and_update_validate_payloads() {
        for operation in Operation::ALL {
            let expected = matches!(operation, Operation::Create | Operation::Update);
            assert_eq!(operation.validates_payload(), expected);
        }
        assert_eq!(Operation::List.class(), OperationClass::Read);
    }
}
