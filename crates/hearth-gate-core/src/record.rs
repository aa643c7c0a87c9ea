// hearth-gate-core/src/record.rs
// ============================================================================
// Module: Resource Records
// Description: Uniform record representation exchanged with the store.
// Purpose: Keep results protocol-agnostic until adapters serialize them.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ResourceRecord`] carries an identifier, a kind tag, and a kind-specific
//! attribute mapping. Identifiers are unique within their kind; the kind is
//! immutable after creation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::kinds::ResourceKind;

// ============================================================================
// SECTION: Resource Record
// ============================================================================

/// Payload exchanged with the resource store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Identifier, unique within the kind.
    pub id: String,
    /// Resource kind tag, immutable after creation.
    pub kind: ResourceKind,
    /// Kind-specific attribute mapping.
    pub attributes: Map<String, Value>,
}

impl ResourceRecord {
    /// Builds a record from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ResourceKind, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes,
        }
    }

    /// Returns a string attribute when present and non-null.
    #[must_use]
    pub fn attr_str(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).and_then(Value::as_str)
    }
}

// ============================================================================
// SECTION: List Filter
// ============================================================================

/// Optional filter applied to list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Restrict categories to one scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ListFilter {
    /// Returns true when the filter restricts nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scope.is_none()
    }
}
