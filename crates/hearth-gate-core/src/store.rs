// hearth-gate-core/src/store.rs
// ============================================================================
// Module: Resource Store Interface
// Description: Narrow typed interface to the external configuration store.
// Purpose: Keep the core backend-agnostic; no logic lives behind this seam.
// Dependencies: async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The resource store is the only shared mutable resource the core touches.
//! Every call is atomic-or-failed from the core's perspective: the core does
//! not retry, merge, or re-order store calls, and a conflicting concurrent
//! write surfaces as [`StoreError::Conflict`] unchanged. Implementations must
//! honour cancellation by returning [`StoreError::Cancelled`] rather than
//! hanging.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::kinds::ResourceKind;
use crate::ops::LifecycleVerb;
use crate::record::ListFilter;
use crate::record::ResourceRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Errors surfaced by resource store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Target identifier is absent.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind label.
        kind: String,
        /// Missing identifier.
        id: String,
    },
    /// Uniqueness violation or concurrent-modification conflict.
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable detail.
        message: String,
    },
    /// The caller withdrew the request mid-call.
    #[error("store call cancelled")]
    Cancelled,
    /// Backend failure with an opaque cause.
    #[error("store backend error: {message}")]
    Backend {
        /// Human-readable detail.
        message: String,
    },
}

impl StoreError {
    /// Builds a not-found error for a (kind, id) pair.
    #[must_use]
    pub fn not_found(kind: ResourceKind, id: &str) -> Self {
        Self::NotFound {
            kind: kind.as_str(),
            id: id.to_string(),
        }
    }

    /// Builds a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Resource Store
// ============================================================================

/// Narrow async interface to the external configuration registries.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Lists records of a kind, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    async fn list(
        &self,
        kind: ResourceKind,
        filter: &ListFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError>;

    /// Fetches one record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the identifier is absent.
    async fn get(&self, kind: ResourceKind, id: &str) -> Result<ResourceRecord, StoreError>;

    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier or a
    /// kind-specific uniqueness constraint is already taken.
    async fn create(&self, record: ResourceRecord) -> Result<ResourceRecord, StoreError>;

    /// Applies a partial attribute patch to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the identifier is absent and
    /// [`StoreError::Conflict`] when the patch violates a store constraint.
    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<ResourceRecord, StoreError>;

    /// Deletes a record. Deleting an absent identifier is an error, never a
    /// silent success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the identifier is absent.
    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), StoreError>;

    /// Invokes a kind-specific lifecycle verb against a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the identifier is absent and
    /// [`StoreError::Backend`] when the runtime action fails.
    async fn invoke_verb(
        &self,
        kind: ResourceKind,
        id: &str,
        verb: LifecycleVerb,
    ) -> Result<(), StoreError>;
}
