// hearth-gate-core/src/capability.rs
// ============================================================================
// Module: Capability Model
// Description: Fail-closed permission evaluation over a capability snapshot.
// Purpose: Map the declarative capability configuration onto allowed calls.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! The capability configuration is an immutable snapshot swapped wholesale
//! under a single reference. In-flight calls always read one consistent
//! snapshot; the permission check runs once, up front, and is not re-checked
//! after a reload. Absence of a flag means denied, never default-allow.
//!
//! Denials are indistinguishable in shape from "kind not configured at all":
//! the caller never learns whether a kind exists but is disabled versus does
//! not exist. This is a deliberate anti-probing decision, not an incidental
//! leak.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;

use crate::kinds::ResourceKind;
use crate::ops::OperationClass;

// ============================================================================
// SECTION: Surfaces
// ============================================================================

/// Protocol surface a call arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// MCP tool surface.
    Mcp,
    /// REST surface.
    Rest,
}

impl Surface {
    /// Returns the wire label for the surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::Rest => "rest",
        }
    }
}

// ============================================================================
// SECTION: Grants
// ============================================================================

/// Per-kind operation-class grants.
///
/// Every flag defaults to false; a missing table denies everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindGrants {
    /// List and get operations.
    #[serde(default)]
    pub read: bool,
    /// Create operations.
    #[serde(default)]
    pub create: bool,
    /// Update operations and lifecycle verbs.
    #[serde(default)]
    pub update: bool,
    /// Delete operations.
    #[serde(default)]
    pub delete: bool,
}

impl KindGrants {
    /// Grants every operation class. Test and development convenience.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            read: true,
            create: true,
            update: true,
            delete: true,
        }
    }

    /// Returns the flag for one operation class.
    #[must_use]
    pub const fn allows(self, class: OperationClass) -> bool {
        match class {
            OperationClass::Read => self.read,
            OperationClass::Create => self.create,
            OperationClass::Update => self.update,
            OperationClass::Delete => self.delete,
        }
    }
}

// ============================================================================
// SECTION: Capability Config
// ============================================================================

/// Permission decision for one (kind, class, surface) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The capability is granted.
    Allowed,
    /// The capability is not granted. Carries no detail by design.
    Denied,
}

/// Immutable capability snapshot evaluated per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// Whether the MCP tool surface is enabled at all.
    #[serde(default)]
    pub mcp_enabled: bool,
    /// Whether the REST surface is enabled at all.
    #[serde(default)]
    pub rest_enabled: bool,
    /// Per-kind grants keyed by permission group.
    ///
    /// Helper domains share the `helpers` group; see
    /// [`ResourceKind::permission_group`].
    #[serde(default)]
    pub grants: BTreeMap<String, KindGrants>,
}

impl CapabilityConfig {
    /// Evaluates a requested (kind, class) pair on a surface.
    ///
    /// Fail-closed: a missing grant table, a false flag, or a disabled
    /// surface switch all deny, with no distinction between them.
    #[must_use]
    pub fn check(&self, kind: ResourceKind, class: OperationClass, surface: Surface) -> Decision {
        let surface_enabled = match surface {
            Surface::Mcp => self.mcp_enabled,
            Surface::Rest => self.rest_enabled,
        };
        if !surface_enabled {
            return Decision::Denied;
        }
        let allowed = self
            .grants
            .get(kind.permission_group())
            .copied()
            .unwrap_or_default()
            .allows(class);
        if allowed { Decision::Allowed } else { Decision::Denied }
    }

    /// Grants every class for every kind on both surfaces.
    #[must_use]
    pub fn permissive() -> Self {
        let mut grants = BTreeMap::new();
        for kind in ResourceKind::all() {
            grants.insert(kind.permission_group().to_string(), KindGrants::allow_all());
        }
        Self {
            mcp_enabled: true,
            rest_enabled: true,
            grants,
        }
    }
}

// ============================================================================
// SECTION: Shared Snapshot
// ============================================================================

/// Shared capability snapshot holder with wholesale replacement.
///
/// Readers clone the inner [`Arc`] once at call entry and evaluate against
/// that snapshot for the remainder of the call; [`SharedCapabilities::reload`]
/// never mutates a snapshot in place.
#[derive(Debug, Clone)]
pub struct SharedCapabilities {
    /// Current snapshot pointer.
    inner: Arc<RwLock<Arc<CapabilityConfig>>>,
}

impl SharedCapabilities {
    /// Wraps an initial capability snapshot.
    #[must_use]
    pub fn new(config: CapabilityConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CapabilityConfig> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the snapshot wholesale.
    pub fn reload(&self, config: CapabilityConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
