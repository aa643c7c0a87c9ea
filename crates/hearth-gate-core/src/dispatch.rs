// hearth-gate-core/src/dispatch.rs
// ============================================================================
// Module: Dispatcher
// Description: Single gate-check-validate-execute pipeline for every call.
// Purpose: Guarantee both surfaces share one permission and validation path.
// Dependencies: serde_json, std
// ============================================================================

//! ## Overview
//! Every call, from either surface, flows through [`Dispatcher::invoke`]:
//! resolve the (kind, operation) pair, check the capability snapshot once,
//! validate the payload, then execute against the store. Permission checks
//! precede validation, and validation precedes any store mutation; a call
//! rejected at any stage leaves the store untouched. Reads may precede
//! validation (update fetches the existing record to merge against), but a
//! failed validation still mutates nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;

use crate::capability::Decision;
use crate::capability::SharedCapabilities;
use crate::capability::Surface;
use crate::error::FieldIssue;
use crate::error::GatewayError;
use crate::kinds::ResourceKind;
use crate::ops::Operation;
use crate::record::ListFilter;
use crate::record::ResourceRecord;
use crate::registry::OperationDescriptor;
use crate::registry::OperationRegistry;
use crate::store::ResourceStore;
use crate::store::StoreError;
use crate::validate::ValidateMode;
use crate::validate::validate_payload;

// ============================================================================
// SECTION: Calls
// ============================================================================

/// Caller identity attached to a call for audit purposes.
///
/// The gateway does not authenticate; the principal is whatever label the
/// transport supplies and carries no authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(String);

impl Principal {
    /// Wraps a transport-supplied caller label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Principal for transports that carry no caller identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    /// Returns the caller label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One normalized gateway call, independent of the surface it arrived on.
#[derive(Debug, Clone)]
pub struct Call {
    /// Target resource kind.
    pub kind: ResourceKind,
    /// Requested operation.
    pub operation: Operation,
    /// Target identifier; required by everything except list and create.
    pub id: Option<String>,
    /// Attribute payload; required by create and update.
    pub payload: Option<Map<String, Value>>,
    /// List filter; ignored by everything except list.
    pub filter: ListFilter,
    /// Caller identity for auditing.
    pub principal: Principal,
    /// Surface the call arrived on.
    pub surface: Surface,
}

impl Call {
    /// Builds a call with no identifier, payload, or filter.
    #[must_use]
    pub fn new(kind: ResourceKind, operation: Operation, surface: Surface) -> Self {
        Self {
            kind,
            operation,
            id: None,
            payload: None,
            filter: ListFilter::default(),
            principal: Principal::anonymous(),
            surface,
        }
    }

    /// Sets the target identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the attribute payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the list filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ListFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the caller identity.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }
}

/// Successful result of a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A single record (get, create, update).
    Record(ResourceRecord),
    /// A record listing.
    Records(Vec<ResourceRecord>),
    /// A lifecycle verb was forwarded and acknowledged.
    Acknowledged,
    /// The record was deleted.
    Deleted,
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Shared gate-check-validate-execute pipeline.
pub struct Dispatcher {
    /// Immutable operation registry.
    registry: OperationRegistry,
    /// Reloadable capability snapshot holder.
    capabilities: SharedCapabilities,
    /// Resource store backend.
    store: Arc<dyn ResourceStore>,
}

impl Dispatcher {
    /// Builds a dispatcher over the standard registry.
    #[must_use]
    pub fn new(capabilities: SharedCapabilities, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            registry: OperationRegistry::standard(),
            capabilities,
            store,
        }
    }

    /// Returns the operation registry.
    #[must_use]
    pub const fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Returns the capability snapshot holder.
    #[must_use]
    pub const fn capabilities(&self) -> &SharedCapabilities {
        &self.capabilities
    }

    /// Returns the descriptors currently permitted on a surface.
    ///
    /// Disabled operations are absent, not marked; a caller cannot tell an
    /// unadvertised operation from one that never existed.
    #[must_use]
    pub fn advertised(&self, surface: Surface) -> Vec<&OperationDescriptor> {
        let snapshot = self.capabilities.snapshot();
        self.registry
            .iter()
            .filter(|descriptor| {
                snapshot.check(descriptor.kind, descriptor.class, surface) == Decision::Allowed
            })
            .collect()
    }

    /// Dispatches one call through the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownOperation`] for unregistered pairs,
    /// [`GatewayError::PermissionDenied`] when the capability snapshot denies
    /// the call, [`GatewayError::Validation`] for payload violations, and the
    /// translated store error otherwise.
    pub async fn invoke(&self, call: Call) -> Result<Outcome, GatewayError> {
        let Some(descriptor) = self.registry.resolve(call.kind, call.operation) else {
            return Err(GatewayError::UnknownOperation {
                kind: call.kind.as_str(),
                operation: call.operation.as_str().to_string(),
            });
        };
        // One snapshot per call; a concurrent reload does not affect us.
        let snapshot = self.capabilities.snapshot();
        if snapshot.check(call.kind, descriptor.class, call.surface) == Decision::Denied {
            return Err(GatewayError::PermissionDenied {
                kind: call.kind.as_str(),
                operation: call.operation.as_str().to_string(),
            });
        }
        match call.operation {
            Operation::List => {
                let records =
                    self.store.list(call.kind, &call.filter).await.map_err(translate)?;
                Ok(Outcome::Records(records))
            }
            Operation::Get => {
                let id = require_id(&call)?;
                let record = self.store.get(call.kind, id).await.map_err(translate)?;
                Ok(Outcome::Record(record))
            }
            Operation::Create => self.create(&call).await,
            Operation::Update => self.update(&call).await,
            Operation::Delete => {
                let id = require_id(&call)?;
                self.store.delete(call.kind, id).await.map_err(translate)?;
                Ok(Outcome::Deleted)
            }
            other => {
                let id = require_id(&call)?;
                // The registry only admits verbs for kinds they apply to, so
                // the descriptor lookup above already rejected mismatches.
                let Some(verb) = other.lifecycle_verb() else {
                    return Err(GatewayError::UnknownOperation {
                        kind: call.kind.as_str(),
                        operation: other.as_str().to_string(),
                    });
                };
                self.store.invoke_verb(call.kind, id, verb).await.map_err(translate)?;
                Ok(Outcome::Acknowledged)
            }
        }
    }

    /// Validates and executes a create call.
    async fn create(&self, call: &Call) -> Result<Outcome, GatewayError> {
        let payload = require_payload(call)?;
        let mut attributes = validate_payload(call.kind, payload, ValidateMode::Create)
            .map_err(|issues| GatewayError::Validation {
                issues,
            })?;
        let id = derive_id(call.kind, &attributes)?;
        if call.kind.id_field() == "id" {
            attributes.remove("id");
        }
        let record = ResourceRecord::new(id, call.kind, attributes);
        let created = self.store.create(record).await.map_err(translate)?;
        Ok(Outcome::Record(created))
    }

    /// Validates and executes an update call.
    ///
    /// The existing record is fetched first so cross-field constraints are
    /// checked against the merged result, not the bare patch.
    async fn update(&self, call: &Call) -> Result<Outcome, GatewayError> {
        let id = require_id(call)?;
        let payload = require_payload(call)?;
        let existing = self.store.get(call.kind, id).await.map_err(translate)?;
        validate_payload(
            call.kind,
            payload,
            ValidateMode::Update {
                existing: &existing.attributes,
            },
        )
        .map_err(|issues| GatewayError::Validation {
            issues,
        })?;
        let updated =
            self.store.update(call.kind, id, payload.clone()).await.map_err(translate)?;
        Ok(Outcome::Record(updated))
    }
}

// ============================================================================
// SECTION: Call Plumbing
// ============================================================================

/// Requires the call to carry a target identifier.
fn require_id(call: &Call) -> Result<&str, GatewayError> {
    match call.id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(GatewayError::Validation {
            issues: vec![FieldIssue::new(call.kind.id_field(), "is required")],
        }),
    }
}

/// Requires the call to carry an attribute payload.
fn require_payload(call: &Call) -> Result<&Map<String, Value>, GatewayError> {
    call.payload.as_ref().ok_or_else(|| GatewayError::Validation {
        issues: vec![FieldIssue::new("payload", "is required")],
    })
}

/// Derives the identifier for a new record.
///
/// The caller-supplied identifier field wins when present; otherwise the
/// identifier is a slug of the record's display name. Category identifiers
/// are unique within their scope, not globally, so derived category slugs
/// are namespaced by the scope.
fn derive_id(kind: ResourceKind, attributes: &Map<String, Value>) -> Result<String, GatewayError> {
    if let Some(id) = attributes.get(kind.id_field()).and_then(Value::as_str) {
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }
    for field in ["alias", "name"] {
        if let Some(value) = attributes.get(field).and_then(Value::as_str) {
            let slug = slugify(value);
            if slug.is_empty() {
                continue;
            }
            if kind == ResourceKind::Category {
                if let Some(scope) = attributes.get("scope").and_then(Value::as_str) {
                    return Ok(format!("{scope}_{slug}"));
                }
            }
            return Ok(slug);
        }
    }
    Err(GatewayError::Validation {
        issues: vec![FieldIssue::new(kind.id_field(), "could not derive an identifier")],
    })
}

/// Lowercases and squashes a display name into an identifier slug.
fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

/// Translates store errors into the gateway taxonomy.
fn translate(error: StoreError) -> GatewayError {
    match error {
        StoreError::NotFound {
            kind,
            id,
        } => GatewayError::NotFound {
            message: format!("{kind} not found: {id}"),
        },
        StoreError::Conflict {
            message,
        } => GatewayError::Conflict {
            message,
        },
        StoreError::Cancelled => GatewayError::Cancelled,
        StoreError::Backend {
            message,
        } => GatewayError::Backend {
            message,
        },
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

    // Dispatcher pipeline tests live in tests/dispatcher.rs, where the
    // memory store links against the same build of this crate.

    use serde_json::Map;
    use serde_json::Value;
    use serde_json::json;

    use super::derive_id;
    use super::slugify;
    use crate::kinds::ResourceKind;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn slugify_squashes_display_names() {
        assert_eq!(slugify("Morning lights"), "morning_lights");
        assert_eq!(slugify("  Café #2  "), "caf_2");
        assert_eq!(slugify("___"), "");
    }

    #[test]
    fn derived_category_ids_are_namespaced_by_scope() {
        let automation =
            map(json!({"name": "Lighting", "scope": "automation"}));
        assert_eq!(
            derive_id(ResourceKind::Category, &automation).unwrap(),
            "automation_lighting"
        );
        let script = map(json!({"name": "Lighting", "scope": "script"}));
        assert_eq!(derive_id(ResourceKind::Category, &script).unwrap(), "script_lighting");
        // An explicit identifier still wins untouched.
        let explicit =
            map(json!({"id": "lights", "name": "Lighting", "scope": "script"}));
        assert_eq!(derive_id(ResourceKind::Category, &explicit).unwrap(), "lights");
    }

    #[test]
    fn derived_scene_ids_are_plain_slugs() {
        let scene = map(json!({"name": "Movie night"}));
        assert_eq!(derive_id(ResourceKind::Scene, &scene).unwrap(), "movie_night");
    }
}
