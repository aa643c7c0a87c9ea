// hearth-gate-store-memory/src/lib.rs
// ============================================================================
// Module: Memory Resource Store
// Description: In-process ResourceStore over per-kind ordered maps.
// Purpose: Back tests and the standalone server without an external registry.
// Dependencies: hearth-gate-core, async-trait, serde_json
// ============================================================================

//! ## Overview
//! A [`MemoryResourceStore`] keeps one ordered map per resource kind behind a
//! single mutex. It enforces the store-level constraints the dispatcher
//! relies on: identifier uniqueness within a kind, category name uniqueness
//! within a scope, and the read-only nature of yaml-mode dashboards.
//! Lifecycle verbs mutate runtime attributes in place so enable/disable and
//! run/stop state is observable through get.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use hearth_gate_core::LifecycleVerb;
use hearth_gate_core::ListFilter;
use hearth_gate_core::ResourceKind;
use hearth_gate_core::ResourceRecord;
use hearth_gate_core::ResourceStore;
use hearth_gate_core::StoreError;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Memory Store
// ============================================================================

/// Per-kind attribute maps keyed by record identifier.
type KindTable = BTreeMap<String, Map<String, Value>>;

/// In-process resource store.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    /// Records grouped by kind, then by identifier.
    tables: Mutex<BTreeMap<ResourceKind, KindTable>>,
}

impl MemoryResourceStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one record, replacing any record with the same identifier.
    ///
    /// Bypasses uniqueness checks; intended for test and startup fixtures.
    pub fn seed(&self, record: ResourceRecord) {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.entry(record.kind).or_default().insert(record.id, record.attributes);
    }
}

/// Returns true when a category collides with an existing one by (name, scope).
fn category_name_taken(
    table: &KindTable,
    skip_id: Option<&str>,
    name: Option<&str>,
    scope: Option<&str>,
) -> bool {
    table.iter().filter(|(id, _)| skip_id != Some(id.as_str())).any(|(_, attrs)| {
        attrs.get("name").and_then(Value::as_str) == name
            && attrs.get("scope").and_then(Value::as_str) == scope
    })
}

/// Returns true when the dashboard attributes mark a yaml-mode dashboard.
fn is_yaml_dashboard(attrs: &Map<String, Value>) -> bool {
    attrs.get("mode").and_then(Value::as_str) == Some("yaml")
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn list(
        &self,
        kind: ResourceKind,
        filter: &ListFilter,
    ) -> Result<Vec<ResourceRecord>, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = tables.get(&kind) else {
            return Ok(Vec::new());
        };
        let records = table
            .iter()
            .filter(|(_, attrs)| match filter.scope.as_deref() {
                Some(scope) => attrs.get("scope").and_then(Value::as_str) == Some(scope),
                None => true,
            })
            .map(|(id, attrs)| ResourceRecord::new(id.clone(), kind, attrs.clone()))
            .collect();
        Ok(records)
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<ResourceRecord, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let attrs = tables
            .get(&kind)
            .and_then(|table| table.get(id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;
        Ok(ResourceRecord::new(id.to_string(), kind, attrs.clone()))
    }

    async fn create(&self, record: ResourceRecord) -> Result<ResourceRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(record.kind).or_default();
        if table.contains_key(&record.id) {
            return Err(StoreError::conflict(format!(
                "{} already exists: {}",
                record.kind, record.id
            )));
        }
        if record.kind == ResourceKind::Category {
            let name = record.attr_str("name");
            let scope = record.attr_str("scope");
            if category_name_taken(table, None, name, scope) {
                return Err(StoreError::conflict(format!(
                    "category name already taken in scope: {}",
                    name.unwrap_or_default()
                )));
            }
        }
        table.insert(record.id.clone(), record.attributes.clone());
        Ok(record)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<ResourceRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(kind).or_default();
        let Some(existing) = table.get(id) else {
            return Err(StoreError::not_found(kind, id));
        };
        if kind == ResourceKind::Dashboard && is_yaml_dashboard(existing) {
            return Err(StoreError::conflict(format!("dashboard is yaml-managed: {id}")));
        }
        if kind == ResourceKind::Category {
            let mut merged = existing.clone();
            for (field, value) in &patch {
                merged.insert(field.clone(), value.clone());
            }
            let name = merged.get("name").and_then(Value::as_str);
            let scope = merged.get("scope").and_then(Value::as_str);
            if category_name_taken(table, Some(id), name, scope) {
                return Err(StoreError::conflict(format!(
                    "category name already taken in scope: {}",
                    name.unwrap_or_default()
                )));
            }
        }
        // Constraints passed; apply the patch.
        let Some(attrs) = table.get_mut(id) else {
            return Err(StoreError::not_found(kind, id));
        };
        for (field, value) in patch {
            attrs.insert(field, value);
        }
        Ok(ResourceRecord::new(id.to_string(), kind, attrs.clone()))
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(kind).or_default();
        if kind == ResourceKind::Dashboard {
            if let Some(attrs) = table.get(id) {
                if is_yaml_dashboard(attrs) {
                    return Err(StoreError::conflict(format!("dashboard is yaml-managed: {id}")));
                }
            }
        }
        if table.remove(id).is_none() {
            return Err(StoreError::not_found(kind, id));
        }
        Ok(())
    }

    async fn invoke_verb(
        &self,
        kind: ResourceKind,
        id: &str,
        verb: LifecycleVerb,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let attrs = tables
            .get_mut(&kind)
            .and_then(|table| table.get_mut(id))
            .ok_or_else(|| StoreError::not_found(kind, id))?;
        match verb {
            LifecycleVerb::Enable => {
                attrs.insert("enabled".to_string(), Value::Bool(true));
            }
            LifecycleVerb::Disable => {
                attrs.insert("enabled".to_string(), Value::Bool(false));
            }
            LifecycleVerb::Run => {
                attrs.insert("running".to_string(), Value::Bool(true));
            }
            LifecycleVerb::Stop => {
                attrs.insert("running".to_string(), Value::Bool(false));
            }
            // Activation and manual triggering have no stored footprint here;
            // existence was the only precondition.
            LifecycleVerb::Activate | LifecycleVerb::Trigger => {}
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
