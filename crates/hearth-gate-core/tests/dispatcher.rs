// hearth-gate-core/tests/dispatcher.rs
// ============================================================================
// Module: Dispatcher Tests
// Description: Pipeline tests for the gate-check-validate-execute dispatcher.
// Purpose: Ensure permission, validation, and store stages compose correctly.
// Dependencies: hearth-gate-core, hearth-gate-store-memory, tokio, serde_json
// ============================================================================

//! ## Overview
//! Drives [`Dispatcher::invoke`] against the in-memory store: registry
//! lookup, fail-closed permission checks, payload validation, identifier
//! derivation, and advertisement filtering.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use hearth_gate_core::Call;
use hearth_gate_core::CapabilityConfig;
use hearth_gate_core::Dispatcher;
use hearth_gate_core::HelperDomain;
use hearth_gate_core::KindGrants;
use hearth_gate_core::Operation;
use hearth_gate_core::Outcome;
use hearth_gate_core::ResourceKind;
use hearth_gate_core::SharedCapabilities;
use hearth_gate_core::Surface;
use hearth_gate_store_memory::MemoryResourceStore;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn permissive_dispatcher() -> Dispatcher {
    Dispatcher::new(
        SharedCapabilities::new(CapabilityConfig::permissive()),
        Arc::new(MemoryResourceStore::new()),
    )
}

fn grants_only(group: &str, grants: KindGrants) -> SharedCapabilities {
    let mut config = CapabilityConfig {
        mcp_enabled: true,
        rest_enabled: true,
        ..CapabilityConfig::default()
    };
    config.grants.insert(group.to_string(), grants);
    SharedCapabilities::new(config)
}

#[tokio::test]
async fn unknown_operation_is_rejected_before_the_store() {
    let dispatcher = permissive_dispatcher();
    let call = Call::new(ResourceKind::Dashboard, Operation::Activate, Surface::Mcp)
        .with_id("overview");
    let error = dispatcher.invoke(call).await.unwrap_err();
    assert_eq!(error.code(), "unknown_operation");
}

#[tokio::test]
async fn denied_create_never_reaches_the_store() {
    let capabilities = grants_only(
        "automations",
        KindGrants {
            read: true,
            ..KindGrants::default()
        },
    );
    let store = Arc::new(MemoryResourceStore::new());
    let dispatcher = Dispatcher::new(capabilities, store);
    let call = Call::new(ResourceKind::Automation, Operation::Create, Surface::Mcp)
        .with_payload(map(json!({
            "alias": "Morning lights",
            "triggers": [{"platform": "sun"}],
            "actions": [{"service": "light.turn_on"}],
        })));
    let error = dispatcher.invoke(call).await.unwrap_err();
    assert_eq!(error.code(), "permission_denied");
    let list = Call::new(ResourceKind::Automation, Operation::List, Surface::Mcp);
    match dispatcher.invoke(list).await.unwrap() {
        Outcome::Records(records) => assert!(records.is_empty()),
        other => panic!("expected empty listing, got {other:?}"),
    }
}

#[tokio::test]
async fn create_then_trigger_automation() {
    let dispatcher = permissive_dispatcher();
    let create = Call::new(ResourceKind::Automation, Operation::Create, Surface::Rest)
        .with_payload(map(json!({
            "alias": "Morning lights",
            "triggers": [{"platform": "sun", "event": "sunrise"}],
            "actions": [{"service": "light.turn_on"}],
        })));
    let Outcome::Record(record) = dispatcher.invoke(create).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(record.id, "morning_lights");
    let trigger = Call::new(ResourceKind::Automation, Operation::Trigger, Surface::Rest)
        .with_id(&record.id);
    assert_eq!(dispatcher.invoke(trigger).await.unwrap(), Outcome::Acknowledged);
}

#[tokio::test]
async fn delete_of_absent_record_is_not_found() {
    let dispatcher = permissive_dispatcher();
    let call = Call::new(ResourceKind::Scene, Operation::Delete, Surface::Mcp).with_id("missing");
    let error = dispatcher.invoke(call).await.unwrap_err();
    assert_eq!(error.code(), "not_found");
}

#[tokio::test]
async fn update_validates_against_merged_record() {
    let dispatcher = permissive_dispatcher();
    let kind = ResourceKind::Helper(HelperDomain::InputNumber);
    let create = Call::new(kind, Operation::Create, Surface::Mcp).with_payload(map(json!({
        "name": "Volume",
        "min": 0,
        "max": 10,
        "step": 1,
    })));
    let Outcome::Record(record) = dispatcher.invoke(create).await.unwrap() else {
        panic!("expected a record");
    };
    let patch = Call::new(kind, Operation::Update, Surface::Mcp)
        .with_id(&record.id)
        .with_payload(map(json!({"max": -5})));
    let error = dispatcher.invoke(patch).await.unwrap_err();
    assert_eq!(error.code(), "validation_error");
    // The failed patch left the stored record untouched.
    let get = Call::new(kind, Operation::Get, Surface::Mcp).with_id(&record.id);
    let Outcome::Record(unchanged) = dispatcher.invoke(get).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(unchanged.attributes.get("max"), Some(&json!(10)));
}

#[tokio::test]
async fn missing_id_is_a_validation_error() {
    let dispatcher = permissive_dispatcher();
    let call = Call::new(ResourceKind::Script, Operation::Get, Surface::Rest);
    let error = dispatcher.invoke(call).await.unwrap_err();
    assert_eq!(error.code(), "validation_error");
}

#[tokio::test]
async fn dashboard_id_comes_from_url_path() {
    let dispatcher = permissive_dispatcher();
    let create = Call::new(ResourceKind::Dashboard, Operation::Create, Surface::Rest)
        .with_payload(map(json!({"title": "Energy", "url_path": "energy"})));
    let Outcome::Record(record) = dispatcher.invoke(create).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(record.id, "energy");
    assert_eq!(record.attr_str("url_path"), Some("energy"));
}

#[tokio::test]
async fn same_category_name_creates_in_each_scope() {
    let dispatcher = permissive_dispatcher();
    let automation = Call::new(ResourceKind::Category, Operation::Create, Surface::Mcp)
        .with_payload(map(json!({"name": "Lighting", "scope": "automation"})));
    let Outcome::Record(first) = dispatcher.invoke(automation).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(first.id, "automation_lighting");
    // The same name in a different scope is a distinct category.
    let script = Call::new(ResourceKind::Category, Operation::Create, Surface::Mcp)
        .with_payload(map(json!({"name": "Lighting", "scope": "script"})));
    let Outcome::Record(second) = dispatcher.invoke(script).await.unwrap() else {
        panic!("expected a record");
    };
    assert_eq!(second.id, "script_lighting");
    // Repeating the name within one scope still conflicts.
    let duplicate = Call::new(ResourceKind::Category, Operation::Create, Surface::Mcp)
        .with_payload(map(json!({"name": "Lighting", "scope": "script"})));
    let error = dispatcher.invoke(duplicate).await.unwrap_err();
    assert_eq!(error.code(), "conflict");
}

#[test]
fn advertised_reflects_the_snapshot_per_surface() {
    let capabilities = grants_only(
        "scenes",
        KindGrants {
            read: true,
            update: true,
            ..KindGrants::default()
        },
    );
    let dispatcher = Dispatcher::new(capabilities, Arc::new(MemoryResourceStore::new()));
    let tools: Vec<&str> = dispatcher
        .advertised(Surface::Mcp)
        .into_iter()
        .map(|descriptor| descriptor.tool_name.as_str())
        .collect();
    assert_eq!(
        tools,
        vec!["ha_list_scenes", "ha_get_scene", "ha_update_scene", "ha_activate_scene"]
    );
}

#[test]
fn advertised_shrinks_after_reload() {
    let dispatcher = permissive_dispatcher();
    assert_eq!(dispatcher.advertised(Surface::Mcp).len(), dispatcher.registry().len());
    dispatcher.capabilities().reload(CapabilityConfig::default());
    assert!(dispatcher.advertised(Surface::Mcp).is_empty());
}
