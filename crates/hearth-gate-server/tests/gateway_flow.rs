// hearth-gate-server/tests/gateway_flow.rs
// ============================================================================
// Module: Gateway Flow Tests
// Description: End-to-end tests for the capability-gated dispatch pipeline.
// Purpose: Ensure both surfaces share gating, validation, and error shapes.
// Dependencies: hearth-gate-core, hearth-gate-config, hearth-gate-server
// ============================================================================

//! ## Overview
//! Drives the tool router and dispatcher the way the transports do, from a
//! TOML capability document to final outcomes. Validates fail-closed gating,
//! denial indistinguishability, and the advertised/invocable agreement.

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

use hearth_gate_config::HearthGateConfig;
use hearth_gate_core::Call;
use hearth_gate_core::Dispatcher;
use hearth_gate_core::Operation;
use hearth_gate_core::Outcome;
use hearth_gate_core::ResourceKind;
use hearth_gate_core::SharedCapabilities;
use hearth_gate_core::Surface;
use hearth_gate_server::NoopAuditSink;
use hearth_gate_server::RequestContext;
use hearth_gate_server::ToolRouter;
use hearth_gate_store_memory::MemoryResourceStore;
use serde_json::json;

/// Builds a router from a TOML capability document.
fn router_from_toml(document: &str) -> ToolRouter {
    let config: HearthGateConfig = toml::from_str(document).unwrap();
    config.validate().unwrap();
    let dispatcher = Dispatcher::new(
        SharedCapabilities::new(config.capability_config()),
        Arc::new(MemoryResourceStore::new()),
    );
    ToolRouter::new(Arc::new(dispatcher), Arc::new(NoopAuditSink))
}

#[tokio::test]
async fn granted_lifecycle_flows_end_to_end() {
    let router = router_from_toml(
        r"
        [server]
        rest_enabled = true

        [capabilities.automations]
        read = true
        create = true
        update = true
        delete = true
        ",
    );
    let context = RequestContext::stdio();
    let created = router
        .handle_tool_call(
            &context,
            "ha_create_automation",
            json!({
                "alias": "Morning lights",
                "triggers": [{"platform": "sun", "event": "sunrise"}],
                "actions": [{"service": "light.turn_on"}],
            }),
        )
        .await
        .unwrap();
    let id = created["item"]["id"].as_str().unwrap().to_string();
    assert_eq!(id, "morning_lights");
    // Lifecycle verbs ride on the update grant.
    for tool in ["ha_trigger_automation", "ha_disable_automation", "ha_enable_automation"] {
        let response =
            router.handle_tool_call(&context, tool, json!({"id": id})).await.unwrap();
        assert_eq!(response["status"], json!("ok"), "tool {tool}");
    }
    let deleted =
        router.handle_tool_call(&context, "ha_delete_automation", json!({"id": id})).await.unwrap();
    assert_eq!(deleted["status"], json!("deleted"));
}

#[tokio::test]
async fn disabled_and_unconfigured_kinds_deny_identically() {
    // Scripts configured but all-false; scenes never mentioned.
    let router = router_from_toml(
        r"
        [capabilities.scripts]
        read = false
        ",
    );
    let context = RequestContext::stdio();
    let configured_off =
        router.handle_tool_call(&context, "ha_list_scripts", json!({})).await.unwrap_err();
    let never_configured =
        router.handle_tool_call(&context, "ha_list_scenes", json!({})).await.unwrap_err();
    assert_eq!(configured_off.code(), never_configured.code());
    // The messages differ only by kind label, never by reason.
    assert_eq!(
        configured_off.to_string().replace("script", "scene"),
        never_configured.to_string()
    );
}

#[tokio::test]
async fn advertised_tools_and_invocable_tools_agree() {
    let router = router_from_toml(
        r"
        [capabilities.helpers]
        read = true
        create = true
        ",
    );
    let context = RequestContext::stdio();
    let advertised: Vec<String> =
        router.list_tools().into_iter().map(|tool| tool.name).collect();
    // Every advertised tool is invocable without a permission error.
    for name in &advertised {
        if !name.starts_with("ha_create_") {
            continue;
        }
        let error = router
            .handle_tool_call(&context, name, json!({}))
            .await
            .unwrap_err();
        assert_ne!(error.code(), "permission_denied", "tool {name}");
    }
    // An unadvertised tool on the same kind is denied when invoked directly.
    assert!(!advertised.iter().any(|name| name == "ha_delete_counter"));
    let denied = router
        .handle_tool_call(&context, "ha_delete_counter", json!({"id": "visitors"}))
        .await
        .unwrap_err();
    assert_eq!(denied.code(), "permission_denied");
}

#[tokio::test]
async fn mcp_surface_switch_masks_tools_but_not_rest() {
    let config: HearthGateConfig = toml::from_str(
        r"
        [server]
        mcp_enabled = false
        rest_enabled = true

        [capabilities.labels]
        read = true
        ",
    )
    .unwrap();
    let dispatcher = Arc::new(Dispatcher::new(
        SharedCapabilities::new(config.capability_config()),
        Arc::new(MemoryResourceStore::new()),
    ));
    let router = ToolRouter::new(Arc::clone(&dispatcher), Arc::new(NoopAuditSink));
    assert!(router.list_tools().is_empty());
    // The same grant still works through the REST surface.
    let call = Call::new(ResourceKind::Label, Operation::List, Surface::Rest);
    let outcome = dispatcher.invoke(call).await.unwrap();
    assert_eq!(outcome, Outcome::Records(Vec::new()));
}

#[tokio::test]
async fn capability_reload_takes_effect_without_restart() {
    let permissive: HearthGateConfig = toml::from_str(
        r"
        [capabilities.scenes]
        read = true
        create = true
        update = true
        ",
    )
    .unwrap();
    let locked_down: HearthGateConfig = toml::from_str("").unwrap();
    let dispatcher = Arc::new(Dispatcher::new(
        SharedCapabilities::new(permissive.capability_config()),
        Arc::new(MemoryResourceStore::new()),
    ));
    let router = ToolRouter::new(Arc::clone(&dispatcher), Arc::new(NoopAuditSink));
    let context = RequestContext::stdio();
    router
        .handle_tool_call(&context, "ha_create_scene", json!({"name": "Movie night"}))
        .await
        .unwrap();
    dispatcher.capabilities().reload(locked_down.capability_config());
    let denied = router
        .handle_tool_call(&context, "ha_activate_scene", json!({"id": "movie_night"}))
        .await
        .unwrap_err();
    assert_eq!(denied.code(), "permission_denied");
    assert!(!router.list_tools().iter().any(|tool| tool.name.contains("scene")));
}
