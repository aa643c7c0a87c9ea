// hearth-gate-server/src/lib.rs
// ============================================================================
// Module: Hearth Gate Server
// Description: MCP and REST surfaces over the shared dispatcher.
// Purpose: Expose gateway operations via JSON-RPC tools and REST routes.
// Dependencies: hearth-gate-core, hearth-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! The server crate hosts both gateway surfaces. MCP tool calls and REST
//! requests are adapted into the same [`hearth_gate_core::Call`] shape and
//! flow through one dispatcher, so permission checks and validation cannot
//! diverge between surfaces. Tool listings are filtered to the current
//! capability snapshot; disabled operations are absent, not marked disabled.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod rest;
pub mod server;
pub mod tools;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::DispatchAuditEvent;
pub use audit::GatewayAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use server::GatewayServer;
pub use server::GatewayServerError;
pub use server::RequestContext;
pub use tools::ToolDefinition;
pub use tools::ToolRouter;
