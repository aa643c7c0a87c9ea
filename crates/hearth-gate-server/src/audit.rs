// hearth-gate-server/src/audit.rs
// ============================================================================
// Module: Gateway Audit Logging
// Description: Structured audit events for dispatched gateway calls.
// Purpose: Emit one JSON line per call without hard logging dependencies.
// Dependencies: hearth-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every dispatched call produces one audit event naming the surface,
//! principal, kind, operation, and outcome. Denied calls are recorded with
//! the same uniform code the caller sees; the audit stream never reveals more
//! about a denial than the response does. Sinks are intentionally small so
//! deployments can route events into their own pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use hearth_gate_core::GatewayError;
use hearth_gate_core::Surface;
use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event payload for one dispatched call.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Surface the call arrived on.
    pub surface: &'static str,
    /// Caller identity supplied by the transport.
    pub principal: String,
    /// Target resource kind label.
    pub kind: String,
    /// Requested operation label.
    pub operation: String,
    /// Stable outcome code: `ok` or the gateway error code.
    pub outcome: &'static str,
    /// Request identifier when the transport carries one.
    pub request_id: Option<String>,
}

impl DispatchAuditEvent {
    /// Builds an event for a completed call.
    #[must_use]
    pub fn new(
        surface: Surface,
        principal: &str,
        kind: String,
        operation: String,
        result: Result<(), &GatewayError>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            event: "gateway_dispatch",
            timestamp_ms: epoch_millis(),
            surface: surface.as_str(),
            principal: principal.to_string(),
            kind,
            operation,
            outcome: match result {
                Ok(()) => "ok",
                Err(error) => error.code(),
            },
            request_id,
        }
    }
}

/// Returns the current time as milliseconds since the epoch.
fn epoch_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_millis()).unwrap_or(0)
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for dispatched gateway calls.
pub trait GatewayAuditSink: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: &DispatchAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GatewayAuditSink for StderrAuditSink {
    fn record(&self, event: &DispatchAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl GatewayAuditSink for NoopAuditSink {
    fn record(&self, _event: &DispatchAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
