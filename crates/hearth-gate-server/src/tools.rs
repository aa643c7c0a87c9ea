// hearth-gate-server/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool listing and call adaptation for the MCP surface.
// Purpose: Expose thin tool wrappers over the shared dispatcher.
// Dependencies: hearth-gate-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The tool router adapts MCP tool calls into dispatcher calls. Handlers are
//! thin: argument extraction happens here, everything else (permissions,
//! validation, store access) happens in the dispatcher. The tool listing is
//! computed from the live capability snapshot on every `tools/list`, so a
//! reload changes what is advertised without a restart.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hearth_gate_core::Call;
use hearth_gate_core::Dispatcher;
use hearth_gate_core::FieldIssue;
use hearth_gate_core::GatewayError;
use hearth_gate_core::ListFilter;
use hearth_gate_core::Operation;
use hearth_gate_core::OperationDescriptor;
use hearth_gate_core::Outcome;
use hearth_gate_core::Principal;
use hearth_gate_core::ResourceKind;
use hearth_gate_core::Surface;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::audit::DispatchAuditEvent;
use crate::audit::GatewayAuditSink;
use crate::server::RequestContext;

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// Advertised MCP tool definition.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable tool description.
    pub description: String,
    /// JSON schema for the tool arguments.
    pub input_schema: Value,
}

/// Builds the advertised definition for one registry descriptor.
fn tool_definition(descriptor: &OperationDescriptor) -> ToolDefinition {
    ToolDefinition {
        name: descriptor.tool_name.clone(),
        description: humanize(&descriptor.tool_name),
        input_schema: input_schema(descriptor),
    }
}

/// Turns a tool name like `ha_list_input_numbers` into readable prose.
fn humanize(tool_name: &str) -> String {
    let words = tool_name.strip_prefix("ha_").unwrap_or(tool_name).replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => words,
    }
}

/// Builds the argument schema for one registry descriptor.
fn input_schema(descriptor: &OperationDescriptor) -> Value {
    let id_field = descriptor.kind.id_field();
    match descriptor.operation {
        Operation::List => {
            if descriptor.kind == ResourceKind::Category {
                json!({
                    "type": "object",
                    "properties": {
                        "scope": {
                            "type": "string",
                            "enum": ["automation", "script", "helper"],
                        },
                    },
                })
            } else {
                json!({"type": "object", "properties": {}})
            }
        }
        Operation::Create => json!({
            "type": "object",
            "description": "Attribute payload for the new record.",
        }),
        Operation::Update => json!({
            "type": "object",
            "description": "Partial attribute patch; unnamed fields keep their stored values.",
            "required": [id_field],
            "properties": {
                (id_field): {"type": "string"},
            },
        }),
        _ => json!({
            "type": "object",
            "required": [id_field],
            "properties": {
                (id_field): {"type": "string"},
            },
        }),
    }
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Tool router for MCP requests.
#[derive(Clone)]
pub struct ToolRouter {
    /// Shared dispatcher.
    dispatcher: Arc<Dispatcher>,
    /// Audit sink for dispatched calls.
    audit: Arc<dyn GatewayAuditSink>,
}

impl ToolRouter {
    /// Builds a tool router over a dispatcher.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, audit: Arc<dyn GatewayAuditSink>) -> Self {
        Self {
            dispatcher,
            audit,
        }
    }

    /// Returns the dispatcher behind the router.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Lists the tools permitted by the current capability snapshot.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.dispatcher.advertised(Surface::Mcp).into_iter().map(tool_definition).collect()
    }

    /// Handles one MCP tool call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the tool is unknown or the dispatcher
    /// rejects the call.
    pub async fn handle_tool_call(
        &self,
        context: &RequestContext,
        name: &str,
        arguments: Value,
    ) -> Result<Value, GatewayError> {
        let Some(descriptor) = self.dispatcher.registry().resolve_tool(name) else {
            return Err(GatewayError::UnknownOperation {
                kind: "tool".to_string(),
                operation: name.to_string(),
            });
        };
        let kind = descriptor.kind;
        let operation = descriptor.operation;
        let call = build_call(descriptor, arguments, context)?;
        let result = self.dispatcher.invoke(call).await;
        self.audit.record(&DispatchAuditEvent::new(
            Surface::Mcp,
            context.principal.as_str(),
            kind.as_str(),
            operation.as_str().to_string(),
            result.as_ref().map(|_| ()),
            context.request_id.clone(),
        ));
        result.map(outcome_to_json)
    }
}

/// Adapts tool arguments into a dispatcher call.
fn build_call(
    descriptor: &OperationDescriptor,
    arguments: Value,
    context: &RequestContext,
) -> Result<Call, GatewayError> {
    let arguments = match arguments {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(GatewayError::Validation {
                issues: vec![FieldIssue::new("arguments", "must be an object")],
            });
        }
    };
    let mut call = Call::new(descriptor.kind, descriptor.operation, Surface::Mcp)
        .with_principal(Principal::new(context.principal.as_str()));
    match descriptor.operation {
        Operation::List => {
            let scope =
                arguments.get("scope").and_then(Value::as_str).map(str::to_string);
            call = call.with_filter(ListFilter {
                scope,
            });
        }
        Operation::Create => {
            call = call.with_payload(arguments);
        }
        Operation::Update => {
            if let Some(id) = extract_id(descriptor.kind, &arguments) {
                call = call.with_id(id);
            }
            call = call.with_payload(arguments);
        }
        _ => {
            if let Some(id) = extract_id(descriptor.kind, &arguments) {
                call = call.with_id(id);
            }
        }
    }
    Ok(call)
}

/// Extracts the target identifier from tool arguments.
fn extract_id(kind: ResourceKind, arguments: &Map<String, Value>) -> Option<String> {
    arguments.get(kind.id_field()).and_then(Value::as_str).map(str::to_string)
}

/// Serializes a dispatch outcome for the tool response.
fn outcome_to_json(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Record(record) => json!({"item": record}),
        Outcome::Records(records) => json!({"count": records.len(), "items": records}),
        Outcome::Acknowledged => json!({"status": "ok"}),
        Outcome::Deleted => json!({"status": "deleted"}),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
