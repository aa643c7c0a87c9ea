// hearth-gate-server/src/server.rs
// ============================================================================
// Module: Gateway Server
// Description: Server implementations for stdio and HTTP transports.
// Purpose: Expose gateway tools via JSON-RPC 2.0 and REST routes.
// Dependencies: hearth-gate-core, hearth-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! The gateway server exposes the tool router over JSON-RPC 2.0 on stdio or
//! HTTP, and mounts the REST routes alongside `/rpc` when the REST surface is
//! enabled. All inputs are untrusted: framing is size-limited, malformed
//! requests get JSON-RPC error envelopes, and nothing is logged beyond the
//! audit events the router emits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use hearth_gate_config::HearthGateConfig;
use hearth_gate_config::Transport;
use hearth_gate_core::Dispatcher;
use hearth_gate_core::GatewayError;
use hearth_gate_core::Principal;
use hearth_gate_core::SharedCapabilities;
use hearth_gate_store_memory::MemoryResourceStore;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;

use crate::audit::StderrAuditSink;
use crate::rest::rest_router;
use crate::tools::ToolDefinition;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Transport-level context attached to each request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Caller identity supplied by the transport.
    pub principal: Principal,
    /// Peer IP address when the transport has one.
    pub peer_ip: Option<IpAddr>,
    /// JSON-RPC request identifier, once known.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Context for the stdio transport.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            principal: Principal::new("stdio"),
            peer_ip: None,
            request_id: None,
        }
    }

    /// Context for an HTTP request.
    #[must_use]
    pub fn http(peer: Option<IpAddr>, principal: Principal) -> Self {
        Self {
            principal,
            peer_ip: peer,
            request_id: None,
        }
    }

    /// Attaches the JSON-RPC request identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

// ============================================================================
// SECTION: Gateway Server
// ============================================================================

/// Gateway server instance.
pub struct GatewayServer {
    /// Server configuration.
    config: HearthGateConfig,
    /// Tool router for MCP dispatch.
    router: ToolRouter,
}

impl GatewayServer {
    /// Builds a server over the in-process store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayServerError`] when the configuration is invalid.
    pub fn from_config(config: HearthGateConfig) -> Result<Self, GatewayServerError> {
        config.validate().map_err(|err| GatewayServerError::Config(err.to_string()))?;
        let capabilities = SharedCapabilities::new(config.capability_config());
        let store = Arc::new(MemoryResourceStore::new());
        let dispatcher = Arc::new(Dispatcher::new(capabilities, store));
        let router = ToolRouter::new(dispatcher, Arc::new(StderrAuditSink));
        emit_exposure_warning(&config);
        Ok(Self {
            config,
            router,
        })
    }

    /// Returns the tool router.
    #[must_use]
    pub const fn router(&self) -> &ToolRouter {
        &self.router
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), GatewayServerError> {
        let max_body_bytes = self.config.server.max_body_bytes;
        match self.config.server.transport {
            Transport::Stdio => serve_stdio(&self.router, max_body_bytes).await,
            Transport::Http => serve_http(self.config, self.router).await,
        }
    }
}

/// Warns when the HTTP transport is bound beyond loopback.
fn emit_exposure_warning(config: &HearthGateConfig) {
    if config.server.transport == Transport::Http && !config.server.is_local_only() {
        eprintln!(
            "hearth-gate: WARNING: http transport bound to a non-loopback address; the gateway \
             performs no authentication and should sit behind one"
        );
    }
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout.
async fn serve_stdio(router: &ToolRouter, max_body_bytes: usize) -> Result<(), GatewayServerError> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    loop {
        let Some(bytes) = read_framed(&mut reader, max_body_bytes).await? else {
            // Clean EOF: the client hung up.
            return Ok(());
        };
        let context = RequestContext::stdio();
        let response = match serde_json::from_slice::<JsonRpcRequest>(&bytes) {
            Ok(request) => handle_request(router, &context, request).await.1,
            Err(_) => invalid_request_envelope(),
        };
        let payload = serde_json::to_vec(&response).map_err(|_| {
            GatewayServerError::Transport("json-rpc serialization failed".to_string())
        })?;
        write_framed(&mut writer, &payload).await?;
    }
}

/// Reads a framed stdio payload using MCP Content-Length headers.
///
/// Returns `None` on a clean end of stream.
async fn read_framed(
    reader: &mut BufReader<tokio::io::Stdin>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, GatewayServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|_| GatewayServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            return if content_length.is_none() {
                Ok(None)
            } else {
                Err(GatewayServerError::Transport("stdio closed mid-frame".to_string()))
            };
        }
        if line.trim().is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value.trim().parse::<usize>().map_err(|_| {
                GatewayServerError::Transport("invalid content length".to_string())
            })?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| GatewayServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(GatewayServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|_| GatewayServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
async fn write_framed(
    writer: &mut tokio::io::Stdout,
    payload: &[u8],
) -> Result<(), GatewayServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .await
        .map_err(|_| GatewayServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .await
        .map_err(|_| GatewayServerError::Transport("stdio write failed".to_string()))?;
    writer
        .flush()
        .await
        .map_err(|_| GatewayServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves JSON-RPC and REST requests over HTTP.
async fn serve_http(
    config: HearthGateConfig,
    router: ToolRouter,
) -> Result<(), GatewayServerError> {
    let addr = config.server.bind;
    let max_body_bytes = config.server.max_body_bytes;
    let state = Arc::new(ServerState {
        router: router.clone(),
        max_body_bytes,
    });
    let mut app = Router::new().route("/rpc", post(handle_http)).with_state(state);
    if config.server.rest_enabled {
        let dispatcher = Arc::clone(router.dispatcher());
        app = app.merge(rest_router(dispatcher, Arc::new(StderrAuditSink), max_body_bytes));
    }
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| GatewayServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|_| GatewayServerError::Transport("http server failed".to_string()))
}

/// Shared server state for the HTTP JSON-RPC handler.
#[derive(Clone)]
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Header naming the calling principal for audit purposes.
const PRINCIPAL_HEADER: &str = "x-hearth-gate-principal";

/// Handles HTTP JSON-RPC requests.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> impl IntoResponse {
    let principal = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(Principal::anonymous, Principal::new);
    let context = RequestContext::http(Some(peer.ip()), principal);
    if bytes.len() > state.max_body_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            axum::Json(JsonRpcResponse {
                jsonrpc: "2.0",
                id: Value::Null,
                result: None,
                error: Some(JsonRpcError {
                    code: -32070,
                    message: "request body too large".to_string(),
                }),
            }),
        );
    }
    let response = match serde_json::from_slice::<JsonRpcRequest>(bytes.as_ref()) {
        Ok(request) => handle_request(&state.router, &context, request).await,
        Err(_) => (StatusCode::BAD_REQUEST, invalid_request_envelope()),
    };
    (response.0, axum::Json(response.1))
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Advertised tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Builds the envelope for an unparseable request.
fn invalid_request_envelope() -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id: Value::Null,
        result: None,
        error: Some(JsonRpcError {
            code: -32600,
            message: "invalid json-rpc request".to_string(),
        }),
    }
}

/// Dispatches a JSON-RPC request to the tool router.
async fn handle_request(
    router: &ToolRouter,
    base_context: &RequestContext,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    let context = base_context.clone().with_request_id(request.id.to_string());
    if request.jsonrpc != "2.0" {
        return (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32600,
                    message: "invalid json-rpc version".to_string(),
                }),
            },
        );
    }
    match request.method.as_str() {
        "tools/list" => {
            let tools = router.list_tools();
            match serde_json::to_value(ToolListResult {
                tools,
            }) {
                Ok(value) => (
                    StatusCode::OK,
                    JsonRpcResponse {
                        jsonrpc: "2.0",
                        id: request.id,
                        result: Some(value),
                        error: None,
                    },
                ),
                Err(_) => serialization_error(request.id),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<ToolCallParams>(params) {
                Ok(call) => {
                    match router.handle_tool_call(&context, &call.name, call.arguments).await {
                        Ok(result) => (
                            StatusCode::OK,
                            JsonRpcResponse {
                                jsonrpc: "2.0",
                                id,
                                result: Some(result),
                                error: None,
                            },
                        ),
                        Err(error) => jsonrpc_error(id, &error),
                    }
                }
                Err(_) => (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse {
                        jsonrpc: "2.0",
                        id,
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32602,
                            message: "invalid tool params".to_string(),
                        }),
                    },
                ),
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: "method not found".to_string(),
                }),
            },
        ),
    }
}

/// Builds a JSON-RPC serialization failure response.
fn serialization_error(id: Value) -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::OK,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code: -32060,
                message: "serialization failed".to_string(),
            }),
        },
    )
}

/// Builds a JSON-RPC error response for a gateway failure.
fn jsonrpc_error(id: Value, error: &GatewayError) -> (StatusCode, JsonRpcResponse) {
    let (status, code) = match error {
        GatewayError::UnknownOperation {
            ..
        } => (StatusCode::BAD_REQUEST, -32601),
        GatewayError::PermissionDenied {
            ..
        } => (StatusCode::FORBIDDEN, -32003),
        GatewayError::Validation {
            ..
        } => (StatusCode::BAD_REQUEST, -32602),
        GatewayError::NotFound {
            ..
        } => (StatusCode::OK, -32004),
        GatewayError::Conflict {
            ..
        } => (StatusCode::OK, -32009),
        GatewayError::Cancelled => (StatusCode::OK, -32080),
        GatewayError::Backend {
            ..
        } => (StatusCode::OK, -32050),
    };
    (
        status,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: error.to_string(),
            }),
        },
    )
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
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
        reason = "Test-only envelope assertions."
    )]

    use std::sync::Arc;

    use hearth_gate_core::CapabilityConfig;
    use hearth_gate_core::Dispatcher;
    use hearth_gate_core::GatewayError;
    use hearth_gate_core::SharedCapabilities;
    use hearth_gate_store_memory::MemoryResourceStore;
    use serde_json::Value;
    use serde_json::json;

    use super::JsonRpcRequest;
    use super::RequestContext;
    use super::handle_request;
    use super::jsonrpc_error;
    use crate::audit::NoopAuditSink;
    use crate::tools::ToolRouter;

    fn router() -> ToolRouter {
        let dispatcher = Dispatcher::new(
            SharedCapabilities::new(CapabilityConfig::permissive()),
            Arc::new(MemoryResourceStore::new()),
        );
        ToolRouter::new(Arc::new(dispatcher), Arc::new(NoopAuditSink))
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: json!(1),
            method: method.to_string(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn wrong_jsonrpc_version_is_rejected() {
        let router = router();
        let mut bad = request("tools/list", Value::Null);
        bad.jsonrpc = "1.0".to_string();
        let (_, response) = handle_request(&router, &RequestContext::stdio(), bad).await;
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn tools_list_returns_definitions() {
        let router = router();
        let (_, response) =
            handle_request(&router, &RequestContext::stdio(), request("tools/list", Value::Null))
                .await;
        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert!(!tools.is_empty());
        assert!(tools.iter().all(|tool| tool["name"].as_str().is_some()));
    }

    #[tokio::test]
    async fn tools_call_round_trips_a_create() {
        let router = router();
        let params = json!({
            "name": "ha_create_label",
            "arguments": {"name": "Upstairs", "color": "#fff"},
        });
        let (_, response) =
            handle_request(&router, &RequestContext::stdio(), request("tools/call", params)).await;
        let result = response.result.unwrap();
        assert_eq!(result["item"]["id"], json!("upstairs"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let router = router();
        let (_, response) =
            handle_request(&router, &RequestContext::stdio(), request("tools/prod", Value::Null))
                .await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn gateway_errors_keep_stable_rpc_codes() {
        let denied = GatewayError::PermissionDenied {
            kind: "script".to_string(),
            operation: "run".to_string(),
        };
        let (status, response) = jsonrpc_error(json!(7), &denied);
        assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
        assert_eq!(response.error.unwrap().code, -32003);
    }
}
