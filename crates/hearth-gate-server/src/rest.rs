// hearth-gate-server/src/rest.rs
// ============================================================================
// Module: REST Surface
// Description: REST routes over the shared dispatcher.
// Purpose: Expose gateway operations as resource-style HTTP endpoints.
// Dependencies: hearth-gate-core, axum, serde_json
// ============================================================================

//! ## Overview
//! REST routes live under `/api/hearth/` and are adapters only: each handler
//! builds a [`Call`] and hands it to the dispatcher. Collection names come
//! from the operation registry, so the REST layout and the tool names can
//! never drift apart. Error responses carry the same stable codes as the MCP
//! surface; a denied request looks identical whether the kind is disabled or
//! was never configured.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use hearth_gate_core::Call;
use hearth_gate_core::Dispatcher;
use hearth_gate_core::FieldIssue;
use hearth_gate_core::GatewayError;
use hearth_gate_core::HelperDomain;
use hearth_gate_core::ListFilter;
use hearth_gate_core::Operation;
use hearth_gate_core::Outcome;
use hearth_gate_core::Principal;
use hearth_gate_core::ResourceKind;
use hearth_gate_core::Surface;
use serde_json::Value;
use serde_json::json;

use crate::audit::DispatchAuditEvent;
use crate::audit::GatewayAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header naming the calling principal for audit purposes.
const PRINCIPAL_HEADER: &str = "x-hearth-gate-principal";

// ============================================================================
// SECTION: Router
// ============================================================================

/// Shared state for REST handlers.
pub struct RestState {
    /// Shared dispatcher.
    dispatcher: Arc<Dispatcher>,
    /// Audit sink for dispatched calls.
    audit: Arc<dyn GatewayAuditSink>,
    /// Collection-name lookup derived from the registry.
    collections: BTreeMap<String, ResourceKind>,
}

/// Builds the REST router under `/api/hearth/`.
#[must_use]
pub fn rest_router(
    dispatcher: Arc<Dispatcher>,
    audit: Arc<dyn GatewayAuditSink>,
    max_body_bytes: usize,
) -> Router {
    let state = Arc::new(RestState {
        collections: collection_table(&dispatcher),
        dispatcher,
        audit,
    });
    Router::new()
        .route("/api/hearth/helpers/{domain}", get(list_helpers).post(create_helper))
        .route(
            "/api/hearth/helpers/{domain}/{id}",
            get(get_helper).patch(update_helper).delete(delete_helper),
        )
        .route("/api/hearth/{collection}", get(list_records).post(create_record))
        .route(
            "/api/hearth/{collection}/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .route("/api/hearth/{collection}/{id}/{verb}", post(invoke_verb))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Builds the collection-name lookup for non-helper kinds.
fn collection_table(dispatcher: &Dispatcher) -> BTreeMap<String, ResourceKind> {
    dispatcher
        .registry()
        .iter()
        .filter(|descriptor| {
            descriptor.operation == Operation::List
                && !matches!(descriptor.kind, ResourceKind::Helper(_))
        })
        .map(|descriptor| (descriptor.rest_path.clone(), descriptor.kind))
        .collect()
}

// ============================================================================
// SECTION: Collection Handlers
// ============================================================================

/// `GET /api/hearth/{collection}`
async fn list_records(
    State(state): State<Arc<RestState>>,
    Path(collection): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    let call = Call::new(kind, Operation::List, Surface::Rest)
        .with_filter(ListFilter {
            scope: query.get("scope").cloned(),
        })
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// `POST /api/hearth/{collection}`
async fn create_record(
    State(state): State<Arc<RestState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    create_call(&state, kind, body, &headers).await
}

/// `GET /api/hearth/{collection}/{id}`
async fn get_record(
    State(state): State<Arc<RestState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    let call = Call::new(kind, Operation::Get, Surface::Rest)
        .with_id(id)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// `PATCH /api/hearth/{collection}/{id}`
async fn update_record(
    State(state): State<Arc<RestState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    update_call(&state, kind, id, body, &headers).await
}

/// `DELETE /api/hearth/{collection}/{id}`
async fn delete_record(
    State(state): State<Arc<RestState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    let call = Call::new(kind, Operation::Delete, Surface::Rest)
        .with_id(id)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// `POST /api/hearth/{collection}/{id}/{verb}`
async fn invoke_verb(
    State(state): State<Arc<RestState>>,
    Path((collection, id, verb)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = state.collections.get(&collection).copied() else {
        return unknown_collection(&collection);
    };
    let Some(operation) = Operation::parse(&verb).filter(|op| op.lifecycle_verb().is_some())
    else {
        // Same shape as an unregistered (kind, operation) pair.
        return error_response(&GatewayError::UnknownOperation {
            kind: kind.as_str(),
            operation: verb,
        });
    };
    let call = Call::new(kind, operation, Surface::Rest)
        .with_id(id)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

// ============================================================================
// SECTION: Helper Handlers
// ============================================================================

/// `GET /api/hearth/helpers/{domain}`
async fn list_helpers(
    State(state): State<Arc<RestState>>,
    Path(domain): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = helper_kind(&domain) else {
        return unknown_collection(&domain);
    };
    let call = Call::new(kind, Operation::List, Surface::Rest)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// `POST /api/hearth/helpers/{domain}`
async fn create_helper(
    State(state): State<Arc<RestState>>,
    Path(domain): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(kind) = helper_kind(&domain) else {
        return unknown_collection(&domain);
    };
    create_call(&state, kind, body, &headers).await
}

/// `GET /api/hearth/helpers/{domain}/{id}`
async fn get_helper(
    State(state): State<Arc<RestState>>,
    Path((domain, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = helper_kind(&domain) else {
        return unknown_collection(&domain);
    };
    let call = Call::new(kind, Operation::Get, Surface::Rest)
        .with_id(id)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// `PATCH /api/hearth/helpers/{domain}/{id}`
async fn update_helper(
    State(state): State<Arc<RestState>>,
    Path((domain, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(kind) = helper_kind(&domain) else {
        return unknown_collection(&domain);
    };
    update_call(&state, kind, id, body, &headers).await
}

/// `DELETE /api/hearth/helpers/{domain}/{id}`
async fn delete_helper(
    State(state): State<Arc<RestState>>,
    Path((domain, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = helper_kind(&domain) else {
        return unknown_collection(&domain);
    };
    let call = Call::new(kind, Operation::Delete, Surface::Rest)
        .with_id(id)
        .with_principal(principal_from(&headers));
    execute(&state, call).await
}

/// Parses a helper domain path segment.
fn helper_kind(domain: &str) -> Option<ResourceKind> {
    HelperDomain::parse(domain).map(ResourceKind::Helper)
}

// ============================================================================
// SECTION: Call Plumbing
// ============================================================================

/// Builds and executes a create call from a JSON body.
async fn create_call(
    state: &Arc<RestState>,
    kind: ResourceKind,
    body: Value,
    headers: &HeaderMap,
) -> Response {
    let Value::Object(payload) = body else {
        return error_response(&GatewayError::Validation {
            issues: vec![FieldIssue::new("body", "must be a JSON object")],
        });
    };
    let call = Call::new(kind, Operation::Create, Surface::Rest)
        .with_payload(payload)
        .with_principal(principal_from(headers));
    execute(state, call).await
}

/// Builds and executes an update call from a JSON body.
async fn update_call(
    state: &Arc<RestState>,
    kind: ResourceKind,
    id: String,
    body: Value,
    headers: &HeaderMap,
) -> Response {
    let Value::Object(payload) = body else {
        return error_response(&GatewayError::Validation {
            issues: vec![FieldIssue::new("body", "must be a JSON object")],
        });
    };
    let call = Call::new(kind, Operation::Update, Surface::Rest)
        .with_id(id)
        .with_payload(payload)
        .with_principal(principal_from(headers));
    execute(state, call).await
}

/// Runs a call through the dispatcher and renders the HTTP response.
async fn execute(state: &Arc<RestState>, call: Call) -> Response {
    let kind = call.kind;
    let operation = call.operation;
    let principal = call.principal.clone();
    let result = state.dispatcher.invoke(call).await;
    state.audit.record(&DispatchAuditEvent::new(
        Surface::Rest,
        principal.as_str(),
        kind.as_str(),
        operation.as_str().to_string(),
        result.as_ref().map(|_| ()),
        None,
    ));
    match result {
        Ok(outcome) => outcome_response(operation, outcome),
        Err(error) => error_response(&error),
    }
}

/// Extracts the audit principal from request headers.
fn principal_from(headers: &HeaderMap) -> Principal {
    headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(Principal::anonymous, Principal::new)
}

// ============================================================================
// SECTION: Response Rendering
// ============================================================================

/// Renders a successful outcome.
fn outcome_response(operation: Operation, outcome: Outcome) -> Response {
    let status = if operation == Operation::Create {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let body = match outcome {
        Outcome::Record(record) => json!({"item": record}),
        Outcome::Records(records) => json!({"count": records.len(), "items": records}),
        Outcome::Acknowledged => json!({"status": "ok"}),
        Outcome::Deleted => json!({"status": "deleted"}),
    };
    (status, Json(body)).into_response()
}

/// Renders a gateway error with its stable code.
fn error_response(error: &GatewayError) -> Response {
    let mut body = json!({
        "error": {
            "code": error.code(),
            "message": error.to_string(),
        },
    });
    if let GatewayError::Validation {
        issues,
    } = error
    {
        body["error"]["issues"] = json!(issues);
    }
    (error_status(error), Json(body)).into_response()
}

/// Uniform response for collections that do not exist.
fn unknown_collection(collection: &str) -> Response {
    error_response(&GatewayError::UnknownOperation {
        kind: collection.to_string(),
        operation: "list".to_string(),
    })
}

/// Maps gateway errors onto HTTP status codes.
fn error_status(error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::UnknownOperation {
            ..
        }
        | GatewayError::NotFound {
            ..
        } => StatusCode::NOT_FOUND,
        GatewayError::PermissionDenied {
            ..
        } => StatusCode::FORBIDDEN,
        GatewayError::Validation {
            ..
        } => StatusCode::BAD_REQUEST,
        GatewayError::Conflict {
            ..
        } => StatusCode::CONFLICT,
        GatewayError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        GatewayError::Backend {
            ..
        } => StatusCode::INTERNAL_SERVER_ERROR,
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

    use std::sync::Arc;

    use axum::http::StatusCode;
    use hearth_gate_core::CapabilityConfig;
    use hearth_gate_core::Dispatcher;
    use hearth_gate_core::FieldIssue;
    use hearth_gate_core::GatewayError;
    use hearth_gate_core::ResourceKind;
    use hearth_gate_core::SharedCapabilities;
    use hearth_gate_store_memory::MemoryResourceStore;

    use super::collection_table;
    use super::error_status;
    use super::helper_kind;

    #[test]
    fn error_codes_map_onto_http_statuses() {
        let denied = GatewayError::PermissionDenied {
            kind: "automation".to_string(),
            operation: "create".to_string(),
        };
        assert_eq!(error_status(&denied), StatusCode::FORBIDDEN);
        let invalid = GatewayError::Validation {
            issues: vec![FieldIssue::new("alias", "is required")],
        };
        assert_eq!(error_status(&invalid), StatusCode::BAD_REQUEST);
        let conflict = GatewayError::Conflict {
            message: "taken".to_string(),
        };
        assert_eq!(error_status(&conflict), StatusCode::CONFLICT);
        let missing = GatewayError::NotFound {
            message: "gone".to_string(),
        };
        assert_eq!(error_status(&missing), StatusCode::NOT_FOUND);
    }

    #[test]
    fn collection_table_covers_every_non_helper_kind() {
        let dispatcher = Dispatcher::new(
            SharedCapabilities::new(CapabilityConfig::permissive()),
            Arc::new(MemoryResourceStore::new()),
        );
        let table = collection_table(&dispatcher);
        assert_eq!(table.get("dashboards"), Some(&ResourceKind::Dashboard));
        assert_eq!(table.get("automations"), Some(&ResourceKind::Automation));
        assert_eq!(table.get("categories"), Some(&ResourceKind::Category));
        assert_eq!(table.len(), 6);
        assert!(!table.contains_key("helpers/input_number"));
    }

    #[test]
    fn helper_segments_parse_to_helper_kinds() {
        assert!(helper_kind("input_select").is_some());
        assert!(helper_kind("thermostat").is_none());
    }
}
