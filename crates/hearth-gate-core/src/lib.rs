// hearth-gate-core/src/lib.rs
// ============================================================================
// Module: Hearth Gate Core
// Description: Dispatch-and-validation engine for the configuration gateway.
// Purpose: Define resource kinds, permissions, validators, and the dispatcher.
// Dependencies: serde, serde_json, thiserror, async-trait, regex
// ============================================================================

//! ## Overview
//! Hearth Gate Core is the dispatch-and-validation engine behind the gateway
//! surfaces. It maps a declarative capability configuration onto allowed
//! operations, validates payloads per resource kind, and routes calls to the
//! external resource store through [`ResourceStore`]. Disabled capabilities
//! are both invisible (not advertised) and unreachable (rejected when invoked
//! directly).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capability;
pub mod dispatch;
pub mod error;
pub mod kinds;
pub mod ops;
pub mod record;
pub mod registry;
pub mod store;
pub mod validate;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
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
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capability::CapabilityConfig;
pub use capability::Decision;
pub use capability::KindGrants;
pub use capability::SharedCapabilities;
pub use capability::Surface;
pub use dispatch::Call;
pub use dispatch::Dispatcher;
pub use dispatch::Outcome;
pub use dispatch::Principal;
pub use error::FieldIssue;
pub use error::GatewayError;
pub use kinds::CategoryScope;
pub use kinds::HelperDomain;
pub use kinds::ResourceKind;
pub use ops::LifecycleVerb;
pub use ops::Operation;
pub use ops::OperationClass;
pub use record::ListFilter;
pub use record::ResourceRecord;
pub use registry::OperationDescriptor;
pub use registry::OperationRegistry;
pub use store::ResourceStore;
pub use store::StoreError;
pub use validate::ValidateMode;
pub use validate::validate_payload;
