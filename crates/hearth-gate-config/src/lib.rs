// hearth-gate-config/src/lib.rs
// ============================================================================
// Module: Hearth Gate Config
// Description: Configuration loading for the configuration gateway.
// Purpose: Parse and validate the capability document and server settings.
// Dependencies: hearth-gate-core, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Loads the gateway's TOML configuration with strict size and path limits.
//! The capability tables are declarative and fail closed: a missing table
//! denies every operation on that kind, and validation rejects documents the
//! gateway cannot honour rather than guessing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CapabilitiesConfig;
pub use config::ConfigError;
pub use config::HearthGateConfig;
pub use config::ServerConfig;
pub use config::Transport;
