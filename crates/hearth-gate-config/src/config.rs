// hearth-gate-config/src/config.rs
// ============================================================================
// Module: Hearth Gate Configuration
// Description: Configuration loading and validation for Hearth Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: hearth-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing capability tables deny; only the document's explicit grants open
//! anything up. Unknown keys are tolerated so a newer document still loads on
//! an older gateway, but a document version the gateway does not understand
//! is rejected outright.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use hearth_gate_core::CapabilityConfig;
use hearth_gate_core::KindGrants;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "hearth-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "HEARTH_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Configuration document version this gateway understands.
pub(crate) const SUPPORTED_CONFIG_VERSION: u32 = 1;
/// Minimum allowed request body limit in bytes.
pub(crate) const MIN_BODY_BYTES: usize = 1024;
/// Maximum allowed request body limit in bytes.
pub(crate) const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default request body limit in bytes.
pub(crate) const DEFAULT_BODY_BYTES: usize = 1024 * 1024;
/// Default HTTP bind address (loopback only).
const DEFAULT_BIND_PORT: u16 = 8787;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Hearth Gate configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct HearthGateConfig {
    /// Document schema version; must match the supported version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Server and transport configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-kind capability grant tables.
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
}

impl HearthGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then `HEARTH_GATE_CONFIG`, then
    /// `hearth-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {} (supported: {SUPPORTED_CONFIG_VERSION})",
                self.version
            )));
        }
        self.server.validate()?;
        Ok(())
    }

    /// Builds the runtime capability snapshot from the document.
    #[must_use]
    pub fn capability_config(&self) -> CapabilityConfig {
        CapabilityConfig {
            mcp_enabled: self.server.mcp_enabled,
            rest_enabled: self.server.rest_enabled,
            grants: self.capabilities.grant_table(),
        }
    }
}

impl Default for HearthGateConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            server: ServerConfig::default(),
            capabilities: CapabilitiesConfig::default(),
        }
    }
}

/// Transport the server binary speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// JSON-RPC and REST over HTTP.
    Http,
}

/// Server and transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport selection.
    #[serde(default = "default_transport")]
    pub transport: Transport,
    /// HTTP bind address; ignored by the stdio transport.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    /// Maximum accepted request body in bytes.
    #[serde(default = "default_body_bytes")]
    pub max_body_bytes: usize,
    /// Master switch for the MCP tool surface.
    #[serde(default = "default_true")]
    pub mcp_enabled: bool,
    /// Master switch for the REST surface.
    #[serde(default)]
    pub rest_enabled: bool,
}

impl ServerConfig {
    /// Validates server settings against hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when server settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes < MIN_BODY_BYTES || self.max_body_bytes > MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between {MIN_BODY_BYTES} and {MAX_BODY_BYTES}"
            )));
        }
        Ok(())
    }

    /// Returns true when the bind address is loopback-only.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.bind.ip().is_loopback()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            bind: default_bind(),
            max_body_bytes: default_body_bytes(),
            mcp_enabled: true,
            rest_enabled: false,
        }
    }
}

/// Per-kind capability grant tables.
///
/// Defaults mirror a cautious posture: dashboards may be read and updated,
/// categories and labels may be read, and everything else is denied until
/// the document says otherwise. Supplying any table replaces its default
/// wholesale rather than merging.
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilitiesConfig {
    /// Dashboard grants.
    #[serde(default = "default_dashboard_grants")]
    pub dashboards: KindGrants,
    /// Automation grants.
    #[serde(default)]
    pub automations: KindGrants,
    /// Script grants.
    #[serde(default)]
    pub scripts: KindGrants,
    /// Scene grants.
    #[serde(default)]
    pub scenes: KindGrants,
    /// Helper grants, shared by every helper domain.
    #[serde(default)]
    pub helpers: KindGrants,
    /// Category grants.
    #[serde(default = "default_read_only_grants")]
    pub categories: KindGrants,
    /// Label grants.
    #[serde(default = "default_read_only_grants")]
    pub labels: KindGrants,
}

impl CapabilitiesConfig {
    /// Flattens the typed tables into the core grant map.
    #[must_use]
    pub fn grant_table(&self) -> BTreeMap<String, KindGrants> {
        let mut grants = BTreeMap::new();
        grants.insert("dashboards".to_string(), self.dashboards);
        grants.insert("automations".to_string(), self.automations);
        grants.insert("scripts".to_string(), self.scripts);
        grants.insert("scenes".to_string(), self.scenes);
        grants.insert("helpers".to_string(), self.helpers);
        grants.insert("categories".to_string(), self.categories);
        grants.insert("labels".to_string(), self.labels);
        grants
    }
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            dashboards: default_dashboard_grants(),
            automations: KindGrants::default(),
            scripts: KindGrants::default(),
            scenes: KindGrants::default(),
            helpers: KindGrants::default(),
            categories: default_read_only_grants(),
            labels: default_read_only_grants(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default document version.
const fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

/// Default transport selection.
const fn default_transport() -> Transport {
    Transport::Stdio
}

/// Default loopback bind address.
const fn default_bind() -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_BIND_PORT)
}

/// Default request body limit.
const fn default_body_bytes() -> usize {
    DEFAULT_BODY_BYTES
}

/// Serde default for switches that start enabled.
const fn default_true() -> bool {
    true
}

/// Default grants for dashboards: readable and updatable.
const fn default_dashboard_grants() -> KindGrants {
    KindGrants {
        read: true,
        create: false,
        update: true,
        delete: false,
    }
}

/// Default grants for organization kinds: readable only.
const fn default_read_only_grants() -> KindGrants {
    KindGrants {
        read: true,
        create: false,
        update: false,
        delete: false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
