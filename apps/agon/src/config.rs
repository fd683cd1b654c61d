//! # Application Configuration
//!
//! Optional `agon.toml` configuration file, merged under CLI flags:
//! a flag always wins over the file, the file over the built-in
//! defaults.
//!
//! ```toml
//! database = "archive/agon.db"
//! backend = "redb"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [chain]
//! default_depth = 10
//! ```

use agon_core::AgonError;
use agon_core::primitives::DEFAULT_CHAIN_DEPTH;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "agon.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Path to the archive database.
    pub database: Option<PathBuf>,
    /// Storage backend: "redb" (persistent) or "memory" (ephemeral).
    pub backend: Option<String>,
    /// HTTP server settings.
    pub server: ServerSection,
    /// Chain construction settings.
    pub chain: ChainSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// `[chain]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainSection {
    pub default_depth: Option<usize>,
}

impl AppConfig {
    /// Effective database path.
    #[must_use]
    pub fn database(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from("agon.db"))
    }

    /// Effective storage backend.
    #[must_use]
    pub fn backend(&self) -> String {
        self.backend.clone().unwrap_or_else(|| "redb".to_string())
    }

    /// Effective server host.
    #[must_use]
    pub fn host(&self) -> String {
        self.server
            .host
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    /// Effective server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(8080)
    }

    /// Effective default chain depth.
    #[must_use]
    pub fn default_depth(&self) -> usize {
        self.chain.default_depth.unwrap_or(DEFAULT_CHAIN_DEPTH)
    }
}

/// Load configuration.
///
/// An explicitly named file must exist and parse; the default file is
/// optional and silently absent.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, AgonError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(AgonError::Validation(format!(
                "config file {:?} does not exist",
                path
            )));
        }
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| AgonError::storage("read_config", e))?;
    toml::from_str(&contents).map_err(|e| {
        AgonError::Deserialization(format!("config file {:?}: {}", path, e))
    })
}

// =============================================================================
// TESTS
// =============================================================================
