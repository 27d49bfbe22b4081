//! Configuration types for the DynDNS endpoint
//!
//! The service reads one JSON document:
//!
//! ```json
//! {
//!   "auth_provider": "static",
//!   "auth_provider_config": {
//!     "static": { "users": [] }
//!   },
//!   "transport": { "type": "nsupdate", "program": "nsupdate", "args": ["-k", "/etc/bind/ddns.key"] },
//!   "zone_update": { "server": "localhost", "ttl": 60 }
//! }
//! ```
//!
//! Only `auth_provider` is required.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name of the registered authorization provider
    pub auth_provider: String,

    /// Per-provider settings, keyed by provider name
    #[serde(default)]
    pub auth_provider_config: HashMap<String, serde_json::Value>,

    /// How the update transaction reaches the DNS server
    #[serde(default)]
    pub transport: TransportConfig,

    /// Directive settings
    #[serde(default)]
    pub zone_update: ZoneUpdateConfig,
}

impl ServiceConfig {
    /// Create a configuration for the named provider with defaults elsewhere
    pub fn new(auth_provider: impl Into<String>) -> Self {
        Self {
            auth_provider: auth_provider.into(),
            auth_provider_config: HashMap::new(),
            transport: TransportConfig::default(),
            zone_update: ZoneUpdateConfig::default(),
        }
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config: ServiceConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.auth_provider.trim().is_empty() {
            return Err(crate::Error::config("auth_provider cannot be empty"));
        }

        self.transport.validate()?;
        self.zone_update.validate()?;

        Ok(())
    }

    /// Settings section of the selected provider (`Null` when absent)
    pub fn provider_settings(&self) -> serde_json::Value {
        self.auth_provider_config
            .get(&self.auth_provider)
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }
}

/// DNS update transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Pipe the script into an `nsupdate` process
    Nsupdate {
        /// Program to run
        #[serde(default = "default_nsupdate_program")]
        program: String,
        /// Extra arguments (e.g. `-k <keyfile>`, `-l`)
        #[serde(default)]
        args: Vec<String>,
    },

    /// Log the script and report success without contacting a server
    DryRun,
}

impl TransportConfig {
    /// Validate the transport configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            TransportConfig::Nsupdate { program, .. } => {
                if program.is_empty() {
                    return Err(crate::Error::config("nsupdate program cannot be empty"));
                }
                Ok(())
            }
            TransportConfig::DryRun => Ok(()),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Nsupdate {
            program: default_nsupdate_program(),
            args: Vec::new(),
        }
    }
}

/// Settings for the generated directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneUpdateConfig {
    /// Argument of the `server` directive
    #[serde(default = "default_server")]
    pub server: String,

    /// TTL of added records, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl ZoneUpdateConfig {
    /// Validate the directive settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.server.trim().is_empty() {
            return Err(crate::Error::config("zone_update.server cannot be empty"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("zone_update.ttl must be > 0"));
        }
        Ok(())
    }
}

impl Default for ZoneUpdateConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            ttl: default_ttl(),
        }
    }
}

fn default_nsupdate_program() -> String {
    "nsupdate".to_string()
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_ttl() -> u32 {
    60
}
