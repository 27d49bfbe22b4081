//! Plugin-based authorization provider registry
//!
//! Providers are looked up by the name given in `auth_provider`, so adding a
//! backend never touches the pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dyndns_core::registry::AuthProviderRegistry;
//! use dyndns_core::config::ServiceConfig;
//!
//! let mut registry = AuthProviderRegistry::new();
//! dyndns_auth_static::register(&mut registry);
//!
//! let config = ServiceConfig::load("data/config.json")?;
//! let provider = registry.create(&config)?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &mut AuthProviderRegistry) {
//!     registry.register("static", Box::new(StaticAuthFactory));
//! }
//! ```

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::traits::{AuthProvider, AuthProviderFactory};
use std::collections::HashMap;

/// Registry of authorization provider factories
///
/// Built once at startup and read-only afterwards.
#[derive(Default)]
pub struct AuthProviderRegistry {
    factories: HashMap<String, Box<dyn AuthProviderFactory>>,
}

impl AuthProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory under `name`
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, factory: Box<dyn AuthProviderFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Create the provider selected by `config.auth_provider`
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn AuthProvider>)`: Created provider instance
    /// - `Err(Error::Config)`: If no factory is registered under that name
    /// - `Err(Error)`: Whatever the factory reports for bad settings
    pub fn create(&self, config: &ServiceConfig) -> Result<Box<dyn AuthProvider>> {
        let name = config.auth_provider.as_str();
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::config(format!("No such user provider: {}", name)))?;

        factory.create(&config.provider_settings())
    }

    /// List all registered provider names
    pub fn list(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
