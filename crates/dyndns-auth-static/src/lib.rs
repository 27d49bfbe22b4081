// # Static User Provider
//
// Authorization provider backed by a user table declared in the service
// configuration or in a separate JSON file.
//
// ## Configuration
//
// ```json
// {
//   "auth_provider": "static",
//   "auth_provider_config": {
//     "static": {
//       "users_file": "/etc/dyndns/users.json",
//       "users": [
//         {
//           "username": "alice",
//           "password": "s3cret",
//           "hosts": { "home.example.com": "example.com" },
//           "post_process": [
//             { "command": "/usr/local/bin/firewall-sync %ipv4address%", "detached": true }
//           ]
//         }
//       ]
//     }
//   }
// }
// ```
//
// `users_file` holds a JSON array of the same user objects. Users from both
// sources are merged; a duplicate username is a configuration error.
//
// ## Security Requirements
//
// - Passwords NEVER appear in logs or Debug output
// - The table is read once at startup and never written

use async_trait::async_trait;
use dyndns_core::registry::AuthProviderRegistry;
use dyndns_core::traits::{AuthProvider, AuthProviderFactory, PostProcessCommand};
use dyndns_core::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name this provider is registered under
pub const PROVIDER_NAME: &str = "static";

/// Settings section of the static provider
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticAuthConfig {
    /// Inline users
    #[serde(default)]
    pub users: Vec<UserEntry>,

    /// Optional JSON file with additional users
    #[serde(default)]
    pub users_file: Option<PathBuf>,
}

/// One account
#[derive(Clone, Deserialize)]
pub struct UserEntry {
    /// Account name
    pub username: String,

    /// Account password
    pub password: String,

    /// Hostnames this account may update, mapped to their zone
    #[serde(default)]
    pub hosts: HashMap<String, String>,

    /// Commands run after each successful update
    #[serde(default)]
    pub post_process: Vec<PostProcessCommand>,
}

// Custom Debug implementation that hides the password
impl fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserEntry")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("hosts", &self.hosts)
            .field("post_process", &self.post_process)
            .finish()
    }
}

/// A user with hostnames normalized for lookup
#[derive(Clone)]
struct Account {
    password: String,
    /// normalized hostname → zone
    hosts: HashMap<String, String>,
    post_process: Vec<PostProcessCommand>,
}

/// Configuration-backed authorization provider
pub struct StaticAuthProvider {
    accounts: HashMap<String, Account>,
}

impl fmt::Debug for StaticAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut users: Vec<_> = self.accounts.keys().collect();
        users.sort();
        f.debug_struct("StaticAuthProvider")
            .field("users", &users)
            .finish()
    }
}

impl StaticAuthProvider {
    /// Build a provider from a list of users
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty username or a duplicate account.
    pub fn new(users: Vec<UserEntry>) -> Result<Self> {
        let mut accounts = HashMap::with_capacity(users.len());

        for user in users {
            if user.username.is_empty() {
                return Err(Error::config("static provider: username cannot be empty"));
            }

            for command in &user.post_process {
                command.command.words().map_err(|e| {
                    Error::config(format!(
                        "static provider: user '{}': {}",
                        user.username, e
                    ))
                })?;
            }

            let hosts = user
                .hosts
                .into_iter()
                .map(|(hostname, zone)| (normalize_host(&hostname), zone))
                .collect();

            let account = Account {
                password: user.password,
                hosts,
                post_process: user.post_process,
            };

            if accounts.insert(user.username.clone(), account).is_some() {
                return Err(Error::config(format!(
                    "static provider: duplicate user '{}'",
                    user.username
                )));
            }
        }

        Ok(Self { accounts })
    }

    /// Build a provider from its settings section
    pub fn from_config(config: StaticAuthConfig) -> Result<Self> {
        let mut users = config.users;

        if let Some(path) = &config.users_file {
            users.extend(load_users_file(path)?);
        }

        let provider = Self::new(users)?;
        info!("Static user provider loaded {} user(s)", provider.user_count());
        Ok(provider)
    }

    /// Number of configured users
    pub fn user_count(&self) -> usize {
        self.accounts.len()
    }

    fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }
}

/// Hostnames compare case-insensitively and without a trailing dot
fn normalize_host(hostname: &str) -> String {
    hostname.trim_end_matches('.').to_ascii_lowercase()
}

fn load_users_file(path: &Path) -> Result<Vec<UserEntry>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "static provider: cannot read users file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        Error::config(format!(
            "static provider: invalid users file {}: {}",
            path.display(),
            e
        ))
    })
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn check_auth(&self, username: &str, password: &str) -> Result<bool> {
        let ok = matches!(self.account(username), Some(account) if account.password == password);
        debug!("Credential check for '{}': {}", username, ok);
        Ok(ok)
    }

    async fn check_host(&self, username: &str, hostname: &str) -> Result<bool> {
        Ok(self
            .account(username)
            .is_some_and(|account| account.hosts.contains_key(&normalize_host(hostname))))
    }

    async fn zone_of_host(&self, username: &str, hostname: &str) -> Result<String> {
        self.account(username)
            .and_then(|account| account.hosts.get(&normalize_host(hostname)))
            .cloned()
            .ok_or_else(|| {
                Error::provider(
                    PROVIDER_NAME,
                    format!("no zone for '{}' of user '{}'", hostname, username),
                )
            })
    }

    async fn post_process_commands(&self, username: &str) -> Result<Vec<PostProcessCommand>> {
        Ok(self
            .account(username)
            .map(|account| account.post_process.clone())
            .unwrap_or_default())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for [`StaticAuthProvider`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAuthFactory;

impl AuthProviderFactory for StaticAuthFactory {
    fn create(&self, config: &serde_json::Value) -> Result<Box<dyn AuthProvider>> {
        let config: StaticAuthConfig = if config.is_null() {
            StaticAuthConfig::default()
        } else {
            serde_json::from_value(config.clone()).map_err(|e| {
                Error::config(format!("static provider: invalid settings: {}", e))
            })?
        };

        Ok(Box::new(StaticAuthProvider::from_config(config)?))
    }
}

/// Register this provider under [`PROVIDER_NAME`]
pub fn register(registry: &mut AuthProviderRegistry) {
    registry.register(PROVIDER_NAME, Box::new(StaticAuthFactory));
}
