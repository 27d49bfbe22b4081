// # Authorization Provider Trait
//
// Defines the interface the update pipeline uses to decide who may update
// which hostname, which zone owns it, and what runs after a committed update.
//
// ## Implementations
//
// - Static (configuration-backed): `dyndns-auth-static` crate
// - Future: SQL-backed user stores, external account APIs
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::AuthProvider;
//
// async fn authorize(provider: &dyn AuthProvider) -> dyndns_core::Result<()> {
//     if provider.check_auth("alice", "secret").await?
//         && provider.check_host("alice", "home.example.com").await?
//     {
//         let zone = provider.zone_of_host("alice", "home.example.com").await?;
//         println!("home.example.com lives in {}", zone);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A command template run after a successful update
///
/// The template may contain `%username%`, `%hostname%`, `%ipv4address%` and
/// `%ipv6address%`. See [`crate::postprocess`] for how it is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessCommand {
    /// Command line template
    pub command: CommandTemplate,

    /// Launch without waiting for completion, discarding output
    #[serde(default, alias = "noWait")]
    pub detached: bool,
}

impl PostProcessCommand {
    /// Create a command that is waited for
    pub fn new(command: impl Into<CommandTemplate>) -> Self {
        Self {
            command: command.into(),
            detached: false,
        }
    }

    /// Mark the command as fire-and-forget
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }
}

/// Command template as written in configuration
///
/// A single string is split into program and arguments with POSIX shell
/// quoting rules (`"a b"` and `'a b'` stay one word); an array is taken as
/// the argument vector verbatim. Nothing else of the shell applies: no
/// expansion, no pipes, no redirection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandTemplate {
    /// `"notify-send %hostname% %ipv4address%"`
    Line(String),
    /// `["notify-send", "%hostname% is now %ipv4address%"]`
    Argv(Vec<String>),
}

impl CommandTemplate {
    /// Template words before placeholder substitution
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a line with an unbalanced quote or a
    /// trailing backslash.
    pub fn words(&self) -> Result<Vec<String>, crate::Error> {
        match self {
            CommandTemplate::Line(line) => shell_words::split(line).map_err(|e| {
                crate::Error::invalid_input(format!("command template '{}': {}", line, e))
            }),
            CommandTemplate::Argv(argv) => Ok(argv.clone()),
        }
    }
}

impl From<&str> for CommandTemplate {
    fn from(line: &str) -> Self {
        CommandTemplate::Line(line.to_string())
    }
}

impl From<String> for CommandTemplate {
    fn from(line: String) -> Self {
        CommandTemplate::Line(line)
    }
}

impl From<Vec<String>> for CommandTemplate {
    fn from(argv: Vec<String>) -> Self {
        CommandTemplate::Argv(argv)
    }
}

/// Trait for authorization backends
///
/// The pipeline relies on this call order:
/// 1. [`check_auth`](AuthProvider::check_auth) first; on `false` nothing else is called
/// 2. [`check_host`](AuthProvider::check_host) before any address is looked at
/// 3. [`zone_of_host`](AuthProvider::zone_of_host) only for an authorized host
/// 4. [`post_process_commands`](AuthProvider::post_process_commands) only after
///    the DNS transaction was committed
///
/// Implementations must be thread-safe; one instance serves every request.
/// They must not cache per-request state: zones are resolved again on every call.
///
/// An `Err` from any method means the backend itself is broken (unreadable
/// store, lost connection) and is reported to the client as a server error.
/// A well-formed "no" is `Ok(false)`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Check that `password` is correct for `username`
    async fn check_auth(&self, username: &str, password: &str) -> Result<bool, crate::Error>;

    /// Check that `username` may update `hostname`
    async fn check_host(&self, username: &str, hostname: &str) -> Result<bool, crate::Error>;

    /// Resolve the zone that owns `hostname`
    async fn zone_of_host(&self, username: &str, hostname: &str) -> Result<String, crate::Error>;

    /// Commands to run after a successful update for `username`
    async fn post_process_commands(
        &self,
        username: &str,
    ) -> Result<Vec<PostProcessCommand>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing authorization providers from configuration
pub trait AuthProviderFactory: Send + Sync {
    /// Create an AuthProvider from its section of `auth_provider_config`
    ///
    /// `config` is `Value::Null` when the configuration has no section for
    /// this provider.
    fn create(&self, config: &serde_json::Value) -> Result<Box<dyn AuthProvider>, crate::Error>;
}
