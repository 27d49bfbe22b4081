//! Update pipeline
//!
//! The UpdatePipeline turns one authenticated request into one DNS
//! transaction:
//!
//! ```text
//! UpdateRequest
//!      │
//!      ▼
//! ┌──────────────┐  false   ┌───────────┐
//! │ check_auth   │─────────▶│ badauth   │
//! └──────────────┘          └───────────┘
//!      │
//!      ▼
//! ┌──────────────┐  false   ┌───────────┐
//! │ check_host   │─────────▶│ nohost    │
//! └──────────────┘          └───────────┘
//!      │
//!      ▼
//! ┌──────────────┐  empty   ┌───────────┐
//! │ zone_of_host │─────────▶│ iperror   │
//! │ classify     │          └───────────┘
//! └──────────────┘
//!      │
//!      ▼
//! ┌──────────────┐  failure ┌───────────┐
//! │ transport    │─────────▶│ dnserr    │
//! └──────────────┘          └───────────┘
//!      │
//!      ▼
//! ┌──────────────┐
//! │ post-process │──────────▶ good <addr>
//! └──────────────┘
//! ```
//!
//! Every rejection happens before the transaction; nothing after a committed
//! transaction can turn the answer into a failure. There are no retries: a
//! client that sees `dnserr` sends the whole request again.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::address::classify_all;
use crate::config::{ServiceConfig, ZoneUpdateConfig};
use crate::directive::build_directives;
use crate::error::{Error, Result};
use crate::outcome::UpdateOutcome;
use crate::postprocess::{PostProcessRunner, TemplateVars};
use crate::registry::AuthProviderRegistry;
use crate::traits::{AuthProvider, UpdateTransport};
use crate::transport;

/// Body sent when the authorization backend fails at request time
const BACKEND_FAILURE: &str = "Authorization backend unavailable";

/// The four inputs of an update request
#[derive(Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
    /// Hostname to update (empty when not supplied)
    pub hostname: String,
    /// Raw address entries, possibly empty or invalid
    pub raw_addresses: Vec<String>,
}

impl UpdateRequest {
    /// Create a new request
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        hostname: impl Into<String>,
        raw_addresses: Vec<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            hostname: hostname.into(),
            raw_addresses,
        }
    }
}

// Keep the password out of logs
impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("hostname", &self.hostname)
            .field("raw_addresses", &self.raw_addresses)
            .finish()
    }
}

/// Core update pipeline
///
/// Holds only read-only collaborators, so one instance can serve any number
/// of concurrent requests.
pub struct UpdatePipeline {
    /// Authorization backend
    provider: Arc<dyn AuthProvider>,

    /// DNS update transport
    transport: Box<dyn UpdateTransport>,

    /// Post-process command execution
    post_process: PostProcessRunner,

    /// Directive settings
    zone_update: ZoneUpdateConfig,
}

impl UpdatePipeline {
    /// Create a new pipeline from its collaborators
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        transport: Box<dyn UpdateTransport>,
        post_process: PostProcessRunner,
        zone_update: ZoneUpdateConfig,
    ) -> Self {
        Self {
            provider,
            transport,
            post_process,
            zone_update,
        }
    }

    /// Build a pipeline from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(UpdatePipeline)`: Ready to serve requests
    /// - `Err(Error::Config)`: Invalid configuration or unknown provider
    pub fn from_config(config: &ServiceConfig, registry: &AuthProviderRegistry) -> Result<Self> {
        config.validate()?;

        let provider: Arc<dyn AuthProvider> = Arc::from(registry.create(config)?);
        let transport = transport::from_config(&config.transport);

        info!(
            "Update pipeline ready (provider: {}, transport: {}, server: {}, ttl: {})",
            provider.provider_name(),
            transport.transport_name(),
            config.zone_update.server,
            config.zone_update.ttl
        );

        Ok(Self::new(
            provider,
            transport,
            PostProcessRunner::default(),
            config.zone_update.clone(),
        ))
    }

    /// Process one update request
    pub async fn process(&self, request: &UpdateRequest) -> UpdateOutcome {
        debug!("Processing {:?}", request);

        match self
            .provider
            .check_auth(&request.username, &request.password)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!("Rejected credentials for user '{}'", request.username);
                return UpdateOutcome::BadAuth;
            }
            Err(e) => return self.backend_failure("check_auth", e),
        }

        if request.hostname.is_empty() {
            warn!("User '{}' sent no hostname", request.username);
            return UpdateOutcome::NoHost;
        }

        match self
            .provider
            .check_host(&request.username, &request.hostname)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    "User '{}' may not update host '{}'",
                    request.username, request.hostname
                );
                return UpdateOutcome::NoHost;
            }
            Err(e) => return self.backend_failure("check_host", e),
        }

        let zone = match self
            .provider
            .zone_of_host(&request.username, &request.hostname)
            .await
        {
            Ok(zone) => zone,
            Err(e) => return self.backend_failure("zone_of_host", e),
        };

        let addresses = classify_all(&request.raw_addresses);
        if addresses.is_empty() {
            warn!(
                "No valid address for '{}' in {:?}",
                request.hostname, request.raw_addresses
            );
            return UpdateOutcome::IpError;
        }

        let directives = build_directives(&self.zone_update, &request.hostname, &zone, &addresses);

        if let Err(e) = self.transport.submit(&directives).await {
            error!(
                "Update of '{}' in zone '{}' failed via {}: {}",
                request.hostname,
                zone,
                self.transport.transport_name(),
                e
            );
            return UpdateOutcome::DnsError;
        }

        info!(
            "Updated '{}' in zone '{}' with {} address(es) for user '{}'",
            request.hostname,
            zone,
            addresses.len(),
            request.username
        );

        let ipv4 = addresses.first_ipv4().map(str::to_string);
        let ipv6 = addresses.first_ipv6().map(str::to_string);

        self.run_post_process(request, ipv4.as_deref(), ipv6.as_deref())
            .await;

        UpdateOutcome::Good { ipv4, ipv6 }
    }

    /// Run the user's post-process commands; never fails
    async fn run_post_process(&self, request: &UpdateRequest, ipv4: Option<&str>, ipv6: Option<&str>) {
        let commands = match self.provider.post_process_commands(&request.username).await {
            Ok(commands) => commands,
            Err(e) => {
                warn!(
                    "Could not load post-process commands for '{}': {}",
                    request.username, e
                );
                return;
            }
        };

        if commands.is_empty() {
            return;
        }

        let vars = TemplateVars {
            username: request.username.clone(),
            hostname: request.hostname.clone(),
            ipv4address: ipv4.unwrap_or_default().to_string(),
            ipv6address: ipv6.unwrap_or_default().to_string(),
        };

        let launched = self.post_process.run(&commands, &vars).await;
        debug!(
            "Launched {}/{} post-process command(s) for '{}'",
            launched,
            commands.len(),
            request.username
        );
    }

    fn backend_failure(&self, operation: &str, e: Error) -> UpdateOutcome {
        error!(
            "Provider {} failed during {}: {}",
            self.provider.provider_name(),
            operation,
            e
        );
        UpdateOutcome::Misconfigured(BACKEND_FAILURE.to_string())
    }
}
