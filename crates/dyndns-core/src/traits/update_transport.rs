// # Update Transport Trait
//
// Defines how a finished directive script reaches the DNS server.
//
// ## Implementations
//
// - `NsupdateTransport`: pipes the script into an `nsupdate` process
// - `DryRunTransport`: logs the script and reports success
//
// The transport sees the whole script at once and must submit it as one
// transaction. It reports success or failure, nothing in between.

use async_trait::async_trait;

use crate::directive::ZoneDirective;

/// Trait for DNS update transports
///
/// # Contract
///
/// - One call, one transaction: the server applies all directives or none
/// - No retry: a failure is returned to the pipeline, which answers `dnserr`
/// - No partial results: `Ok(())` means the final `send` was accepted
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    /// Submit the directive sequence as a single transaction
    async fn submit(&self, directives: &[ZoneDirective]) -> Result<(), crate::Error>;

    /// Get the transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
