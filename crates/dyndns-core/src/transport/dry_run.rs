// # Dry-Run Transport
//
// Logs the transaction it would have sent and reports success. Useful for
// wiring up clients and post-process hooks before a DNS server exists.

use async_trait::async_trait;
use tracing::info;

use crate::directive::{ZoneDirective, render_script};
use crate::traits::UpdateTransport;

/// Transport that never contacts a DNS server
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

#[async_trait]
impl UpdateTransport for DryRunTransport {
    async fn submit(&self, directives: &[ZoneDirective]) -> Result<(), crate::Error> {
        info!(
            "[DRY-RUN] Would submit update transaction:\n{}",
            render_script(directives)
        );
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "dry_run"
    }
}
