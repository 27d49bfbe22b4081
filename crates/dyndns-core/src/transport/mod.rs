// # Update Transport Implementations
//
// Implementations of the UpdateTransport trait, selected by `transport.type`.

pub mod dry_run;
pub mod nsupdate;

pub use dry_run::DryRunTransport;
pub use nsupdate::NsupdateTransport;

use crate::config::TransportConfig;
use crate::traits::UpdateTransport;

/// Create the transport described by `config`
pub fn from_config(config: &TransportConfig) -> Box<dyn UpdateTransport> {
    match config {
        TransportConfig::Nsupdate { program, args } => {
            Box::new(NsupdateTransport::new(program.clone(), args.clone()))
        }
        TransportConfig::DryRun => Box::new(DryRunTransport),
    }
}
