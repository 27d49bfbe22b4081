// # dyndns-core
//
// Core library for the dyn.com-compatible DynDNS update endpoint.
//
// ## Architecture Overview
//
// This library provides the update pipeline behind `/nic/update`:
// - **address**: Validates and classifies submitted IP addresses
// - **AuthProvider**: Trait for credential, hostname and zone lookups
// - **directive**: Builds the ordered nsupdate transaction
// - **UpdateTransport**: Trait for submitting the transaction (nsupdate, dry-run)
// - **postprocess**: Templated commands run after a committed update
// - **outcome**: Maps results to `good`/`badauth`/`nohost`/`iperror`/`dnserr`
// - **UpdatePipeline**: Orchestrates the request → transaction → response flow
// - **AuthProviderRegistry**: Plugin-based registry for authorization backends
//
// ## Design Principles
//
// 1. **Separation of Concerns**: HTTP handling lives in the daemon, not here
// 2. **Fail Fast**: Every rejection happens before the DNS transaction
// 3. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 4. **Stateless**: Nothing is carried from one request to the next

pub mod address;
pub mod config;
pub mod directive;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod postprocess;
pub mod registry;
pub mod traits;
pub mod transport;

// Re-export core types for convenience
pub use address::{AddressFamily, AddressSet, ClassifiedAddress};
pub use config::{ServiceConfig, TransportConfig, ZoneUpdateConfig};
pub use directive::ZoneDirective;
pub use error::{Error, Result};
pub use outcome::{EncodedResponse, ReturnCode, UpdateOutcome};
pub use pipeline::{UpdatePipeline, UpdateRequest};
pub use postprocess::{PostProcessRunner, ProcessCommandRunner, TemplateVars};
pub use registry::AuthProviderRegistry;
pub use traits::{AuthProvider, CommandRunner, PostProcessCommand, UpdateTransport};
pub use transport::{DryRunTransport, NsupdateTransport};
