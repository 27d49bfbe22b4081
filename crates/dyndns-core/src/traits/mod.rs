//! Core traits for the DynDNS update pipeline
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AuthProvider`]: Credentials, host ownership, zones and post-process triggers
//! - [`UpdateTransport`]: Submit a directive script as one DNS transaction
//! - [`CommandRunner`]: Execute expanded post-process commands

pub mod auth_provider;
pub mod command_runner;
pub mod update_transport;

pub use auth_provider::{AuthProvider, AuthProviderFactory, CommandTemplate, PostProcessCommand};
pub use command_runner::{CommandRunner, ExpandedCommand};
pub use update_transport::UpdateTransport;
