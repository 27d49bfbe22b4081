//! # dyndnsd
//!
//! HTTP front end for the DynDNS update pipeline. The binary in `main.rs`
//! only reads the environment, sets up logging and serves [`http::router`].

pub mod http;

pub use http::{AppState, NOT_CONFIGURED, router};
