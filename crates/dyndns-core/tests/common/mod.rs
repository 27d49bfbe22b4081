//! Test doubles and common utilities for pipeline contract tests
//!
//! Every double records what the pipeline asked of it, so tests can assert
//! on call order and on what was never called.

#![allow(dead_code)]

use async_trait::async_trait;
use dyndns_core::error::{Error, Result};
use dyndns_core::postprocess::PostProcessRunner;
use dyndns_core::traits::{
    AuthProvider, CommandRunner, ExpandedCommand, PostProcessCommand, UpdateTransport,
};
use dyndns_core::{UpdatePipeline, UpdateRequest, ZoneDirective, ZoneUpdateConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A provider with one account and a fixed host → zone table
pub struct RecordingProvider {
    username: String,
    password: String,
    hosts: HashMap<String, String>,
    commands: Vec<PostProcessCommand>,
    fail_backend: AtomicBool,
    fail_commands: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            hosts: HashMap::new(),
            commands: Vec::new(),
            fail_backend: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_host(mut self, hostname: &str, zone: &str) -> Self {
        self.hosts.insert(hostname.to_string(), zone.to_string());
        self
    }

    pub fn with_command(mut self, command: PostProcessCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Make every method return a backend error
    pub fn failing(self) -> Self {
        self.fail_backend.store(true, Ordering::SeqCst);
        self
    }

    /// Answer auth questions but fail to list post-process commands
    pub fn with_failing_commands(self) -> Self {
        self.fail_commands.store(true, Ordering::SeqCst);
        self
    }

    /// Names of the methods called, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail_backend.load(Ordering::SeqCst) {
            return Err(Error::provider("recording", "backend down"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for RecordingProvider {
    async fn check_auth(&self, username: &str, password: &str) -> Result<bool> {
        self.record("check_auth")?;
        Ok(username == self.username && password == self.password)
    }

    async fn check_host(&self, username: &str, hostname: &str) -> Result<bool> {
        self.record("check_host")?;
        Ok(username == self.username && self.hosts.contains_key(hostname))
    }

    async fn zone_of_host(&self, _username: &str, hostname: &str) -> Result<String> {
        self.record("zone_of_host")?;
        self.hosts
            .get(hostname)
            .cloned()
            .ok_or_else(|| Error::invalid_input(format!("no zone for {}", hostname)))
    }

    async fn post_process_commands(&self, _username: &str) -> Result<Vec<PostProcessCommand>> {
        self.record("post_process_commands")?;
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(Error::provider("recording", "command table unreadable"));
        }
        Ok(self.commands.clone())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// A transport that records every submitted transaction
#[derive(Clone, Default)]
pub struct RecordingTransport {
    submitted: Arc<Mutex<Vec<Vec<ZoneDirective>>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose transactions are all rejected
    pub fn rejecting() -> Self {
        let transport = Self::default();
        transport.fail.store(true, Ordering::SeqCst);
        transport
    }

    /// Submitted transactions rendered one directive per string
    pub fn submitted(&self) -> Vec<Vec<String>> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|tx| tx.iter().map(ToString::to_string).collect())
            .collect()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl UpdateTransport for RecordingTransport {
    async fn submit(&self, directives: &[ZoneDirective]) -> Result<()> {
        self.submitted.lock().unwrap().push(directives.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::transport("update failed: REFUSED"));
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}

/// A command runner that records instead of executing
#[derive(Clone, Default)]
pub struct RecordingRunner {
    ran: Arc<Mutex<Vec<ExpandedCommand>>>,
    fail_program: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command whose program is `program`
    pub fn failing_on(program: &str) -> Self {
        Self {
            ran: Arc::default(),
            fail_program: Some(program.to_string()),
        }
    }

    pub fn ran(&self) -> Vec<ExpandedCommand> {
        self.ran.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ExpandedCommand) -> Result<()> {
        self.ran.lock().unwrap().push(command.clone());
        if self.fail_program.as_deref() == Some(command.program.as_str()) {
            return Err(Error::Other(format!("{} crashed", command.program)));
        }
        Ok(())
    }
}

/// Wire a pipeline from doubles with default directive settings
pub fn pipeline(
    provider: Arc<RecordingProvider>,
    transport: RecordingTransport,
    runner: RecordingRunner,
) -> UpdatePipeline {
    UpdatePipeline::new(
        provider,
        Box::new(transport),
        PostProcessRunner::new(Arc::new(runner)),
        ZoneUpdateConfig::default(),
    )
}

/// The standard test account: alice / secret owning host.example.com
pub fn alice() -> RecordingProvider {
    RecordingProvider::new("alice", "secret").with_host("host.example.com", "example.com")
}

/// A request from alice for host.example.com
pub fn request(addresses: &[&str]) -> UpdateRequest {
    UpdateRequest::new(
        "alice",
        "secret",
        "host.example.com",
        addresses.iter().map(|a| a.to_string()).collect(),
    )
}
