//! Post-process command expansion and execution
//!
//! After a committed update, each command the provider returned for the user
//! is expanded and run in order. Expansion works on words, not on a command
//! line: the template is split into program and arguments first, honoring
//! shell quotes, then the placeholders are replaced inside each word. A
//! hostname like `a;rm -rf ~` therefore stays one argument and is never seen
//! by a shell.
//!
//! | Placeholder | Value |
//! |---|---|
//! | `%username%` | requesting user |
//! | `%hostname%` | updated hostname |
//! | `%ipv4address%` | first IPv4 address of the request, or empty |
//! | `%ipv6address%` | first IPv6 address of the request, or empty |
//!
//! Failures are logged and skipped. They never change the response.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::traits::{CommandRunner, ExpandedCommand, PostProcessCommand};

/// Values substituted into command templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// `%username%`
    pub username: String,
    /// `%hostname%`
    pub hostname: String,
    /// `%ipv4address%`
    pub ipv4address: String,
    /// `%ipv6address%`
    pub ipv6address: String,
}

impl TemplateVars {
    /// Replace every placeholder in `word`
    ///
    /// Placeholders are replaced one after another in the order of the table
    /// above.
    pub fn substitute(&self, word: &str) -> String {
        word.replace("%username%", &self.username)
            .replace("%hostname%", &self.hostname)
            .replace("%ipv4address%", &self.ipv4address)
            .replace("%ipv6address%", &self.ipv6address)
    }
}

/// Expand one template into a runnable command
///
/// Returns `Ok(None)` for an empty template and `Err` for a template that
/// cannot be split into words.
pub fn expand(
    command: &PostProcessCommand,
    vars: &TemplateVars,
) -> Result<Option<ExpandedCommand>, crate::Error> {
    let mut words = command
        .command
        .words()?
        .into_iter()
        .map(|w| vars.substitute(&w));

    let Some(program) = words.next().filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    Ok(Some(ExpandedCommand {
        program,
        args: words.collect(),
        detached: command.detached,
    }))
}

/// Runs post-process commands for a committed update
#[derive(Clone)]
pub struct PostProcessRunner {
    runner: Arc<dyn CommandRunner>,
}

impl PostProcessRunner {
    /// Create a runner on top of a command execution backend
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run all commands in order
    ///
    /// Returns the number of commands that were launched successfully.
    pub async fn run(&self, commands: &[PostProcessCommand], vars: &TemplateVars) -> usize {
        let mut launched = 0;

        for command in commands {
            let expanded = match expand(command, vars) {
                Ok(Some(expanded)) => expanded,
                Ok(None) => {
                    warn!("Skipping empty post-process command for {}", vars.username);
                    continue;
                }
                Err(e) => {
                    warn!("Skipping post-process command for {}: {}", vars.username, e);
                    continue;
                }
            };

            debug!(
                "Running post-process command ({}): {}",
                if expanded.detached { "detached" } else { "waited" },
                expanded.display_line()
            );

            match self.runner.run(&expanded).await {
                Ok(()) => launched += 1,
                Err(e) => warn!(
                    "Post-process command '{}' failed: {}",
                    expanded.display_line(),
                    e
                ),
            }
        }

        launched
    }
}

impl Default for PostProcessRunner {
    fn default() -> Self {
        Self::new(Arc::new(ProcessCommandRunner))
    }
}

/// Executes commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, command: &ExpandedCommand) -> Result<(), crate::Error> {
        let mut process = Command::new(&command.program);
        process.args(&command.args).stdin(Stdio::null());

        if command.detached {
            let mut child = process
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;

            let line = command.display_line();
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) => debug!("Detached command '{}' exited with {}", line, status),
                    Err(e) => debug!("Detached command '{}' could not be reaped: {}", line, e),
                }
            });
            return Ok(());
        }

        let output = process.output().await?;
        if !output.status.success() {
            debug!(
                "Post-process command '{}' exited with {}: {}",
                command.display_line(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
