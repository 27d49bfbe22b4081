// # Command Runner Trait
//
// Executes fully expanded post-process commands. Expansion happens in
// `crate::postprocess`; a runner only ever sees a program and its arguments.

use async_trait::async_trait;

/// A post-process command after placeholder substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedCommand {
    /// Program to execute (looked up in `PATH` if not absolute)
    pub program: String,
    /// Arguments, one per element, never re-split
    pub args: Vec<String>,
    /// Do not wait for completion and discard output
    pub detached: bool,
}

impl ExpandedCommand {
    /// Render for log lines
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for command execution backends
///
/// `run` returns once the command is finished, or immediately after launch
/// for detached commands. A non-zero exit status is not an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute one command
    async fn run(&self, command: &ExpandedCommand) -> Result<(), crate::Error>;
}
