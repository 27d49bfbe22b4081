// # nsupdate Transport
//
// Submits the directive script to BIND's `nsupdate` utility.
//
// The script is written to the child's stdin; nothing goes through a shell,
// so hostnames and addresses are never interpreted by one. The exit status
// is the only success signal: `nsupdate` exits non-zero when any directive,
// including the final `send`, is rejected.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::directive::{ZoneDirective, render_script};
use crate::traits::UpdateTransport;
use crate::Error;

/// Transport that pipes the script into an `nsupdate` process
#[derive(Debug, Clone)]
pub struct NsupdateTransport {
    /// Program to execute
    program: String,
    /// Extra arguments, e.g. `-k /etc/bind/ddns.key`
    args: Vec<String>,
}

impl NsupdateTransport {
    /// Create a new nsupdate transport
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run the program with `script` on stdin
    async fn execute(&self, script: &str) -> Result<(), Error> {
        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::transport(format!("Failed to spawn {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(script.as_bytes())
                .await
                .map_err(|e| Error::transport(format!("Failed to write script: {}", e)))?;
            stdin
                .flush()
                .await
                .map_err(|e| Error::transport(format!("Failed to flush script: {}", e)))?;
            // stdin is dropped here, which closes the pipe and lets nsupdate finish
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::transport(format!("Failed to wait for {}: {}", self.program, e)))?;

        let duration = start.elapsed().as_secs_f64();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            error!(
                "{} failed with {} after {:.3}s: {}",
                self.program, output.status, duration, message
            );
            return Err(Error::transport(format!(
                "{} exited with {}: {}",
                self.program, output.status, message
            )));
        }

        debug!("{} completed successfully in {:.3}s", self.program, duration);
        Ok(())
    }
}

#[async_trait]
impl UpdateTransport for NsupdateTransport {
    async fn submit(&self, directives: &[ZoneDirective]) -> Result<(), Error> {
        let script = render_script(directives);
        debug!("Submitting update transaction:\n{}", script);
        self.execute(&script).await
    }

    fn transport_name(&self) -> &'static str {
        "nsupdate"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script() -> Vec<ZoneDirective> {
        vec![
            ZoneDirective::Server("localhost".to_string()),
            ZoneDirective::Zone("example.com".to_string()),
            ZoneDirective::Send,
        ]
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let transport = NsupdateTransport::new("cat", Vec::new());
        assert!(transport.submit(&script()).await.is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_is_failure() {
        let transport = NsupdateTransport::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo 'update failed: REFUSED' >&2; exit 2".to_string()],
        );

        let err = transport.submit(&script()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m.contains("REFUSED")));
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let transport = NsupdateTransport::new("/nonexistent/nsupdate", Vec::new());
        assert!(matches!(
            transport.submit(&script()).await,
            Err(Error::Transport(_))
        ));
    }

    #[tokio::test]
    async fn script_arrives_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("script.txt");
        let transport = NsupdateTransport::new(
            "sh",
            vec!["-c".to_string(), format!("cat > '{}'", out.display())],
        );

        transport.submit(&script()).await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "server localhost\nzone example.com\nsend\n");
    }
}
