//! Container runtime status probe.
//!
//! Asks the Docker daemon for its server version with a bounded wait.
//! Purely informational; storage behavior never depends on the outcome.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

/// Default time allowed for the runtime to answer.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a container runtime probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// The runtime answered; carries the reported server version.
    Running {
        /// Server version string, e.g. `24.0.7`.
        version: String,
    },
    /// The runtime did not answer.
    Unavailable {
        /// Human-readable reason (spawn failure, non-zero exit, timeout).
        reason: String,
    },
}

/// Probes the Docker daemon, waiting at most `timeout` for an answer.
pub fn probe_container_runtime(timeout: Duration) -> RuntimeStatus {
    let mut command = Command::new("docker");
    command.args(["version", "--format", "{{.Server.Version}}"]);
    probe(command, timeout)
}

fn probe(mut command: Command, timeout: Duration) -> RuntimeStatus {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            return RuntimeStatus::Unavailable {
                reason: format!("failed to start runtime client: {err}"),
            };
        }
    };

    match child.wait_timeout(timeout) {
        Ok(Some(status)) if status.success() => {
            let mut version = String::new();
            if let Some(mut stdout) = child.stdout.take() {
                let _ = stdout.read_to_string(&mut version);
            }
            let version = version.trim().to_string();
            if version.is_empty() {
                RuntimeStatus::Unavailable {
                    reason: "runtime answered without a server version".to_string(),
                }
            } else {
                RuntimeStatus::Running { version }
            }
        }
        Ok(Some(status)) => RuntimeStatus::Unavailable {
            reason: format!("runtime client exited with {status}"),
        },
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            RuntimeStatus::Unavailable {
                reason: format!("runtime did not answer within {timeout:?}"),
            }
        }
        Err(err) => RuntimeStatus::Unavailable {
            reason: format!("failed to wait for runtime client: {err}"),
        },
    }
}
