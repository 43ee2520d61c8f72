use std::process::Command;

use crate::config::DeployConfig;

/// Non-interactive SSH session against the deployment host.
pub struct SshClient {
    pub host: String,
    pub user: String,
    pub port: u16,
}

/// Captured result of one shell invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl SshClient {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            host: config.server_host.clone(),
            user: config.server_user.clone(),
            port: config.server_port,
        }
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = Vec::new();

        if self.port != 22 {
            args.push("-p".to_string());
            args.push(self.port.to_string());
        }

        // Non-interactive invocation: accept the host key, never prompt,
        // and add timeout/keepalive options to prevent hangs on stalled
        // connections.
        args.extend(
            [
                "StrictHostKeyChecking=no",
                "BatchMode=yes",
                "ConnectTimeout=10",
                "ServerAliveInterval=15",
                "ServerAliveCountMax=3",
            ]
            .iter()
            .flat_map(|opt| ["-o".to_string(), opt.to_string()]),
        );

        args.push(format!("{}@{}", self.user, self.host));
        args.push(command.to_string());

        args
    }

    /// Execute a command on the remote host, retrying transient connection
    /// failures. Remote command failures are returned as-is.
    pub fn execute(&self, command: &str) -> CommandOutput {
        let max_attempts: u32 = 3;
        let backoff_secs = [0, 2, 5]; // delays before retry 1, 2, 3

        for attempt in 0..max_attempts {
            let result = self.execute_once(command);

            if result.success || attempt + 1 >= max_attempts || !is_transient_ssh_error(&result) {
                return result;
            }

            let delay = backoff_secs.get(attempt as usize + 1).copied().unwrap_or(5);
            log_status!(
                "ssh",
                "Connection failed (attempt {}/{}), retrying in {}s...",
                attempt + 1,
                max_attempts,
                delay
            );
            std::thread::sleep(std::time::Duration::from_secs(delay));
        }

        // Unreachable, but satisfy the compiler
        CommandOutput {
            stdout: String::new(),
            stderr: "SSH retry exhausted".to_string(),
            success: false,
            exit_code: -1,
        }
    }

    /// Execute a command on the remote host without transient-error
    /// retries. Used by callers with their own retry cadence, such as the
    /// build-readiness poll loop, where per-invocation retries would
    /// stretch the overall wall-clock budget.
    pub fn execute_once(&self, command: &str) -> CommandOutput {
        let args = self.build_ssh_args(command);

        match Command::new("ssh").args(&args).output() {
            Ok(out) => CommandOutput {
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                success: out.status.success(),
                exit_code: out.status.code().unwrap_or(-1),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("SSH error: {}", e),
                success: false,
                exit_code: -1,
            },
        }
    }
}

/// Check if an SSH failure is a transient connection error worth retrying.
fn is_transient_ssh_error(output: &CommandOutput) -> bool {
    let stderr = output.stderr.to_lowercase();
    // SSH exit code 255 = connection error (not a remote command failure)
    let is_connection_exit = output.exit_code == 255;

    let transient_patterns = [
        "connection refused",
        "connection reset",
        "connection timed out",
        "no route to host",
        "network is unreachable",
        "temporary failure in name resolution",
        "could not resolve hostname",
        "broken pipe",
        "ssh_exchange_identification",
        "connection closed by remote host",
    ];

    is_connection_exit || transient_patterns.iter().any(|p| stderr.contains(p))
}
