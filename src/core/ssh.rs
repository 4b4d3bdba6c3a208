use crate::host::HostProfile;
use std::process::Command;

/// Execution handle for one host. When `connection` is `None` commands run
/// locally through `sh -c`; otherwise they go over `ssh`, and transfers
/// over `scp`. The client itself keeps no state beyond the target.
pub struct SshClient {
    /// `user@host`, or `None` for local execution.
    pub connection: Option<String>,
}

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

impl SshClient {
    pub fn from_profile(profile: &HostProfile) -> Self {
        Self {
            connection: profile.connection.clone(),
        }
    }

    fn build_ssh_args(&self, connection: &str, command: &str) -> Vec<String> {
        // Non-interactive: fail fast instead of hanging on prompts. Timeouts
        // beyond these transport options are deliberately not configured.
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            connection.to_string(),
            command.to_string(),
        ]
    }

    pub fn execute(&self, command: &str) -> CommandOutput {
        match &self.connection {
            None => execute_local_command(command),
            Some(connection) => {
                let args = self.build_ssh_args(connection, command);
                run_captured(Command::new("ssh").args(&args))
            }
        }
    }

    /// Fetch a remote file to a local path (`scp`, plain `cp` when local).
    pub fn download(&self, remote_path: &str, local_path: &str) -> CommandOutput {
        match &self.connection {
            None => {
                log_status!("get", "cp {} {}", remote_path, local_path);
                run_captured(Command::new("cp").args([remote_path, local_path]))
            }
            Some(connection) => {
                let source = format!("{}:{}", connection, remote_path);
                log_status!("get", "scp {} {}", source, local_path);
                run_captured(
                    Command::new("scp").args(["-o", "BatchMode=yes", source.as_str(), local_path]),
                )
            }
        }
    }
}

pub fn execute_local_command(command: &str) -> CommandOutput {
    run_captured(Command::new("sh").args(["-c", command]))
}

fn run_captured(cmd: &mut Command) -> CommandOutput {
    match cmd.output() {
        Ok(out) => CommandOutput {
            stdout: String::from_utf8_lossy(&out.stdout).to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            success: out.status.success(),
            exit_code: out.status.code().unwrap_or(-1),
        },
        Err(e) => CommandOutput {
            stdout: String::new(),
            stderr: format!("Command error: {}", e),
            success: false,
            exit_code: -1,
        },
    }
}

/// Spawn a local command detached. The child is never joined: callers get no
/// ordering guarantee and no failure propagation. Used for the slow media
/// archive step.
pub fn spawn_local_detached(command: &str) {
    match Command::new("sh").args(["-c", command]).spawn() {
        Ok(child) => {
            log_status!("spawn", "[pid {}] {}", child.id(), command);
            drop(child);
        }
        Err(e) => {
            log_status!("spawn", "failed to start '{}': {}", command, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostKind;

    fn local_profile() -> HostProfile {
        HostProfile {
            key: "localhost".to_string(),
            kind: HostKind::Local,
            home: "/home/navin".to_string(),
            project: "rs".to_string(),
            venv: "rs".to_string(),
            managepy_subdir: String::new(),
            connection: None,
        }
    }

    #[test]
    fn local_execution_captures_output() {
        let client = SshClient::from_profile(&local_profile());
        let out = client.execute("echo hello");
        assert!(out.success);
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn local_execution_reports_exit_code() {
        let client = SshClient::from_profile(&local_profile());
        let out = client.execute("echo oops >&2; exit 3");
        assert!(!out.success);
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn remote_profile_builds_ssh_args() {
        let client = SshClient {
            connection: Some("navin@web123.webfaction.com".to_string()),
        };
        let args = client.build_ssh_args("navin@web123.webfaction.com", "pwd");
        assert_eq!(
            args,
            vec!["-o", "BatchMode=yes", "navin@web123.webfaction.com", "pwd"]
        );
    }
}
