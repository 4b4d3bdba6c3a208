use crate::error::{Error, Result};
use crate::host::{self, HostProfile, Overrides};
use crate::settings::Settings;
use crate::ssh::SshClient;
use crate::utils::shell;

/// Which resolved directory a task body runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingDir {
    Project,
    /// The manage.py directory; equals `Project` unless the host declares a
    /// managepy subdirectory.
    ManagePy,
    Home,
}

/// Per-invocation bundle threading the chosen host and the operator's own
/// machine through a task. Built once, then passed by value; nothing here
/// mutates after resolution.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub remote: HostProfile,
    pub local: HostProfile,
}

impl TaskContext {
    pub fn resolve(host_key: &str, settings: &Settings, overrides: &Overrides) -> Result<Self> {
        Ok(Self {
            remote: host::resolve(host_key, settings, overrides)?,
            local: host::resolve_local(settings, overrides)?,
        })
    }

    /// Require a local target; remote hosts are rejected. Guards tasks like
    /// replacedb that touch the operator's database.
    pub fn force_local(&self) -> Result<&HostProfile> {
        if self.remote.is_local() {
            Ok(&self.remote)
        } else {
            Err(Error::Config(format!(
                "'{}' is a remote host; this is a local-only task",
                self.remote.key
            )))
        }
    }
}

/// Compose the uniform command envelope: cd into the resolved directory,
/// source the venv activation script when the host has one, then run `body`.
pub fn wrap_command(profile: &HostProfile, workdir: WorkingDir, body: &str) -> String {
    let dir = match workdir {
        WorkingDir::Project => profile.project_dir(),
        WorkingDir::ManagePy => profile.managepy_dir(),
        WorkingDir::Home => profile.home.clone().into(),
    };
    let mut command = format!("cd {}", shell::quote_path(&dir.to_string_lossy()));
    if let Some(activate) = profile.activate_script() {
        command.push_str(&format!(
            " && . {}",
            shell::quote_path(&activate.to_string_lossy())
        ));
    }
    command.push_str(" && ");
    command.push_str(body);
    command
}

/// Run `body` on one host with the profile's directory and environment
/// applied. Non-zero exit surfaces as `Error::RemoteCommand` carrying the
/// captured stderr.
pub fn run_on(profile: &HostProfile, workdir: WorkingDir, body: &str) -> Result<String> {
    let command = wrap_command(profile, workdir, body);
    log_status!("run", "{}: {}", profile.key, command);

    let client = SshClient::from_profile(profile);
    let output = client.execute(&command);
    if output.success {
        Ok(output.stdout)
    } else {
        Err(Error::RemoteCommand {
            command,
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

/// `cd <managepy_dir> && <python> manage.py <command>`, returning captured
/// stdout. The workhorse behind most tasks.
pub fn managepy(profile: &HostProfile, command: &str) -> Result<String> {
    let body = format!(
        "{} manage.py {}",
        profile.python().to_string_lossy(),
        command
    );
    run_on(profile, WorkingDir::ManagePy, &body)
}

/// Run a task body once per selected host, in order, short-circuiting on
/// the first failure.
pub fn for_each_host<F>(
    host_keys: &[String],
    settings: &Settings,
    overrides: &Overrides,
    mut body: F,
) -> Result<()>
where
    F: FnMut(&TaskContext) -> Result<()>,
{
    for key in host_keys {
        let ctx = TaskContext::resolve(key, settings, overrides)?;
        body(&ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::HostEntry;

    fn settings() -> Settings {
        let mut settings = Settings {
            user: "navin".to_string(),
            ..Settings::default()
        };
        settings.hosts.insert(
            "rsh".to_string(),
            HostEntry {
                host: Some("navin@web123.webfaction.com".to_string()),
                project: Some("rs".to_string()),
                ..HostEntry::default()
            },
        );
        settings
    }

    #[test]
    fn wrap_command_remote_project_dir() {
        let ctx = TaskContext::resolve("rsh", &settings(), &Overrides::default()).unwrap();
        let cmd = wrap_command(&ctx.remote, WorkingDir::Project, "git pull");
        assert_eq!(cmd, "cd '/home/navin/webapps/rs/myproject' && git pull");
    }

    #[test]
    fn wrap_command_local_sources_activate() {
        let ctx = TaskContext::resolve("localhost", &settings(), &Overrides::default()).unwrap();
        let cmd = wrap_command(&ctx.remote, WorkingDir::Project, "git pull");
        assert_eq!(
            cmd,
            "cd '/home/navin/localhost' && . '/home/navin/.v/localhost/bin/activate' && git pull"
        );
    }

    #[test]
    fn wrap_command_home_dir() {
        let ctx = TaskContext::resolve("rsh", &settings(), &Overrides::default()).unwrap();
        let cmd = wrap_command(&ctx.remote, WorkingDir::Home, "ls");
        assert_eq!(cmd, "cd '/home/navin' && ls");
    }

    #[test]
    fn force_local_rejects_remote() {
        let ctx = TaskContext::resolve("rsh", &settings(), &Overrides::default()).unwrap();
        assert!(matches!(ctx.force_local(), Err(Error::Config(_))));

        let ctx = TaskContext::resolve("localhost", &settings(), &Overrides::default()).unwrap();
        assert!(ctx.force_local().is_ok());
    }

    #[test]
    fn for_each_host_short_circuits() {
        let mut seen = Vec::new();
        let keys = vec![
            "localhost".to_string(),
            "rsh".to_string(),
            "localhost".to_string(),
        ];
        let err = for_each_host(&keys, &settings(), &Overrides::default(), |ctx| {
            seen.push(ctx.remote.key.clone());
            if ctx.remote.key == "rsh" {
                Err(Error::Config("boom".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        // Third host never ran
        assert_eq!(seen, vec!["localhost", "rsh"]);
    }
}
