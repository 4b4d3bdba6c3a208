use crate::error::{Error, Result};
use crate::settings::{HostEntry, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LOCALHOST: &str = "localhost";

/// Hosting-provider layout. Each variant dictates where the project lives,
/// which python interpreter to use, and how the app server is restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    Local,
    Webfaction,
    Opalstack,
}

/// CLI-level overrides. Highest precedence in the resolution order:
/// override > per-host settings entry > global default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub home: Option<String>,
    pub project: Option<String>,
    pub venv: Option<String>,
    pub managepy_subdir: Option<String>,
}

/// One deployable target, fully resolved. Immutable for the lifetime of an
/// invocation; all paths derive from the fields below.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostProfile {
    pub key: String,
    pub kind: HostKind,
    pub home: String,
    pub project: String,
    pub venv: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub managepy_subdir: String,
    /// `user@host` for remote execution; `None` runs everything locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

impl HostProfile {
    pub fn is_local(&self) -> bool {
        self.connection.is_none()
    }

    /// Directory holding the checkout (git commands run here).
    pub fn project_dir(&self) -> PathBuf {
        let home = Path::new(&self.home);
        match self.kind {
            HostKind::Local => home.join(&self.project),
            HostKind::Webfaction => home.join("webapps").join(&self.project).join("myproject"),
            HostKind::Opalstack => home.join("apps").join(&self.project).join("myproject"),
        }
    }

    /// Directory containing manage.py. Always `project_dir` or a
    /// subdirectory of it.
    pub fn managepy_dir(&self) -> PathBuf {
        if self.managepy_subdir.is_empty() {
            self.project_dir()
        } else {
            self.project_dir().join(&self.managepy_subdir)
        }
    }

    pub fn python(&self) -> PathBuf {
        let home = Path::new(&self.home);
        match self.kind {
            HostKind::Local | HostKind::Webfaction => {
                home.join(".v").join(&self.venv).join("bin").join("python")
            }
            HostKind::Opalstack => home
                .join("apps")
                .join(&self.project)
                .join("env")
                .join("bin")
                .join("python"),
        }
    }

    /// Restart commands in execution order. Opalstack wants stop-then-start;
    /// webfaction has a single apache restart script; localhost has nothing
    /// to restart.
    pub fn restart_commands(&self) -> Vec<String> {
        let home = Path::new(&self.home);
        match self.kind {
            HostKind::Local => vec![],
            HostKind::Webfaction => vec![home
                .join("webapps")
                .join(&self.project)
                .join("apache2")
                .join("bin")
                .join("restart")
                .to_string_lossy()
                .to_string()],
            HostKind::Opalstack => {
                let app = home.join("apps").join(&self.project);
                vec![
                    app.join("stop").to_string_lossy().to_string(),
                    app.join("start").to_string_lossy().to_string(),
                ]
            }
        }
    }

    /// Virtualenv activation script, sourced before task bodies on hosts
    /// that rely on an activated environment.
    pub fn activate_script(&self) -> Option<PathBuf> {
        match self.kind {
            HostKind::Local => Some(
                Path::new(&self.home)
                    .join(".v")
                    .join(&self.venv)
                    .join("bin")
                    .join("activate"),
            ),
            HostKind::Webfaction | HostKind::Opalstack => None,
        }
    }
}

fn infer_kind(key: &str, entry: &HostEntry) -> Result<HostKind> {
    if let Some(kind) = entry.kind {
        return Ok(kind);
    }
    let hoststr = entry.host.as_deref().unwrap_or(key);
    if hoststr.contains("webfaction") {
        Ok(HostKind::Webfaction)
    } else if hoststr.contains("opalstack") {
        Ok(HostKind::Opalstack)
    } else if hoststr.contains(LOCALHOST) || hoststr.is_empty() {
        Ok(HostKind::Local)
    } else {
        Err(Error::UnknownHost(key.to_string()))
    }
}

/// Resolve a host key into a coherent profile.
///
/// Pure function of its inputs: it touches neither the filesystem nor the
/// network, so every invocation sees one immutable bundle of values.
pub fn resolve(host_key: &str, settings: &Settings, overrides: &Overrides) -> Result<HostProfile> {
    let empty = HostEntry::default();
    let entry = settings.hosts.get(host_key).unwrap_or(&empty);

    let kind = infer_kind(host_key, entry)?;

    let home = overrides
        .home
        .clone()
        .or_else(|| entry.home.clone())
        .unwrap_or_else(|| format!("/home/{}", settings.user));

    let project = overrides
        .project
        .clone()
        .or_else(|| entry.project.clone())
        .unwrap_or_else(|| host_key.to_string());

    let venv = overrides
        .venv
        .clone()
        .or_else(|| entry.venv.clone())
        .unwrap_or_else(|| project.clone());

    let managepy_subdir = overrides
        .managepy_subdir
        .clone()
        .or_else(|| entry.managepy_subdir.clone())
        .unwrap_or_default();

    let connection = match kind {
        HostKind::Local => None,
        _ => Some(
            entry
                .host
                .clone()
                .unwrap_or_else(|| format!("{}@{}", settings.user, host_key)),
        ),
    };

    Ok(HostProfile {
        key: host_key.to_string(),
        kind,
        home,
        project,
        venv,
        managepy_subdir,
        connection,
    })
}

/// Resolve the operator's own machine. Overrides apply here too, so
/// `--backups-dir`-style flags behave the same for local tasks.
pub fn resolve_local(settings: &Settings, overrides: &Overrides) -> Result<HostProfile> {
    resolve(LOCALHOST, settings, overrides)
}
