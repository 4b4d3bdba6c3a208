use clap::Args;
use siteops::host::{Overrides, LOCALHOST};
use siteops::settings::Settings;
use siteops::Result;

pub mod config;
pub mod db;
pub mod local;
pub mod mail;
pub mod managepy;
pub mod media;
pub mod run;
pub mod upgrade;

/// Host selection and per-invocation overrides, shared by every task that
/// targets a host. `-H` may be repeated; no `-H` means localhost.
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Target host key (repeatable)
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Override the home directory
    #[arg(long)]
    pub home: Option<String>,

    /// Override the project name
    #[arg(long)]
    pub project: Option<String>,

    /// Override the virtualenv name
    #[arg(long)]
    pub venv: Option<String>,

    /// Override the manage.py subdirectory
    #[arg(long, value_name = "SUBDIR")]
    pub managepy_subdir: Option<String>,

    /// Override the backups root directory
    #[arg(long, value_name = "DIR")]
    pub backups_dir: Option<String>,
}

impl HostArgs {
    pub fn host_keys(&self) -> Vec<String> {
        if self.hosts.is_empty() {
            vec![LOCALHOST.to_string()]
        } else {
            self.hosts.clone()
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            home: self.home.clone(),
            project: self.project.clone(),
            venv: self.venv.clone(),
            managepy_subdir: self.managepy_subdir.clone(),
        }
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = Settings::load()?;
        if let Some(dir) = &self.backups_dir {
            settings.backups_dir = shellexpand::tilde(dir).to_string();
        }
        Ok(settings)
    }
}
