use crate::error::Result;
use crate::host::HostKind;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "deploy".to_string())
}

fn default_backups_dir() -> String {
    paths::expanduser("~/Backups/websites")
}

fn default_fixdemo_script() -> String {
    "scripts.pyfixtures.fix_demo".to_string()
}

fn default_evaluators_company() -> String {
    "reliscore".to_string()
}

/// Per-host entry in the settings file. Every field is optional; the
/// resolver fills gaps with its layered defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEntry {
    /// Provider layout; inferred from `host` when absent.
    #[serde(default)]
    pub kind: Option<HostKind>,
    /// Connection target, e.g. `navin@web123.webfaction.com`.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub venv: Option<String>,
    #[serde(default)]
    pub managepy_subdir: Option<String>,
}

/// Database credentials for the restore path. Read from settings, never
/// hard-coded; the Rust side does not load the Django settings module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailSettings {
    #[serde(default)]
    pub api_key: String,
    /// Override for tests and self-hosted relays.
    #[serde(default = "MailSettings::default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub from_name: String,
}

impl MailSettings {
    fn default_api_url() -> String {
        "https://api.sendgrid.com/v3/mail/send".to_string()
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        MailSettings {
            api_key: String::new(),
            api_url: MailSettings::default_api_url(),
            from_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Account name used for the `/home/<user>` default.
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_backups_dir")]
    pub backups_dir: String,
    #[serde(default)]
    pub hosts: HashMap<String, HostEntry>,
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Database names replacedb must never drop, whatever the project says.
    #[serde(default)]
    pub production_databases: Vec<String>,
    #[serde(default = "default_fixdemo_script")]
    pub fixdemo_script: String,
    /// Company passed to `register_evaluators -c` when none is given.
    #[serde(default = "default_evaluators_company")]
    pub evaluators_company: String,
    #[serde(default)]
    pub mail: MailSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            user: default_user(),
            backups_dir: default_backups_dir(),
            hosts: HashMap::new(),
            database: DatabaseSettings::default(),
            production_databases: Vec::new(),
            fixdemo_script: default_fixdemo_script(),
            evaluators_company: default_evaluators_company(),
            mail: MailSettings::default(),
        }
    }
}

impl Settings {
    /// Load `~/.config/siteops/siteops.json`, falling back to defaults when
    /// the file does not exist yet.
    pub fn load() -> Result<Self> {
        let path = paths::settings_json()?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings = Settings::parse("{}").unwrap();
        assert!(settings.backups_dir.ends_with("Backups/websites"));
        assert!(settings.hosts.is_empty());
        assert_eq!(settings.fixdemo_script, "scripts.pyfixtures.fix_demo");
        assert_eq!(settings.evaluators_company, "reliscore");
        assert_eq!(
            settings.mail.api_url,
            "https://api.sendgrid.com/v3/mail/send"
        );
    }

    #[test]
    fn host_entries_parse() {
        let settings = Settings::parse(
            r#"{
                "user": "navin",
                "hosts": {
                    "rsh": {"host": "navin@web123.webfaction.com", "project": "rs"},
                    "rso": {"kind": "opalstack", "host": "navin@opal.opalstack.com"}
                },
                "productionDatabases": ["navin_rs", "navin_rsph"]
            }"#,
        )
        .unwrap();
        assert_eq!(settings.user, "navin");
        assert_eq!(
            settings.hosts["rsh"].project.as_deref(),
            Some("rs")
        );
        assert_eq!(settings.hosts["rso"].kind, Some(HostKind::Opalstack));
        assert_eq!(settings.production_databases.len(), 2);
    }
}
