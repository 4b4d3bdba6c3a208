use crate::backup::BackupDescriptor;
use crate::dispatch::{self, TaskContext};
use crate::error::{Error, Result};
use crate::host::HostProfile;
use crate::paths;
use crate::settings::Settings;
use crate::ssh::SshClient;
use crate::utils::shell;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run the remote `dumpdb` management command, writing the gzipped dump to
/// `dest` on the remote side (the app's default location when `None`).
pub fn dump_database(profile: &HostProfile, dest: Option<&str>) -> Result<()> {
    let command = match dest {
        Some(dest) => format!("dumpdb --output={}", dest),
        None => "dumpdb".to_string(),
    };
    dispatch::managepy(profile, &command).map_err(|e| match e {
        Error::RemoteCommand { stderr, .. } => Error::Dump(stderr),
        other => other,
    })?;
    Ok(())
}

/// All paths involved in one database fetch, computed up front so the
/// sequence below is a straight line (and so tests can check the plan
/// without touching a remote).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Where the dump lands on the remote host.
    pub remote_path: PathBuf,
    /// Local timestamped copy under the backups dir.
    pub local_file: PathBuf,
    /// Canonical "latest" symlink under the operator home.
    pub canonical_link: PathBuf,
}

pub fn plan_fetch(ctx: &TaskContext, desc: &BackupDescriptor) -> FetchPlan {
    FetchPlan {
        remote_path: Path::new(&ctx.remote.home).join(desc.remote_dump_relpath()),
        local_file: desc.db_file(),
        canonical_link: desc.latest_db_link(&ctx.local.home),
    }
}

/// Dump the remote database, pull the file down, and repoint the canonical
/// symlink at the fresh timestamped copy. Returns the canonical link path.
///
/// The link swap happens only after the transfer succeeded, so the canonical
/// path always points at the most recent complete fetch.
pub fn fetch_database(ctx: &TaskContext, desc: &BackupDescriptor) -> Result<PathBuf> {
    let plan = plan_fetch(ctx, desc);

    let remote_path = plan.remote_path.to_string_lossy();
    dump_database(&ctx.remote, Some(remote_path.as_ref()))?;

    if let Some(parent) = plan.local_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log_status!("db", "Getting {}", desc.remote_dump_relpath());
    let client = SshClient::from_profile(&ctx.remote);
    let output = client.download(
        &plan.remote_path.to_string_lossy(),
        &plan.local_file.to_string_lossy(),
    );
    if !output.success {
        return Err(Error::RemoteCommand {
            command: format!("get {}", plan.remote_path.display()),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    paths::replace_symlink(&plan.local_file, &plan.canonical_link)?;
    Ok(plan.canonical_link)
}

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Skip migrations after loading the dump.
    pub no_syncdb: bool,
    /// Run the fix-demo script after loading.
    pub demo: bool,
    /// Re-register evaluators after loading.
    pub register_evaluators: bool,
    pub verbose: bool,
}

/// The guard in front of every destructive restore step. Refuses unless the
/// project name marks a disposable database, and independently refuses any
/// database name on the production denylist.
pub fn check_restore_target(project: &str, db_name: &str, settings: &Settings) -> Result<()> {
    if !project.contains("local") && !project.contains("demo") {
        return Err(Error::UnsafeTarget(project.to_string()));
    }
    if settings
        .production_databases
        .iter()
        .any(|name| name == db_name)
    {
        return Err(Error::UnsafeTarget(db_name.to_string()));
    }
    Ok(())
}

/// A dump argument may be a literal path, a path missing its `.sql.gz`
/// suffix, or a bare project name living under `~/u/`.
pub fn resolve_dump_file(file: &str) -> Result<PathBuf> {
    let literal = PathBuf::from(paths::expanduser(file));
    if literal.exists() {
        return Ok(literal);
    }
    let candidates = [
        PathBuf::from(format!("{}.sql.gz", literal.display())),
        PathBuf::from(paths::expanduser(&format!("~/u/{}.sql.gz", file))),
    ];
    for candidate in candidates {
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(Error::Config(format!("{} not found", file)))
}

/// `register_evaluators -f -c <company>`; the company comes from settings.
pub fn register_evaluators_command(settings: &Settings) -> String {
    format!(
        "register_evaluators -f -c {}",
        shell::quote_arg(&settings.evaluators_company)
    )
}

fn mysql_admin(settings: &Settings, statement: &str) -> Command {
    let db = &settings.database;
    let password = format!("--password={}", db.password);
    let mut cmd = Command::new("mysql");
    cmd.args(["-u", db.user.as_str(), password.as_str(), "-e", statement]);
    cmd
}

/// Drop and recreate the target database, then stream the decompressed dump
/// into the mysql client. Dropping a database that does not exist is the one
/// silently tolerated failure in the system.
fn load_dump(dump_file: &Path, settings: &Settings) -> Result<()> {
    let db = &settings.database;

    let drop = mysql_admin(settings, &format!("drop database {}", db.name)).output()?;
    if drop.status.success() {
        log_status!("replacedb", "Dropped database {}", db.name);
    }

    let create = mysql_admin(
        settings,
        &format!(
            "create database {} character set utf8 collate utf8_general_ci",
            db.name
        ),
    )
    .output()?;
    if !create.status.success() {
        return Err(Error::RemoteCommand {
            command: format!("create database {}", db.name),
            exit_code: create.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&create.stderr).to_string(),
        });
    }
    log_status!("replacedb", "Created database {}", db.name);

    // gunzip --stdout <dump> | mysql -u <user> --password=... <name>
    let mut unzip = Command::new("gunzip")
        .args(["--stdout", &dump_file.to_string_lossy()])
        .stdout(Stdio::piped())
        .spawn()?;
    let unzip_stdout = unzip
        .stdout
        .take()
        .ok_or_else(|| Error::Config("gunzip produced no stdout pipe".to_string()))?;

    let password = format!("--password={}", db.password);
    let mysql = Command::new("mysql")
        .args(["-u", db.user.as_str(), password.as_str(), db.name.as_str()])
        .stdin(unzip_stdout)
        .output()?;
    let unzip_status = unzip.wait()?;

    if !unzip_status.success() {
        return Err(Error::RemoteCommand {
            command: format!("gunzip --stdout {}", dump_file.display()),
            exit_code: unzip_status.code().unwrap_or(-1),
            stderr: String::new(),
        });
    }
    if !mysql.status.success() {
        return Err(Error::RemoteCommand {
            command: format!("mysql {}", db.name),
            exit_code: mysql.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&mysql.stderr).to_string(),
        });
    }
    Ok(())
}

/// Replace the local database with a dump, then bring the schema current.
/// Local-only; the safety check runs before anything destructive.
pub fn restore_database(
    ctx: &TaskContext,
    file: &str,
    opts: &RestoreOptions,
    settings: &Settings,
) -> Result<()> {
    let local = ctx.force_local()?;
    check_restore_target(&local.project, &settings.database.name, settings)?;

    let dump_file = resolve_dump_file(file)?;
    if opts.verbose {
        log_status!(
            "replacedb",
            "started at {}",
            chrono::Local::now().format("%H:%M:%S")
        );
    }
    log_status!("replacedb", "Replacing db from {}", dump_file.display());

    load_dump(&dump_file, settings)?;

    if !opts.no_syncdb {
        dispatch::managepy(local, "migrate -v 0")?;
    }
    if opts.demo {
        dispatch::managepy(local, &format!("runcmd {}", settings.fixdemo_script))?;
    }
    if opts.register_evaluators {
        dispatch::managepy(local, &register_evaluators_command(settings))?;
    }
    Ok(())
}

/// `getdb`: fetch the remote dump and media, then replace the local
/// database with it. Short-circuits at the first failing step.
pub fn fetch_and_replace(
    ctx: &TaskContext,
    desc: &BackupDescriptor,
    no_syncdb: bool,
    settings: &Settings,
) -> Result<()> {
    let dbfile = fetch_database(ctx, desc)?;
    crate::media::sync_media(ctx, desc)?;

    let local_ctx = TaskContext {
        remote: ctx.local.clone(),
        local: ctx.local.clone(),
    };
    let opts = RestoreOptions {
        no_syncdb,
        ..RestoreOptions::default()
    };
    restore_database(&local_ctx, &dbfile.to_string_lossy(), &opts, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Overrides;
    use crate::settings::HostEntry;
    use chrono::NaiveDate;

    fn settings() -> Settings {
        let mut settings = Settings {
            user: "navin".to_string(),
            ..Settings::default()
        };
        settings.hosts.insert(
            "demo".to_string(),
            HostEntry {
                host: Some("navin@demo.webfaction.com".to_string()),
                ..HostEntry::default()
            },
        );
        settings
    }

    fn demo_ctx() -> TaskContext {
        TaskContext::resolve("demo", &settings(), &Overrides::default()).unwrap()
    }

    #[test]
    fn fetch_plan_matches_layout() {
        let desc = BackupDescriptor::with_date(
            "demo",
            "/home/navin/Backups/websites",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        );
        let plan = plan_fetch(&demo_ctx(), &desc);

        assert_eq!(plan.remote_path, PathBuf::from("/home/navin/u/demo.sql.gz"));
        assert_eq!(
            plan.local_file,
            PathBuf::from("/home/navin/Backups/websites/demo/db05Jan2024.sql.gz")
        );
        assert_eq!(
            plan.canonical_link,
            PathBuf::from("/home/navin/u/demo.sql.gz")
        );
    }

    #[test]
    fn restore_refuses_production_project() {
        // "rs" contains neither "local" nor "demo"
        let err = check_restore_target("rs", "navin_rslocal", &settings()).unwrap_err();
        assert!(matches!(err, Error::UnsafeTarget(_)));
        assert_eq!(err.code(), "UNSAFE_TARGET");
    }

    #[test]
    fn restore_refuses_denylisted_database() {
        let mut settings = settings();
        settings.production_databases = vec!["navin_rs".to_string()];
        let err = check_restore_target("rsdemo", "navin_rs", &settings).unwrap_err();
        assert!(matches!(err, Error::UnsafeTarget(_)));
        // The message names the database, not the project heuristic
        assert_eq!(
            err.to_string(),
            "Refusing to replace database: 'navin_rs' is not a disposable local/demo target"
        );
    }

    #[test]
    fn restore_allows_local_and_demo_projects() {
        assert!(check_restore_target("rslocal", "navin_rslocal", &settings()).is_ok());
        assert!(check_restore_target("rsdemo", "navin_rsdemo", &settings()).is_ok());
    }

    #[test]
    fn restore_database_is_a_noop_on_unsafe_target() {
        // Project "rs" fails the guard before any mysql call; the dump file
        // does not even need to exist.
        let mut settings = settings();
        settings.hosts.insert(
            "localhost".to_string(),
            HostEntry {
                project: Some("rs".to_string()),
                ..HostEntry::default()
            },
        );
        let ctx = TaskContext::resolve("localhost", &settings, &Overrides::default()).unwrap();
        let err = restore_database(
            &ctx,
            "/nonexistent/dump.sql.gz",
            &RestoreOptions::default(),
            &settings,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsafeTarget(_)));
    }

    #[test]
    fn register_evaluators_always_names_a_company() {
        assert_eq!(
            register_evaluators_command(&settings()),
            "register_evaluators -f -c reliscore"
        );

        let mut settings = settings();
        settings.evaluators_company = "acme corp".to_string();
        assert_eq!(
            register_evaluators_command(&settings),
            "register_evaluators -f -c 'acme corp'"
        );
    }

    #[test]
    fn dump_file_fallback_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("demo.sql.gz");
        std::fs::write(&gz, b"fake").unwrap();

        // Literal path wins
        let resolved = resolve_dump_file(&gz.to_string_lossy()).unwrap();
        assert_eq!(resolved, gz);

        // Missing suffix is filled in
        let bare = dir.path().join("demo");
        let resolved = resolve_dump_file(&bare.to_string_lossy()).unwrap();
        assert_eq!(resolved, gz);

        let err = resolve_dump_file("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
