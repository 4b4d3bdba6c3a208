use clap::Args;
use siteops::backup::BackupDescriptor;
use siteops::db::{self, RestoreOptions};
use siteops::dispatch;
use siteops::{log_status, Result};

use super::HostArgs;

#[derive(Args)]
pub struct DumpdbArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Remote destination for the dump; defaults to `~/u/<project>.sql.gz`
    #[arg(long, value_name = "PATH")]
    dest_file: Option<String>,
}

pub fn dumpdb(args: DumpdbArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        db::dump_database(&ctx.remote, args.dest_file.as_deref())
    })
}

#[derive(Args)]
pub struct GetdbonlyArgs {
    #[command(flatten)]
    host: HostArgs,
}

pub fn getdbonly(args: GetdbonlyArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        let desc = BackupDescriptor::new(&ctx.remote.project, &settings.backups_dir);
        let link = db::fetch_database(ctx, &desc)?;
        println!("{}", link.display());
        Ok(())
    })
}

#[derive(Args)]
pub struct GetdbArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Skip migrations after loading the dump
    #[arg(long)]
    nomigs: bool,
}

pub fn getdb(args: GetdbArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        let desc = BackupDescriptor::new(&ctx.remote.project, &settings.backups_dir);
        db::fetch_and_replace(ctx, &desc, args.nomigs, &settings)
    })
}

#[derive(Args)]
pub struct ReplacedbArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Dump of database (path, or name resolved under ~/u/)
    file: String,

    /// Prep db for demo after loading
    #[arg(short = 'D', long)]
    demo: bool,

    /// Log debug messages to stderr
    #[arg(short = 'd', long)]
    debug: bool,

    /// Directories to add to project path
    #[arg(short = 'p', long = "project-path", value_name = "DIR")]
    project_path: Vec<String>,

    /// Settings module for the managed app
    #[arg(short = 's', long = "settings-module", value_name = "MODULE")]
    settings_module: Option<String>,

    /// Log messages to console
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Dotted path for the fix_demo script
    #[arg(short = 'f', long, value_name = "SCRIPT")]
    fixdemoscript: Option<String>,

    /// Don't run migrations after loading
    #[arg(short = 'n', long = "no-syncdb")]
    no_syncdb: bool,

    /// Re-register evaluators after loading
    #[arg(short = 'r', long = "register-evaluators")]
    register_evaluators: bool,
}

pub fn replacedb(args: ReplacedbArgs) -> Result<()> {
    let mut settings = args.host.load_settings()?;
    if let Some(script) = &args.fixdemoscript {
        settings.fixdemo_script = script.clone();
    }
    let overrides = args.host.overrides();

    // Accepted but unused; the restore path drives migrations through
    // manage.py directly.
    if !args.project_path.is_empty() {
        log_status!("replacedb", "project path: {}", args.project_path.join(" "));
    }
    if let Some(module) = &args.settings_module {
        log_status!("replacedb", "settings module: {}", module);
    }

    let opts = RestoreOptions {
        no_syncdb: args.no_syncdb,
        demo: args.demo,
        register_evaluators: args.register_evaluators,
        verbose: args.verbose || args.debug,
    };

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        db::restore_database(ctx, &args.file, &opts, &settings)
    })
}
