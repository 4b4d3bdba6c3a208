use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

use commands::{config, db, local, mail, managepy, media, run, upgrade};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "siteops")]
#[command(version = VERSION)]
#[command(about = "Host-aware deployment, backup and restore for Django sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration for the selected hosts
    Config(config::ConfigArgs),
    /// Run a manage.py command on each selected host
    Managepy(managepy::ManagepyArgs),
    /// Run a shell command in the project directory
    Cmd(run::CmdArgs),
    /// Run a shell command in the home directory
    Rcmd(run::RcmdArgs),
    /// Restart the app server on each selected host
    Restart(upgrade::RestartArgs),
    /// Pull latest source, migrate, collect static assets, restart
    Upgrade(upgrade::UpgradeArgs),
    /// Dump the database to a file on the remote host
    Dumpdb(db::DumpdbArgs),
    /// Mirror remote media into the backups dir and archive it
    Dumpmedia(media::DumpmediaArgs),
    /// Fetch the remote database dump (no media, no replace)
    Getdbonly(db::GetdbonlyArgs),
    /// Fetch db and media, then replace the local database
    Getdb(db::GetdbArgs),
    /// Replace the local database from a dump file
    Replacedb(db::ReplacedbArgs),
    /// makemigrations for an app (local only)
    Findmigs(local::FindmigsArgs),
    /// Re-register evaluators for a company (local only)
    Regevals(local::RegevalsArgs),
    /// Run a standalone script with django initialized (local only)
    Runscript(local::RunscriptArgs),
    /// Send a plain-text email through the configured provider
    SendMail(mail::SendMailArgs),
}

fn dispatch(command: Commands) -> siteops::Result<()> {
    match command {
        Commands::Config(args) => config::run(args),
        Commands::Managepy(args) => managepy::run(args),
        Commands::Cmd(args) => run::run_cmd(args),
        Commands::Rcmd(args) => run::run_rcmd(args),
        Commands::Restart(args) => upgrade::restart(args),
        Commands::Upgrade(args) => upgrade::run(args),
        Commands::Dumpdb(args) => db::dumpdb(args),
        Commands::Dumpmedia(args) => media::dumpmedia(args),
        Commands::Getdbonly(args) => db::getdbonly(args),
        Commands::Getdb(args) => db::getdb(args),
        Commands::Replacedb(args) => db::replacedb(args),
        Commands::Findmigs(args) => local::findmigs(args),
        Commands::Regevals(args) => local::regevals(args),
        Commands::Runscript(args) => local::runscript(args),
        Commands::SendMail(args) => mail::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[{}] {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
