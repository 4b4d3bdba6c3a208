//! Local-only manage.py conveniences. Each refuses to run against a remote
//! host.

use clap::Args;
use siteops::utils::shell;
use siteops::Result;

use super::managepy::run_local_managepy;
use super::HostArgs;

#[derive(Args)]
pub struct FindmigsArgs {
    #[command(flatten)]
    host: HostArgs,

    /// App to make migrations for (all apps when omitted)
    appname: Option<String>,
}

pub fn findmigs(args: FindmigsArgs) -> Result<()> {
    let command = format!(
        "makemigrations {}",
        args.appname.as_deref().unwrap_or_default()
    );
    run_local_managepy(&args.host, command.trim())
}

#[derive(Args)]
pub struct RegevalsArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Company to register evaluators for (all companies when omitted)
    company: Option<String>,
}

pub fn regevals(args: RegevalsArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let company = args.company.unwrap_or(settings.evaluators_company);
    run_local_managepy(
        &args.host,
        &format!("register_evaluators -f -c {}", shell::quote_arg(&company)),
    )
}

#[derive(Args)]
pub struct RunscriptArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Dotted path of the script to run with django initialized
    script: String,

    /// Arguments passed through to the script (a0 a1 kw=val ...)
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

pub fn runscript(args: RunscriptArgs) -> Result<()> {
    let command = format!(
        "runcmd {} {}",
        shell::quote_arg(&args.script),
        shell::quote_args(&args.args)
    );
    run_local_managepy(&args.host, command.trim())
}
