use clap::Args;
use siteops::dispatch::{self, WorkingDir};
use siteops::Result;

use super::HostArgs;

#[derive(Args)]
pub struct CmdArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Shell command to run in the project directory
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

#[derive(Args)]
pub struct RcmdArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Shell command to run in the home directory
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

pub fn run_cmd(args: CmdArgs) -> Result<()> {
    run_in(args.host, args.command, WorkingDir::Project)
}

pub fn run_rcmd(args: RcmdArgs) -> Result<()> {
    run_in(args.host, args.command, WorkingDir::Home)
}

fn run_in(host: HostArgs, command: Vec<String>, workdir: WorkingDir) -> Result<()> {
    let settings = host.load_settings()?;
    let overrides = host.overrides();
    let command = command.join(" ");

    dispatch::for_each_host(&host.host_keys(), &settings, &overrides, |ctx| {
        let stdout = dispatch::run_on(&ctx.remote, workdir, &command)?;
        print!("{}", stdout);
        Ok(())
    })
}
