use clap::Args;
use siteops::dispatch;
use siteops::Result;

use super::HostArgs;

#[derive(Args)]
pub struct ManagepyArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Run against the operator machine instead of the selected host
    #[arg(long)]
    local: bool,

    /// manage.py command and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

pub fn run(args: ManagepyArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();
    let command = args.command.join(" ");

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        let profile = if args.local { &ctx.local } else { &ctx.remote };
        let stdout = dispatch::managepy(profile, &command)?;
        print!("{}", stdout);
        Ok(())
    })
}

/// Shared by the composed commands that just wrap one manage.py call on the
/// local machine.
pub fn run_local_managepy(host: &HostArgs, command: &str) -> Result<()> {
    let settings = host.load_settings()?;
    let overrides = host.overrides();

    dispatch::for_each_host(&host.host_keys(), &settings, &overrides, |ctx| {
        let local = ctx.force_local()?;
        let stdout = dispatch::managepy(local, command)?;
        print!("{}", stdout);
        Ok(())
    })
}
