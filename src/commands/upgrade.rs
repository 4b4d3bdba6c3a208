use clap::Args;
use siteops::dispatch;
use siteops::upgrade;
use siteops::Result;

use super::HostArgs;

#[derive(Args)]
pub struct RestartArgs {
    #[command(flatten)]
    host: HostArgs,
}

pub fn restart(args: RestartArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        upgrade::restart(&ctx.remote)
    })
}

#[derive(Args)]
pub struct UpgradeArgs {
    #[command(flatten)]
    host: HostArgs,

    /// Skip the restart step
    #[arg(long)]
    no_restart: bool,
}

pub fn run(args: UpgradeArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        if args.no_restart {
            upgrade::upgrade_no_restart(ctx)
        } else {
            upgrade::upgrade(ctx)
        }
    })
}
