use clap::Args;
use siteops::backup::BackupDescriptor;
use siteops::dispatch;
use siteops::media;
use siteops::Result;

use super::HostArgs;

#[derive(Args)]
pub struct DumpmediaArgs {
    #[command(flatten)]
    host: HostArgs,
}

pub fn dumpmedia(args: DumpmediaArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    dispatch::for_each_host(&args.host.host_keys(), &settings, &overrides, |ctx| {
        let desc = BackupDescriptor::new(&ctx.remote.project, &settings.backups_dir);
        media::sync_media(ctx, &desc)
    })
}
