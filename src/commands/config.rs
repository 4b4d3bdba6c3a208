use clap::Args;
use siteops::dispatch::TaskContext;
use siteops::Result;

use super::HostArgs;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    host: HostArgs,
}

/// Print the resolved profile for each selected host. Debug aid for
/// checking what the resolver computed before running anything remote.
pub fn run(args: ConfigArgs) -> Result<()> {
    let settings = args.host.load_settings()?;
    let overrides = args.host.overrides();

    for key in args.host.host_keys() {
        let ctx = TaskContext::resolve(&key, &settings, &overrides)?;
        let profile = &ctx.remote;
        println!("{}", serde_json::to_string_pretty(profile)?);
        println!("projectDir:  {}", profile.project_dir().display());
        println!("managepyDir: {}", profile.managepy_dir().display());
        println!("python:      {}", profile.python().display());
        for (i, cmd) in profile.restart_commands().iter().enumerate() {
            println!("restart[{}]:  {}", i, cmd);
        }
    }
    Ok(())
}
