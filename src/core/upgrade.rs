use crate::dispatch::{self, TaskContext, WorkingDir};
use crate::error::Result;
use crate::host::HostProfile;

/// Run the host's restart commands in order (stop-then-start on opalstack),
/// short-circuiting if one fails.
pub fn restart(profile: &HostProfile) -> Result<()> {
    for command in profile.restart_commands() {
        dispatch::run_on(profile, WorkingDir::Home, &command)?;
    }
    Ok(())
}

/// Pull latest source and bring the running site current, without touching
/// the app server.
pub fn upgrade_no_restart(ctx: &TaskContext) -> Result<()> {
    dispatch::run_on(&ctx.remote, WorkingDir::Project, "git pull")?;
    dispatch::run_on(&ctx.remote, WorkingDir::Project, "git submodule update")?;
    dispatch::managepy(&ctx.remote, "migrate -v 0")?;
    dispatch::managepy(&ctx.remote, "collectstatic --noinput")?;
    Ok(())
}

/// Full upgrade: pull, migrate, collect static assets, restart. Steps run in
/// that fixed order and the first failure aborts the rest; there is no
/// rollback of already-completed steps.
pub fn upgrade(ctx: &TaskContext) -> Result<()> {
    upgrade_no_restart(ctx)?;
    restart(&ctx.remote)
}
