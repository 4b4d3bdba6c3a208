use crate::backup::BackupDescriptor;
use crate::dispatch::{self, TaskContext};
use crate::error::{Error, Result};
use crate::paths;
use crate::ssh::{self, SshClient};
use crate::utils::shell;

/// Mirror the remote media directory into the local backup tree, archive the
/// mirror in the background, and repoint the local convenience symlinks.
///
/// The mirror is additive: rsync runs without `--delete`, so files removed
/// remotely stick around locally. The tar step is fire-and-forget because
/// archiving tens of gigabytes takes far longer than the sync itself;
/// callers must not assume the archive exists when this returns.
pub fn sync_media(ctx: &TaskContext, desc: &BackupDescriptor) -> Result<()> {
    // The app knows where its media lives; ask it.
    let media_rdir = dispatch::managepy(&ctx.remote, "mediadir")?.trim().to_string();
    if media_rdir.is_empty() {
        return Err(Error::Config(
            "remote 'mediadir' command returned nothing".to_string(),
        ));
    }

    let mirror_dir = desc.media_mirror_dir();
    std::fs::create_dir_all(&mirror_dir)?;

    let rsync_src = match &ctx.remote.connection {
        Some(connection) => format!("{}:{}", connection, media_rdir),
        None => media_rdir.clone(),
    };
    let rsync_cmd = format!(
        "rsync -avz -e ssh {} {}",
        shell::quote_arg(&rsync_src),
        shell::quote_path(&mirror_dir.to_string_lossy())
    );
    log_status!("media", "{}", rsync_cmd);
    let client = SshClient::from_profile(&ctx.local);
    let output = client.execute(&rsync_cmd);
    if !output.success {
        return Err(Error::RemoteCommand {
            command: rsync_cmd,
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    // Archive in the background; never joined, failures unobservable.
    let archive = desc.media_archive();
    let tar_cmd = format!(
        "tar -czf {} --directory {} .",
        shell::quote_path(&archive.to_string_lossy()),
        shell::quote_path(&mirror_dir.to_string_lossy())
    );
    log_status!("media", "Archiving in the background: {}", tar_cmd);
    ssh::spawn_local_detached(&tar_cmd);

    // site_media in the local checkout points at the fresh mirror
    let site_media_link = ctx.local.managepy_dir().join("site_media");
    paths::replace_symlink(&mirror_dir.join("site_media"), &site_media_link)?;

    // ~/u/<project>-media.tgz points at the (eventual) timestamped archive
    let latest_link = desc.latest_media_link(&ctx.local.home);
    paths::replace_symlink(&archive, &latest_link)?;

    Ok(())
}
