use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Base siteops config directory (`~/.config/siteops/`).
pub fn siteops() -> Result<PathBuf> {
    let home = env::var("HOME")
        .map_err(|_| Error::Config("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join(".config").join("siteops"))
}

/// Global siteops.json settings file path
pub fn settings_json() -> Result<PathBuf> {
    Ok(siteops()?.join("siteops.json"))
}

/// Expand a leading `~` in a path.
pub fn expanduser(path: &str) -> String {
    shellexpand::tilde(path).to_string()
}

/// Repoint `link` at `target`, replacing any existing symlink.
///
/// A missing old link is a no-op, not an error, so a fresh checkout and a
/// re-run behave the same. The remove and the link happen back to back so
/// the canonical path is never left dangling at a stale target.
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    match std::fs::remove_file(link) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent)?;
    }
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)?;
        Ok(())
    }
    #[cfg(not(unix))]
    {
        let _ = target;
        Err(Error::Config(
            "symlink replacement is only supported on unix".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_symlink_creates_and_repoints() {
        let dir = tempfile::tempdir().unwrap();
        let old_target = dir.path().join("db04Jan2024.sql.gz");
        let new_target = dir.path().join("db05Jan2024.sql.gz");
        std::fs::write(&old_target, b"old").unwrap();
        std::fs::write(&new_target, b"new").unwrap();

        let link = dir.path().join("u").join("demo.sql.gz");

        // First call: no pre-existing link
        replace_symlink(&old_target, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), old_target);

        // Second call: stale link is removed first, then repointed
        replace_symlink(&new_target, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), new_target);
        assert_eq!(std::fs::read(&link).unwrap(), b"new");
    }

    #[test]
    fn replace_symlink_tolerates_dangling_old_link() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("removed.sql.gz");
        let target = dir.path().join("db05Jan2024.sql.gz");
        std::fs::write(&target, b"x").unwrap();

        let link = dir.path().join("demo.sql.gz");
        // Dangling link: target never existed
        std::os::unix::fs::symlink(&gone, &link).unwrap();

        replace_symlink(&target, &link).unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
    }
}
