use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Deterministic backup naming for one `(project, date)` pair.
///
/// Filenames carry a day-granularity timestamp (`05Jan2024`), so re-running
/// a backup on the same day overwrites the earlier artifact. No random
/// component anywhere.
#[derive(Debug, Clone)]
pub struct BackupDescriptor {
    pub project: String,
    pub backups_dir: String,
    date: NaiveDate,
}

impl BackupDescriptor {
    pub fn new(project: &str, backups_dir: &str) -> Self {
        Self::with_date(project, backups_dir, chrono::Local::now().date_naive())
    }

    /// Fixed-date constructor, used by tests and by callers that must agree
    /// on a timestamp across steps.
    pub fn with_date(project: &str, backups_dir: &str, date: NaiveDate) -> Self {
        Self {
            project: project.to_string(),
            backups_dir: backups_dir.to_string(),
            date,
        }
    }

    /// `05Jan2024`-style timestamp, one value per day.
    pub fn timestamp(&self) -> String {
        self.date.format("%d%b%Y").to_string()
    }

    /// `<backups_dir>/<project>/`
    pub fn project_backup_dir(&self) -> PathBuf {
        Path::new(&self.backups_dir).join(&self.project)
    }

    pub fn timestamped_file(&self, prefix: &str, ext: &str) -> PathBuf {
        self.project_backup_dir()
            .join(format!("{}{}{}", prefix, self.timestamp(), ext))
    }

    /// Local timestamped database dump: `<backups>/<project>/db<ts>.sql.gz`
    pub fn db_file(&self) -> PathBuf {
        self.timestamped_file("db", ".sql.gz")
    }

    /// Local timestamped media archive: `<backups>/<project>/media<ts>.tgz`
    pub fn media_archive(&self) -> PathBuf {
        self.timestamped_file("media", ".tgz")
    }

    /// rsync mirror of the remote media directory.
    pub fn media_mirror_dir(&self) -> PathBuf {
        self.project_backup_dir().join("media")
    }

    /// Where the remote dump lands, relative to the remote home dir.
    pub fn remote_dump_relpath(&self) -> String {
        format!("u/{}.sql.gz", self.project)
    }

    /// Canonical "latest dump" symlink under the operator's home.
    pub fn latest_db_link(&self, home: &str) -> PathBuf {
        Path::new(home).join(self.remote_dump_relpath())
    }

    /// Canonical "latest media archive" symlink under the operator's home.
    pub fn latest_media_link(&self, home: &str) -> PathBuf {
        Path::new(home)
            .join("u")
            .join(format!("{}-media.tgz", self.project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> BackupDescriptor {
        BackupDescriptor::with_date(
            "demo",
            "/home/navin/Backups/websites",
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(demo().timestamp(), "05Jan2024");
    }

    #[test]
    fn filenames_are_deterministic() {
        let a = demo().timestamped_file("db", ".sql.gz");
        let b = demo().timestamped_file("db", ".sql.gz");
        assert_eq!(a, b);
        assert_eq!(
            a,
            PathBuf::from("/home/navin/Backups/websites/demo/db05Jan2024.sql.gz")
        );
    }

    #[test]
    fn media_paths() {
        let d = demo();
        assert_eq!(
            d.media_archive(),
            PathBuf::from("/home/navin/Backups/websites/demo/media05Jan2024.tgz")
        );
        assert_eq!(
            d.media_mirror_dir(),
            PathBuf::from("/home/navin/Backups/websites/demo/media")
        );
        assert_eq!(
            d.latest_media_link("/home/navin"),
            PathBuf::from("/home/navin/u/demo-media.tgz")
        );
    }

    #[test]
    fn remote_dump_paths() {
        let d = demo();
        assert_eq!(d.remote_dump_relpath(), "u/demo.sql.gz");
        assert_eq!(
            d.latest_db_link("/home/navin"),
            PathBuf::from("/home/navin/u/demo.sql.gz")
        );
    }
}
