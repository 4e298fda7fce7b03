// src/logfile.rs
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

/// Default audit log location, relative to the process working directory.
/// This is a convention shared with the hosting application, not a
/// configuration value.
pub const DEFAULT_LOG_DIR: &str = "api/logs";

/// Resolves and opens the per-day audit file.
///
/// One CSV file per UTC calendar day, named `<YYYY-MM-DD>_api_requests.csv`,
/// created lazily on the first request of the day and opened append-mode on
/// every request. Files are never rotated or deleted here; retention belongs
/// to the operator.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
    timestamps: bool,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            timestamps: false,
        }
    }

    /// Relocate the log directory (tests, non-default deployments).
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Prefix every CSV record with an RFC-3339 UTC timestamp field.
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// File name for one UTC calendar day's audit log.
    pub fn file_name(date: NaiveDate) -> String {
        format!("{}_api_requests.csv", date.format("%Y-%m-%d"))
    }

    /// Path of the audit file for one UTC calendar day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(date))
    }

    /// Path of the audit file for the current UTC day.
    pub fn path_for_today(&self) -> PathBuf {
        self.path_for(Utc::now().date_naive())
    }

    /// Open today's audit file for appending, creating the directory (and any
    /// missing parents) and the file on first use. Append-mode writes are
    /// positioned at end-of-file by the OS, so concurrent requests can share
    /// the handle-per-request model without an in-process lock.
    pub fn open_today(&self) -> std::io::Result<File> {
        fs::create_dir_all(&self.dir)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for_today())
    }

    /// RFC-3339 UTC timestamp (second precision) for in-line record fields.
    pub fn line_timestamp(now: DateTime<Utc>) -> String {
        now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_is_date_prefixed_csv() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(AuditLog::file_name(date), "2024-03-07_api_requests.csv");
    }

    #[test]
    fn line_timestamp_is_rfc3339_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        assert_eq!(AuditLog::line_timestamp(now), "2024-03-07T15:04:05Z");
    }

    #[test]
    fn consecutive_days_resolve_to_distinct_files() {
        let audit = AuditLog::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let tomorrow = today.succ_opt().unwrap();

        assert_ne!(audit.path_for(today), audit.path_for(tomorrow));
        assert_eq!(
            audit.path_for(tomorrow),
            Path::new(DEFAULT_LOG_DIR).join("2024-03-08_api_requests.csv")
        );
    }

    #[test]
    fn open_today_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let audit = AuditLog::new().with_dir(tmp.path().join("api").join("logs"));

        let file = audit.open_today().unwrap();
        drop(file);

        assert!(audit.path_for_today().is_file());
    }

    #[test]
    fn open_today_fails_when_dir_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let occupied = tmp.path().join("logs");
        std::fs::write(&occupied, "not a directory").unwrap();

        let audit = AuditLog::new().with_dir(&occupied);
        assert!(audit.open_today().is_err());
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();
        let audit = AuditLog::new().with_dir(tmp.path());

        audit.open_today().unwrap().write_all(b"first\n").unwrap();
        audit.open_today().unwrap().write_all(b"second\n").unwrap();

        let content = std::fs::read_to_string(audit.path_for_today()).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
