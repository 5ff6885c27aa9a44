//! The activity log.
//!
//! Every status change is recorded as one human-readable line:
//!
//! ```text
//! [2024-05-01 10:00:00] MED-4 → out
//! ```
//!
//! Timestamps are rendered in a configured time zone. Entries older than the
//! retention window are dropped whenever the log is written. The log is kept
//! both in memory (newest first, for the dashboard) and in a plain-text file
//! (oldest first, so the file survives restarts).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fleet::TruckStatus;

/// Timestamp format used in log lines.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\] (.+) → ([a-z]+)$")
            .expect("Invalid activity line pattern")
    })
}

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// When the change happened, in the log's time zone.
    pub timestamp: DateTime<Tz>,
    /// The truck that changed.
    pub truck_id: String,
    /// The status it changed to.
    pub status: TruckStatus,
}

impl ActivityEntry {
    /// Create an entry for a change at `at`, rendered in `tz`.
    #[must_use]
    pub fn new(
        truck_id: impl Into<String>,
        status: TruckStatus,
        at: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        Self {
            timestamp: at.with_timezone(&tz),
            truck_id: truck_id.into(),
            status,
        }
    }

    /// Parse a log line, interpreting its timestamp in `tz`.
    ///
    /// Returns `None` for lines that do not match the log format. A local
    /// time repeated by a daylight-saving fall-back resolves to the earlier
    /// instant; one skipped by spring-forward is rejected.
    #[must_use]
    pub fn parse(line: &str, tz: Tz) -> Option<Self> {
        let caps = line_pattern().captures(line.trim_end())?;
        let naive = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?;
        let timestamp = tz.from_local_datetime(&naive).earliest()?;
        let status = caps[3].parse().ok()?;
        Some(Self {
            timestamp,
            truck_id: caps[2].to_string(),
            status,
        })
    }

    /// Whether this entry falls inside the retention window ending at `now`.
    #[must_use]
    pub fn is_retained(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now.signed_duration_since(self.timestamp) <= retention
    }
}

impl std::fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} → {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.truck_id,
            self.status
        )
    }
}

/// In-memory and on-disk activity log with time-based retention.
#[derive(Debug)]
pub struct ActivityLog {
    path: PathBuf,
    retention: Duration,
    tz: Tz,
    /// Newest first.
    recent: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Open the log at `path`, loading retained entries from the file.
    ///
    /// A missing file is treated as an empty log.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(
        path: impl Into<PathBuf>,
        retention: Duration,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut log = Self {
            path: path.into(),
            retention,
            tz,
            recent: Vec::new(),
        };
        let (mut retained, _) = log.read_retained(now)?;
        retained.reverse();
        debug!(
            "Loaded {} activity entries from {}",
            retained.len(),
            log.path.display()
        );
        log.recent = retained;
        Ok(log)
    }

    /// Get the path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.recent
    }

    /// Record a status change.
    ///
    /// The entry is added to the in-memory list before the file is touched,
    /// so it shows up on the dashboard even if the write fails. Expired
    /// entries are dropped from both.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be read or written.
    pub fn record(
        &mut self,
        truck_id: &str,
        status: TruckStatus,
        now: DateTime<Utc>,
    ) -> Result<ActivityEntry> {
        let entry = ActivityEntry::new(truck_id, status, now, self.tz);
        self.recent.insert(0, entry.clone());
        let retention = self.retention;
        self.recent.retain(|e| e.is_retained(now, retention));

        self.persist(&entry, now)?;
        Ok(entry)
    }

    /// Write `entry` to the file, compacting it if anything has expired.
    fn persist(&self, entry: &ActivityEntry, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let (retained, dropped) = self.read_retained(now)?;
        if dropped == 0 {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|e| Error::activity_log(&self.path, e))?;
            writeln!(file, "{entry}").map_err(|e| Error::activity_log(&self.path, e))?;
            return Ok(());
        }

        let mut contents = String::new();
        for kept in retained.iter().chain(std::iter::once(entry)) {
            contents.push_str(&kept.to_string());
            contents.push('\n');
        }
        std::fs::write(&self.path, contents).map_err(|e| Error::activity_log(&self.path, e))?;
        info!(
            "Compacted activity log {}, dropped {} lines",
            self.path.display(),
            dropped
        );
        Ok(())
    }

    /// Read the file, returning retained entries oldest first and the number
    /// of lines that were expired or unparseable.
    fn read_retained(&self, now: DateTime<Utc>) -> Result<(Vec<ActivityEntry>, usize)> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), 0)),
            Err(e) => return Err(Error::activity_log(&self.path, e)),
        };

        let mut retained = Vec::new();
        let mut dropped = 0;
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            match ActivityEntry::parse(line, self.tz) {
                Some(entry) if entry.is_retained(now, self.retention) => retained.push(entry),
                Some(_) => dropped += 1,
                None => {
                    debug!("Dropping unparseable activity line: {line}");
                    dropped += 1;
                }
            }
        }
        Ok((retained, dropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eastern() -> Tz {
        chrono_tz::America::New_York
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 15, 0, 0).unwrap()
    }

    fn open_log(dir: &tempfile::TempDir, now: DateTime<Utc>) -> ActivityLog {
        ActivityLog::open(
            dir.path().join("logs").join("activity.log"),
            Duration::hours(72),
            eastern(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_entry_display() {
        let entry = ActivityEntry::new("MED-4", TruckStatus::Out, t0(), eastern());
        assert_eq!(entry.to_string(), "[2024-05-04 11:00:00] MED-4 → out");
    }

    #[test]
    fn test_entry_parse() {
        let entry = ActivityEntry::parse("[2024-05-04 11:00:00] ALPHA 5 → logistics\n", eastern())
            .unwrap();
        assert_eq!(entry.truck_id, "ALPHA 5");
        assert_eq!(entry.status, TruckStatus::Logistics);
        assert_eq!(entry.timestamp.with_timezone(&Utc), t0());
    }

    #[test]
    fn test_entry_follows_daylight_saving() {
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap();
        let entry = ActivityEntry::new("MED-4", TruckStatus::Out, winter, eastern());
        assert_eq!(entry.to_string(), "[2024-01-15 10:00:00] MED-4 → out");

        let parsed = ActivityEntry::parse("[2024-01-15 10:00:00] MED-4 → out", eastern()).unwrap();
        assert_eq!(parsed.timestamp.with_timezone(&Utc), winter);
    }

    #[test]
    fn test_entry_parse_ambiguous_local_time() {
        // 01:30 happens twice on 2024-11-03 in New York
        let entry = ActivityEntry::parse("[2024-11-03 01:30:00] MED-4 → out", eastern()).unwrap();
        assert_eq!(
            entry.timestamp.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap()
        );

        // 02:30 never happens on 2024-03-10
        assert!(ActivityEntry::parse("[2024-03-10 02:30:00] MED-4 → out", eastern()).is_none());
    }

    #[test]
    fn test_entry_parse_rejects_garbage() {
        assert!(ActivityEntry::parse("Setting MED-4 to out", eastern()).is_none());
        assert!(ActivityEntry::parse("[2024-13-40 10:00:00] MED-4 → out", eastern()).is_none());
        assert!(ActivityEntry::parse("[2024-05-04 10:00:00] MED-4 → parked", eastern()).is_none());
        assert!(ActivityEntry::parse("[2024-05-04 10:00:00] MED-4 -> out", eastern()).is_none());
    }

    #[test]
    fn test_is_retained_boundary() {
        let entry = ActivityEntry::new("MED-4", TruckStatus::Out, t0(), eastern());
        let retention = Duration::hours(72);

        assert!(entry.is_retained(t0() + Duration::hours(71), retention));
        assert!(entry.is_retained(t0() + Duration::hours(72), retention));
        assert!(!entry.is_retained(t0() + Duration::hours(73), retention));
    }

    #[test]
    fn test_record_prepends_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir, t0());

        log.record("MED-0", TruckStatus::Out, t0()).unwrap();
        log.record("MED-2", TruckStatus::Logistics, t0() + Duration::minutes(1))
            .unwrap();

        let ids: Vec<_> = log.entries().iter().map(|e| e.truck_id.as_str()).collect();
        assert_eq!(ids, vec!["MED-2", "MED-0"]);
    }

    #[test]
    fn test_record_appends_to_file_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir, t0());

        log.record("MED-0", TruckStatus::Out, t0()).unwrap();
        log.record("MED-0", TruckStatus::Available, t0() + Duration::minutes(5))
            .unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            raw,
            "[2024-05-04 11:00:00] MED-0 → out\n[2024-05-04 11:05:00] MED-0 → available\n"
        );
    }

    #[test]
    fn test_record_drops_expired_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = open_log(&dir, t0());

        log.record("OLD", TruckStatus::Out, t0()).unwrap();
        log.record("KEPT", TruckStatus::Out, t0() + Duration::hours(2))
            .unwrap();

        // 73h after OLD, 71h after KEPT
        log.record("NEW", TruckStatus::Out, t0() + Duration::hours(73))
            .unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert!(!raw.contains("OLD"));
        assert!(raw.contains("KEPT"));
        assert!(raw.contains("NEW"));

        let ids: Vec<_> = log.entries().iter().map(|e| e.truck_id.as_str()).collect();
        assert_eq!(ids, vec!["NEW", "KEPT"]);
    }

    #[test]
    fn test_record_drops_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.log");
        std::fs::write(&path, "not a log line\n[2024-05-04 10:00:00] MED-3 → out\n").unwrap();

        let mut log =
            ActivityLog::open(&path, Duration::hours(72), eastern(), t0()).unwrap();
        assert_eq!(log.entries().len(), 1);

        log.record("MED-3", TruckStatus::Available, t0()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            "[2024-05-04 10:00:00] MED-3 → out\n[2024-05-04 11:00:00] MED-3 → available\n"
        );
    }

    #[test]
    fn test_open_loads_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut log = open_log(&dir, t0());
            log.record("MED-0", TruckStatus::Out, t0()).unwrap();
            log.record("MED-2", TruckStatus::Out, t0() + Duration::minutes(1))
                .unwrap();
        }

        let reopened = open_log(&dir, t0() + Duration::hours(1));
        let ids: Vec<_> = reopened
            .entries()
            .iter()
            .map(|e| e.truck_id.as_str())
            .collect();
        assert_eq!(ids, vec!["MED-2", "MED-0"]);
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = open_log(&dir, t0());
        assert!(log.entries().is_empty());
        assert!(!log.path().exists());
    }
}
