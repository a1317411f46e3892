use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const LINE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
const FILE_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Where a job's log lines go.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum LogFileStyle {
    /// A fresh `<job>_<timestamp>.log` every run.
    PerRun,
    /// One `<job>.log` appended to by every run.
    PerJob,
}

pub fn log_path(dir: &Path, job: &str, style: LogFileStyle, now: DateTime<Local>) -> PathBuf {
    match style {
        LogFileStyle::PerRun => dir.join(format!("{job}_{}.log", now.format(FILE_TIMESTAMP))),
        LogFileStyle::PerJob => dir.join(format!("{job}.log")),
    }
}

pub fn stdout_subscriber() -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_timer(ChronoLocal::new(LINE_TIMESTAMP.to_string()))
        .with_target(false)
        .with_ansi(false)
        .finish()
}

/// Writes every line to stdout and appends it to `path`.
pub fn tee_subscriber(path: &Path) -> Result<impl Subscriber + Send + Sync> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_timer(ChronoLocal::new(LINE_TIMESTAMP.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(Arc::new(file)))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_file_names() {
        let now = Local.with_ymd_and_hms(2025, 8, 12, 6, 30, 5).unwrap();
        let dir = Path::new("/var/log/npb");
        assert_eq!(
            log_path(dir, "player_batting", LogFileStyle::PerRun, now),
            dir.join("player_batting_20250812_063005.log")
        );
        assert_eq!(
            log_path(dir, "schedule", LogFileStyle::PerJob, now),
            dir.join("schedule.log")
        );
    }

    #[test]
    fn tee_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/job.log");
        let subscriber = tee_subscriber(&path).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("first line");
            tracing::warn!("second line");
        });
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first line"));
        assert!(lines[1].contains("WARN"));
    }
}
