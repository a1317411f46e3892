use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, Local};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings shared by every scrape job.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root under which every job writes its CSV files.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Season used in the npb.jp URLs and in season-stamped file names.
    pub season: i32,
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            season: Local::now().year(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Minimum gap between two consecutive requests.
    pub request_interval: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Age and size limits for the log directory.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub log_dir: PathBuf,
    /// Plain files older than this get gzipped.
    pub compress_after: Duration,
    /// `.gz` files older than this get deleted.
    pub delete_after: Duration,
    /// Files modified more recently than this are never touched.
    pub active_grace: Duration,
    pub max_total_bytes: u64,
}

impl RotationPolicy {
    pub const fn days(n: u64) -> Duration {
        Duration::from_secs(n * DAY.as_secs())
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            compress_after: Self::days(2),
            delete_after: Self::days(45),
            active_grace: Duration::from_secs(10 * 60),
            max_total_bytes: 500 * 1024 * 1024,
        }
    }
}
