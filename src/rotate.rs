//! Log directory housekeeping: gzip stale logs, drop expired archives, and
//! keep the directory under a size cap.
//!
//! Files modified within the grace window are never touched, so a job that
//! is still appending to its log is safe. Running the pass twice in a row
//! does nothing the second time.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{info, warn};

use crate::config::RotationPolicy;
use crate::util::human_size;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub compressed: usize,
    pub deleted: usize,
    pub freed_bytes: u64,
    /// Directory size once the pass is over.
    pub total_bytes: u64,
}

#[derive(Debug, Clone)]
struct LogFile {
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

impl LogFile {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn is_compressed(&self) -> bool {
        self.path.extension().is_some_and(|e| e == "gz")
    }

    /// Zero for files stamped in the future.
    fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.modified).unwrap_or_default()
    }

    fn is_active(&self, now: SystemTime, grace: Duration) -> bool {
        self.age(now) < grace
    }
}

/// Regular, non-hidden files directly inside `dir`. Entries that vanish
/// while listing are skipped.
fn list_files(dir: &Path) -> Result<Vec<LogFile>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    Ok(entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                return None;
            }
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            Some(LogFile {
                path: entry.path(),
                size: meta.len(),
                modified: meta.modified().ok()?,
            })
        })
        .collect())
}

fn total_size(files: &[LogFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn gzip(source: &Path, target: &Path) -> Result<()> {
    let mut input = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(target)?), Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

fn compress(file: &LogFile) -> Result<PathBuf> {
    let target = gz_path(&file.path);
    if let Err(e) = gzip(&file.path, &target) {
        let _ = fs::remove_file(&target);
        return Err(e);
    }
    fs::remove_file(&file.path)?;
    Ok(target)
}

/// Returns the number of bytes freed, or `None` if deletion failed.
fn delete(file: &LogFile, reason: &str) -> Option<u64> {
    match fs::remove_file(&file.path) {
        Ok(()) => {
            info!(
                "DELETE    {} ({}) reason={reason}",
                file.name(),
                human_size(file.size)
            );
            Some(file.size)
        }
        Err(e) => {
            warn!("Failed to delete {}: {e}", file.name());
            None
        }
    }
}

pub fn rotate(policy: &RotationPolicy, now: SystemTime) -> Result<RotationReport> {
    let dir = &policy.log_dir;
    if !dir.exists() {
        info!("Creating {}", dir.display());
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let grace = policy.active_grace;
    let mut report = RotationReport::default();

    let stale = list_files(dir)?
        .into_iter()
        .filter(|f| !f.is_compressed() && !f.is_active(now, grace))
        .filter(|f| f.age(now) > policy.compress_after);
    for file in stale {
        match compress(&file) {
            Ok(target) => {
                report.compressed += 1;
                info!(
                    "COMPRESS  {} -> {} ({})",
                    file.name(),
                    target.file_name().unwrap_or_default().to_string_lossy(),
                    human_size(file.size)
                );
            }
            Err(e) => warn!("Failed to compress {}: {e:#}", file.name()),
        }
    }

    let expired = list_files(dir)?
        .into_iter()
        .filter(|f| f.is_compressed() && !f.is_active(now, grace))
        .filter(|f| f.age(now) > policy.delete_after);
    let reason = format!("older_than_{}d", policy.delete_after.as_secs() / 86_400);
    for file in expired {
        if let Some(freed) = delete(&file, &reason) {
            report.deleted += 1;
            report.freed_bytes += freed;
        }
    }

    let mut files = list_files(dir)?;
    let mut total = total_size(&files);
    if total > policy.max_total_bytes {
        info!(
            "Directory size {} exceeds {}, deleting oldest files",
            human_size(total),
            human_size(policy.max_total_bytes)
        );
        files.sort_by_key(|f| (!f.is_compressed(), f.modified));
        for file in files.iter().filter(|f| !f.is_active(now, grace)) {
            if total <= policy.max_total_bytes {
                break;
            }
            if let Some(freed) = delete(file, "disk_cap") {
                report.deleted += 1;
                report.freed_bytes += freed;
                total = total.saturating_sub(freed);
            }
        }
    }

    report.total_bytes = total_size(&list_files(dir)?);
    info!("DONE      total size now {}", human_size(report.total_bytes));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    const MINUTE: Duration = Duration::from_secs(60);

    fn touch(dir: &Path, name: &str, bytes: usize, age: Duration, now: SystemTime) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![b'x'; bytes]).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(now - age)
            .unwrap();
        path
    }

    fn policy(dir: &Path) -> RotationPolicy {
        RotationPolicy {
            log_dir: dir.to_path_buf(),
            ..RotationPolicy::default()
        }
    }

    #[test]
    fn stale_plain_file_is_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let path = touch(dir.path(), "batter.log", 100, RotationPolicy::days(3), now);

        let report = rotate(&policy(dir.path()), now).unwrap();
        assert_eq!(report.compressed, 1);
        assert!(!path.exists());

        let mut text = String::new();
        GzDecoder::new(File::open(dir.path().join("batter.log.gz")).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "x".repeat(100));
    }

    #[test]
    fn expired_archive_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let old = touch(dir.path(), "old.log.gz", 10, RotationPolicy::days(50), now);
        let kept = touch(dir.path(), "recent.log.gz", 10, RotationPolicy::days(40), now);

        let report = rotate(&policy(dir.path()), now).unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.freed_bytes, 10);
        assert!(!old.exists());
        assert!(kept.exists());
    }

    #[test]
    fn active_files_are_never_touched() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let plain = touch(dir.path(), "running.log", 100, 2 * MINUTE, now);
        let archive = touch(dir.path(), "fresh.log.gz", 100, 2 * MINUTE, now);
        let p = RotationPolicy {
            compress_after: Duration::ZERO,
            delete_after: Duration::ZERO,
            max_total_bytes: 0,
            ..policy(dir.path())
        };

        let report = rotate(&p, now).unwrap();
        assert_eq!(report.compressed, 0);
        assert_eq!(report.deleted, 0);
        assert!(plain.exists());
        assert!(archive.exists());
    }

    #[test]
    fn size_cap_deletes_archives_before_older_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let plain = touch(dir.path(), "schedule.log", 1000, RotationPolicy::days(10), now);
        let archive = touch(dir.path(), "splits.log.gz", 1000, RotationPolicy::days(5), now);
        let p = RotationPolicy {
            compress_after: RotationPolicy::days(365),
            max_total_bytes: 1500,
            ..policy(dir.path())
        };

        let report = rotate(&p, now).unwrap();
        assert_eq!(report.deleted, 1);
        assert!(!archive.exists());
        assert!(plain.exists());
        assert_eq!(report.total_bytes, 1000);
    }

    #[test]
    fn size_cap_falls_through_to_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let older = touch(dir.path(), "a.log", 1000, RotationPolicy::days(1), now);
        let newer = touch(dir.path(), "b.log", 1000, 30 * MINUTE, now);
        let running = touch(dir.path(), "c.log", 1000, MINUTE, now);
        let p = RotationPolicy {
            max_total_bytes: 500,
            ..policy(dir.path())
        };

        let report = rotate(&p, now).unwrap();
        assert_eq!(report.deleted, 2);
        assert!(!older.exists());
        assert!(!newer.exists());
        assert!(running.exists());
        assert_eq!(report.total_bytes, 1000);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        touch(dir.path(), "a.log", 100, RotationPolicy::days(3), now);
        touch(dir.path(), "b.log.gz", 100, RotationPolicy::days(60), now);

        let first = rotate(&policy(dir.path()), now).unwrap();
        assert_eq!((first.compressed, first.deleted), (1, 1));
        let second = rotate(&policy(dir.path()), now).unwrap();
        assert_eq!((second.compressed, second.deleted), (0, 0));
    }

    #[test]
    fn hidden_files_and_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let hidden = touch(dir.path(), ".keep", 10, RotationPolicy::days(90), now);
        rotate(&policy(dir.path()), now).unwrap();
        assert!(hidden.exists());

        let missing = dir.path().join("not/yet");
        rotate(&policy(&missing), now).unwrap();
        assert!(missing.is_dir());
    }
}
