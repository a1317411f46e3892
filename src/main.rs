#![allow(dead_code)]
#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions, clippy::significant_drop_tightening)]

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::config::{Config, FetchConfig, RotationPolicy};
use crate::jobs::JobKind;
use crate::logging::{log_path, stdout_subscriber, tee_subscriber};
use crate::rotate::rotate;
use crate::scrape::fetch::Fetcher;
use crate::util::human_size;

mod config;
mod jobs;
mod logging;
mod rotate;
mod scrape;
mod table;
mod util;

const ABOUT: &str = "Scrapes NPB team and player statistics into CSV files.";

#[derive(Parser, Debug)]
#[command(name = "npb-stats", about = ABOUT)]
struct Opt {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run scrape jobs, each with its own log file
    Run {
        #[arg(value_enum, required_unless_present = "all")]
        jobs: Vec<JobKind>,

        /// Run every job in catalogue order
        #[arg(long, conflicts_with = "jobs")]
        all: bool,

        #[command(flatten)]
        settings: RunSettings,
    },
    /// Compress, expire and cap the log directory
    RotateLogs(RotateSettings),
}

#[derive(Args, Debug)]
struct RunSettings {
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Defaults to the current year
    #[arg(long)]
    season: Option<i32>,

    #[arg(long, default_value_t = 1000)]
    request_interval_ms: u64,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, default_value = "Mozilla/5.0")]
    user_agent: String,
}

impl From<RunSettings> for Config {
    fn from(s: RunSettings) -> Self {
        Self {
            data_dir: s.data_dir,
            log_dir: s.log_dir,
            season: s.season.unwrap_or_else(|| Self::default().season),
            fetch: FetchConfig {
                request_interval: Duration::from_millis(s.request_interval_ms),
                timeout: Duration::from_secs(s.timeout_secs),
                user_agent: s.user_agent,
            },
        }
    }
}

#[derive(Args, Debug)]
struct RotateSettings {
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[arg(long, default_value_t = 2)]
    compress_after_days: u64,

    #[arg(long, default_value_t = 45)]
    delete_after_days: u64,

    /// Files modified this recently are left alone
    #[arg(long, default_value_t = 10)]
    grace_minutes: u64,

    #[arg(long, default_value_t = 500)]
    max_total_mb: u64,
}

impl From<RotateSettings> for RotationPolicy {
    fn from(s: RotateSettings) -> Self {
        Self {
            log_dir: s.log_dir,
            compress_after: Self::days(s.compress_after_days),
            delete_after: Self::days(s.delete_after_days),
            active_grace: Duration::from_secs(s.grace_minutes * 60),
            max_total_bytes: s.max_total_mb * 1024 * 1024,
        }
    }
}

/// Runs the jobs in order, one shared fetcher, each job logging under its
/// own subscriber. Item failures end up in the job's summary; only setup
/// problems are returned.
fn run_jobs(jobs: &[JobKind], config: &Config) -> Result<()> {
    let mut fetcher = Fetcher::new(&config.fetch)?;
    for &job in jobs {
        let path = log_path(&config.log_dir, &job.to_string(), job.log_style(), Local::now());
        let subscriber = tee_subscriber(&path)?;
        tracing::subscriber::with_default(subscriber, || {
            let start = Instant::now();
            info!("Logging to {}", path.display());
            let summary = job.run(config, &mut fetcher);
            if !summary.is_clean() {
                warn!("{job} finished with {} failed items", summary.failed.len());
            }
            info!("Elapsed: {:?}", start.elapsed());
        });
    }
    Ok(())
}

#[allow(clippy::expect_used)]
fn main() {
    let opt: Opt = Opt::parse();

    match opt.command {
        Command::Run {
            jobs,
            all,
            settings,
        } => {
            let jobs = if all {
                JobKind::iter().collect_vec()
            } else {
                jobs.into_iter().unique().collect_vec()
            };
            run_jobs(&jobs, &Config::from(settings))
                .expect("Error occurred while setting up jobs");
        }
        Command::RotateLogs(settings) => {
            tracing::subscriber::set_global_default(stdout_subscriber())
                .expect("Failed to initialize trace");
            let start = Instant::now();
            let report = rotate(&RotationPolicy::from(settings), SystemTime::now())
                .expect("Error occurred while rotating logs");
            info!(
                "{} compressed, {} deleted, {} freed",
                report.compressed,
                report.deleted,
                human_size(report.freed_bytes)
            );
            info!("Elapsed: {:?}", start.elapsed());
        }
    }
}
