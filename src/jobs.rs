pub mod player_stats;
pub mod schedule;
pub mod splits;
pub mod team_stats;

use anyhow::Result;
use clap::ValueEnum;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::jobs::player_stats::PlayerRole;
use crate::jobs::splits::SplitKind;
use crate::jobs::team_stats::TeamStat;
use crate::logging::LogFileStyle;
use crate::scrape::fetch::Fetcher;

#[derive(
    Debug, Eq, PartialEq, Copy, Clone, Hash, Display, EnumIter, EnumString, ValueEnum,
)]
#[strum(serialize_all = "snake_case")]
pub enum JobKind {
    PlayerBatting,
    PlayerPitching,
    TeamBatting,
    TeamPitching,
    TeamFielding,
    TeamGames,
    Schedule,
    HittersVsTeam,
    HittersVsStadium,
    PitchersVsTeam,
    PitchersVsStadium,
}

impl JobKind {
    /// Long-running jobs share one log file across runs.
    pub const fn log_style(self) -> LogFileStyle {
        match self {
            Self::Schedule
            | Self::HittersVsTeam
            | Self::HittersVsStadium
            | Self::PitchersVsTeam
            | Self::PitchersVsStadium => LogFileStyle::PerJob,
            _ => LogFileStyle::PerRun,
        }
    }

    pub fn run(self, config: &Config, fetcher: &mut Fetcher) -> RunSummary {
        info!("=== {self} started ===");
        let mut summary = RunSummary::default();
        match self {
            Self::PlayerBatting => {
                player_stats::run(PlayerRole::Batter, config, fetcher, &mut summary);
            }
            Self::PlayerPitching => {
                player_stats::run(PlayerRole::Pitcher, config, fetcher, &mut summary);
            }
            Self::TeamBatting => team_stats::run(TeamStat::Batting, config, fetcher, &mut summary),
            Self::TeamPitching => {
                team_stats::run(TeamStat::Pitching, config, fetcher, &mut summary);
            }
            Self::TeamFielding => team_stats::run_fielding(config, fetcher, &mut summary),
            Self::TeamGames => team_stats::run_games(config, fetcher, &mut summary),
            Self::Schedule => schedule::run(config, fetcher, &mut summary),
            Self::HittersVsTeam => {
                splits::run(SplitKind::HittersVsTeam, config, fetcher, &mut summary);
            }
            Self::HittersVsStadium => {
                splits::run(SplitKind::HittersVsStadium, config, fetcher, &mut summary);
            }
            Self::PitchersVsTeam => {
                splits::run(SplitKind::PitchersVsTeam, config, fetcher, &mut summary);
            }
            Self::PitchersVsStadium => {
                splits::run(SplitKind::PitchersVsStadium, config, fetcher, &mut summary);
            }
        }
        summary.log(self);
        summary
    }
}

/// Outcome of every item a job attempted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<String>,
    /// (item, error with its cause chain)
    pub failed: Vec<(String, String)>,
    pub files_written: usize,
}

impl RunSummary {
    /// Records one item. `Ok` carries the number of files the item wrote.
    pub fn record(&mut self, item: impl Into<String>, result: Result<usize>) {
        let item = item.into();
        match result {
            Ok(files) => {
                self.files_written += files;
                self.succeeded.push(item);
            }
            Err(e) => {
                let message = format!("{e:#}");
                error!("{item}: {message}");
                self.failed.push((item, message));
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn log(&self, job: JobKind) {
        info!(
            "=== {job} finished: {} ok, {} failed, {} files written ===",
            self.succeeded.len(),
            self.failed.len(),
            self.files_written
        );
        for (item, message) in &self.failed {
            warn!("  failed {item}: {message}");
        }
    }
}
