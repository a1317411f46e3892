//! nf3 opponent and stadium splits: one CSV per team and split group.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use strum_macros::Display;
use tracing::{info, warn};

use crate::config::Config;
use crate::jobs::RunSummary;
use crate::scrape::fallback::first_success;
use crate::scrape::fetch::{Fetcher, PageEncoding};
use crate::scrape::registry::{Team, TEAMS};
use crate::scrape::slug::{SlugTable, OPPONENT_SLUGS, STADIUM_SLUGS};
use crate::table::header::CAREER_TOTAL;
use crate::table::html::{first_table, HeaderDepth};
use crate::table::output::write_table;
use crate::table::split::split_by_group;
use crate::table::RawTable;

/// File stem of the career-total group.
const TOTAL_STEM: &str = "Total";

#[derive(Debug, Eq, PartialEq, Copy, Clone, Display)]
pub enum SplitKind {
    HittersVsTeam,
    HittersVsStadium,
    PitchersVsTeam,
    PitchersVsStadium,
}

impl SplitKind {
    const fn page(self) -> &'static str {
        match self {
            Self::HittersVsTeam => "fp_all_data_vsT",
            Self::HittersVsStadium => "fp_all_data_vsS",
            Self::PitchersVsTeam => "pc_all_data_vsT",
            Self::PitchersVsStadium => "pc_all_data_vsS",
        }
    }

    const fn role_dir(self) -> &'static str {
        match self {
            Self::HittersVsTeam | Self::HittersVsStadium => "hitters",
            Self::PitchersVsTeam | Self::PitchersVsStadium => "pitchers",
        }
    }

    const fn split_dir(self) -> &'static str {
        match self {
            Self::HittersVsTeam | Self::PitchersVsTeam => "vs_team",
            Self::HittersVsStadium | Self::PitchersVsStadium => "vs_stadium",
        }
    }

    fn slugs(self) -> &'static SlugTable {
        match self {
            Self::HittersVsTeam | Self::PitchersVsTeam => &*OPPONENT_SLUGS,
            Self::HittersVsStadium | Self::PitchersVsStadium => &*STADIUM_SLUGS,
        }
    }

    pub fn url(self, team: &Team, code: &str) -> String {
        format!(
            "https://nf3.sakura.ne.jp/{}/{code}/t/{}.htm",
            team.league,
            self.page()
        )
    }

    pub fn team_dir(self, data_dir: &Path, team: &Team) -> PathBuf {
        data_dir
            .join("team_splits")
            .join(self.role_dir())
            .join(self.split_dir())
            .join(team.league.to_string())
            .join(team.name)
    }

    pub fn file_stem(self, group: &str) -> String {
        if group == CAREER_TOTAL {
            TOTAL_STEM.to_string()
        } else {
            self.slugs().slug(group)
        }
    }
}

/// First nf3 code whose page holds a table with three header rows.
fn fetch_team(kind: SplitKind, team: &Team, fetcher: &mut Fetcher) -> Result<RawTable> {
    let (code, raw) = first_success(team.name, team.nf3_codes.iter().copied(), |code| {
        let url = kind.url(team, code);
        info!("[{}] Fetching {url}", team.name);
        let html = fetcher.get(&url, PageEncoding::ShiftJis)?;
        first_table(&html, HeaderDepth::Fixed(3)).with_context(|| format!("Bad table at {url}"))
    })?;
    info!(
        "[{}] tm={code}: {} rows, {} columns",
        team.name,
        raw.rows.len(),
        raw.width()
    );
    Ok(raw)
}

/// Writes one file per split group into `dir`. Each group is its own item
/// in `summary`; returns the number of files written.
pub fn write_groups(
    kind: SplitKind,
    team: &Team,
    raw: &RawTable,
    dir: &Path,
    summary: &mut RunSummary,
) -> Result<usize> {
    let groups = split_by_group(raw);
    if groups.is_empty() {
        bail!("No split groups in table");
    }

    let mut stems = HashSet::new();
    let mut written = 0;
    for group in groups {
        let stem = kind.file_stem(&group.group);
        if !stems.insert(stem.clone()) {
            warn!(
                "[{}] Group {:?} maps to {stem}.csv again, overwriting",
                team.name, group.group
            );
        }
        let path = dir.join(format!("{stem}.csv"));
        let item = format!("{}/{}", team.name, group.group);
        match write_table(&path, &group.table) {
            Ok(rows) => {
                info!("  - saved {} ({rows} rows)", path.display());
                written += 1;
                summary.record(item, Ok(1));
            }
            Err(e) => summary.record(item, Err(e)),
        }
    }
    Ok(written)
}

fn scrape_team(
    kind: SplitKind,
    team: &Team,
    config: &Config,
    fetcher: &mut Fetcher,
    summary: &mut RunSummary,
) -> Result<usize> {
    let raw = fetch_team(kind, team, fetcher)?;
    let dir = kind.team_dir(&config.data_dir, team);
    let written = write_groups(kind, team, &raw, &dir, summary)?;
    info!("[{}] {written} files in {}", team.name, dir.display());
    Ok(0)
}

pub fn run(kind: SplitKind, config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    for team in &TEAMS {
        let result = scrape_team(kind, team, config, fetcher, summary);
        summary.record(team.name, result);
    }
}
