//! Per-team player batting and pitching tables from baseball-data.com.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::jobs::RunSummary;
use crate::scrape::fetch::{Fetcher, PageEncoding};
use crate::scrape::registry::{Team, TEAMS};
use crate::table::header::flatten_lower_preferred;
use crate::table::html::{first_table, HeaderDepth};
use crate::table::output::write_table;
use crate::table::StatTable;

const BATTER_COLUMNS: [&str; 20] = [
    "背番号", "選手名", "打率", "試合", "打席数",
    "打数", "安打", "本塁打", "打点", "盗塁",
    "四球", "死球", "三振", "犠打", "併殺打",
    "出塁率", "長打率", "OPS", "RC27", "XR27",
];

const PITCHER_COLUMNS: [&str; 20] = [
    "背番号", "選手名", "防御率", "試合", "勝利",
    "敗北", "セーブ", "ホールド", "勝率", "打者",
    "投球回", "被安打", "被本塁打", "与四球", "与死球",
    "奪三振", "失点", "自責点", "WHIP", "DIPS",
];

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum PlayerRole {
    Batter,
    Pitcher,
}

impl PlayerRole {
    const fn page(self) -> &'static str {
        match self {
            Self::Batter => "hitter",
            Self::Pitcher => "pitcher",
        }
    }

    /// Output directory under the data root.
    const fn dir(self) -> &'static str {
        match self {
            Self::Batter => "batter",
            Self::Pitcher => "pitcher",
        }
    }

    const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Batter => &BATTER_COLUMNS,
            Self::Pitcher => &PITCHER_COLUMNS,
        }
    }

    pub fn url(self, team: &Team) -> String {
        format!(
            "https://baseball-data.com/stats/{}-{}/",
            self.page(),
            team.data_code
        )
    }
}

/// The site repeats its first data row on some pages; the copy is dropped
/// before the fixed column names are applied.
pub fn parse_player_table(html: &str, role: PlayerRole) -> Result<StatTable> {
    let mut table = first_table(html, HeaderDepth::Auto)?.flatten(flatten_lower_preferred);
    if table.rows.len() > 1 && table.rows[0] == table.rows[1] {
        table.rows.remove(1);
    }
    table.rename(role.columns())?;
    Ok(table)
}

fn scrape_team(
    role: PlayerRole,
    team: &Team,
    config: &Config,
    fetcher: &mut Fetcher,
) -> Result<usize> {
    let url = role.url(team);
    info!("[{}] Fetching {url}", team.key);
    let html = fetcher.get(&url, PageEncoding::Utf8)?;
    let table = parse_player_table(&html, role).with_context(|| format!("Bad table at {url}"))?;

    let path = config
        .data_dir
        .join(role.dir())
        .join(format!("{}.csv", team.key));
    let rows = write_table(&path, &table)?;
    info!("[{}] Saved {rows} rows to {}", team.key, path.display());
    Ok(1)
}

pub fn run(role: PlayerRole, config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    for team in &TEAMS {
        summary.record(team.key, scrape_team(role, team, config, fetcher));
    }
}
