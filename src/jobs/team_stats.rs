//! League-wide team tables: batting, pitching, fielding and games played.

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::config::Config;
use crate::jobs::RunSummary;
use crate::scrape::fetch::{Fetcher, PageEncoding};
use crate::scrape::registry::{League, Team};
use crate::table::header::flatten_joined;
use crate::table::html::{first_table, parse_tables, HeaderDepth};
use crate::table::output::{write_records, write_table};
use crate::table::{Cell, StatTable};
use crate::util::strip_whitespace;

const STANDINGS_URL: &str = "https://baseball-data.com/team/standings.html";
const LEAGUE_COLUMN: &str = "リーグ";
const TEAM_COLUMN: &str = "チーム";
const GAMES_COLUMN: &str = "試合";

/// Central first, then Pacific: the order the league tables appear in.
const PAGE_LEAGUES: [League; 2] = [League::Central, League::Pacific];

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum TeamStat {
    Batting,
    Pitching,
}

impl TeamStat {
    const fn url(self) -> &'static str {
        match self {
            Self::Batting => "https://baseball-data.com/team/hitter.html",
            Self::Pitching => "https://baseball-data.com/team/pitcher.html",
        }
    }

    fn file_name(self, season: i32) -> String {
        match self {
            Self::Batting => format!("team_batting/team_batting_stats_{season}.csv"),
            Self::Pitching => format!("team_pitcher/team_pitcher_stats_{season}.csv"),
        }
    }
}

/// Every table flattened and labelled with its league.
fn league_tables(html: &str) -> Result<Vec<(League, StatTable)>> {
    let grids = parse_tables(html)?;
    if grids.len() < PAGE_LEAGUES.len() {
        bail!("Expected one table per league, found {}", grids.len());
    }
    grids
        .into_iter()
        .zip(PAGE_LEAGUES)
        .map(|(grid, league)| -> Result<_> {
            Ok((league, grid.into_raw(HeaderDepth::Auto)?.flatten(flatten_joined)))
        })
        .collect()
}

pub fn parse_team_stats(html: &str) -> Result<StatTable> {
    let tables = league_tables(html)?
        .into_iter()
        .map(|(league, mut table)| {
            table.push_constant(LEAGUE_COLUMN, Cell::from(league.japanese()));
            table
        })
        .collect();
    Ok(StatTable::concat(tables))
}

fn scrape_team_stats(stat: TeamStat, config: &Config, fetcher: &mut Fetcher) -> Result<usize> {
    let url = stat.url();
    info!("Fetching {url}");
    let html = fetcher.get(url, PageEncoding::Utf8)?;
    let table = parse_team_stats(&html).with_context(|| format!("Bad tables at {url}"))?;
    info!("Columns: {}", table.columns.join(", "));

    let path = config.data_dir.join(stat.file_name(config.season));
    let rows = write_table(&path, &table)?;
    info!("Saved {rows} rows to {}", path.display());
    Ok(1)
}

pub fn run(stat: TeamStat, config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    summary.record(stat.url(), scrape_team_stats(stat, config, fetcher));
}

pub fn fielding_url(league: League, season: i32) -> String {
    format!(
        "https://npb.jp/bis/{season}/stats/tmf_{}.html",
        league.npb_code()
    )
}

pub fn parse_fielding(html: &str, league: League) -> Result<StatTable> {
    let mut table = first_table(html, HeaderDepth::Auto)?.flatten(flatten_joined);
    let team = table
        .column_index(TEAM_COLUMN)
        .with_context(|| format!("No {TEAM_COLUMN} column in {}", table.columns.join(",")))?;
    for row in &mut table.rows {
        if let Some(Cell::Text(name)) = row.get_mut(team) {
            *name = strip_whitespace(name);
        }
    }
    table.push_constant(LEAGUE_COLUMN, Cell::from(league.japanese()));
    Ok(table)
}

fn scrape_fielding(league: League, config: &Config, fetcher: &mut Fetcher) -> Result<usize> {
    let url = fielding_url(league, config.season);
    info!("[{league}] Fetching {url}");
    let html = fetcher.get(&url, PageEncoding::Utf8)?;
    let table = parse_fielding(&html, league).with_context(|| format!("Bad table at {url}"))?;
    info!("[{league}] Columns: {}", table.columns.join(", "));

    let path = config.data_dir.join("team_defense").join(format!(
        "team_fielding_stats_{}_{}.csv",
        league.to_string().to_lowercase(),
        config.season
    ));
    let rows = write_table(&path, &table)?;
    info!("[{league}] Saved {rows} rows to {}", path.display());
    Ok(1)
}

pub fn run_fielding(config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    for league in League::iter() {
        summary.record(league.to_string(), scrape_fielding(league, config, fetcher));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamGames {
    pub team: &'static str,
    pub games: u32,
}

/// Games played per team from the standings page. Header labels are
/// matched with whitespace removed (`試 合`); unknown team names are
/// skipped.
pub fn parse_standings(html: &str) -> Result<Vec<TeamGames>> {
    let mut records = vec![];
    for (league, table) in league_tables(html)? {
        let columns = table.columns.iter().map(|c| strip_whitespace(c)).collect_vec();
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .with_context(|| {
                    format!("No {name} column in {league} table: {}", columns.join(","))
                })
        };
        let (team_col, games_col) = (find(TEAM_COLUMN)?, find(GAMES_COLUMN)?);

        for row in &table.rows {
            let name = row.get(team_col).map(ToString::to_string).unwrap_or_default();
            let Some(team) = Team::from_japanese(&name) else {
                warn!("[{league}] Unknown team {name:?}, skipped");
                continue;
            };
            let games = row.get(games_col).map(ToString::to_string).unwrap_or_default();
            let games = games
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Bad game count {games:?} for {}", team.key))?;
            records.push(TeamGames {
                team: team.key,
                games,
            });
        }
    }
    Ok(records)
}

fn scrape_games(config: &Config, fetcher: &mut Fetcher) -> Result<usize> {
    info!("Fetching {STANDINGS_URL}");
    let html = fetcher.get(STANDINGS_URL, PageEncoding::Utf8)?;
    let records =
        parse_standings(&html).with_context(|| format!("Bad tables at {STANDINGS_URL}"))?;
    for r in &records {
        info!("  {:<10} {}", r.team, r.games);
    }

    let path = config.data_dir.join("matches").join("team_games.csv");
    let rows = write_records(&path, &records)?;
    info!("Saved {rows} rows to {}", path.display());
    Ok(1)
}

pub fn run_games(config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    summary.record(STANDINGS_URL, scrape_games(config, fetcher));
}
