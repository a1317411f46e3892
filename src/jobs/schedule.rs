//! Monthly game schedules from nf3, one CSV per team.

use std::ops::RangeInclusive;

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use tracing::info;

use crate::config::Config;
use crate::jobs::RunSummary;
use crate::scrape::fallback::first_success;
use crate::scrape::fetch::{Fetcher, PageEncoding};
use crate::scrape::registry::{Team, TEAMS};
use crate::table::header::flatten_lower_preferred;
use crate::table::html::{first_table, HeaderDepth};
use crate::table::output::write_table;
use crate::table::{Cell, StatTable};

const BASE_URL: &str = "https://nf3.sakura.ne.jp/php/stat_disp/stat_disp.php";
const MONTHS: RangeInclusive<u32> = 3..=11;
const LEGS: [u8; 3] = [0, 1, 2];

const DATE_COLUMN: &str = "日付";
const NEEDED_COLUMNS: [&str; 6] = [DATE_COLUMN, "曜", "対戦T", "球場", "H/V", "開始"];
const META_COLUMNS: [&str; 4] = ["month", "team_code", "leg_used", "source_url"];

/// Date cells of total and repeated-header rows. `合計` is caught by `計`.
const NON_DATE_MARKERS: [&str; 2] = ["計", DATE_COLUMN];

pub fn schedule_url(leg: u8, team_code: &str, month: u32) -> String {
    format!("{BASE_URL}?y=0&leg={leg}&tm={team_code}&mon={month}&vst=all")
}

/// The preferred leg, then the remaining ones in ascending order.
pub fn legs_to_try(preferred: u8) -> Vec<u8> {
    std::iter::once(preferred)
        .chain(LEGS.into_iter().filter(|l| *l != preferred))
        .collect()
}

fn is_game_date(cell: &Cell) -> bool {
    let text = cell.to_string();
    let text = text.trim();
    !text.is_empty() && !NON_DATE_MARKERS.iter().any(|m| text.contains(m))
}

/// Needed columns of one month's table, game rows only. A month with no
/// games is an error.
pub fn parse_month(html: &str) -> Result<StatTable> {
    let full = first_table(html, HeaderDepth::Auto)?.flatten(flatten_lower_preferred);
    let mut table = full.select(&NEEDED_COLUMNS);
    if table.columns.is_empty() {
        bail!("Needed columns missing, table has {}", full.columns.join(","));
    }
    if let Some(date) = table.column_index(DATE_COLUMN) {
        table.retain_rows(|r| r.get(date).is_some_and(is_game_date));
    }
    if table.is_empty() {
        bail!("No game rows (no games or not yet published)");
    }
    Ok(table)
}

fn fetch_month(
    team: &Team,
    code: &str,
    month: u32,
    fetcher: &mut Fetcher,
) -> Result<(u8, StatTable)> {
    let item = format!("{} mon={month}", team.name);
    let (leg, mut table) = first_success(&item, legs_to_try(team.league.schedule_leg()), |leg| {
        let url = schedule_url(*leg, code, month);
        let html = fetcher.get(&url, PageEncoding::ShiftJis)?;
        parse_month(&html).with_context(|| format!("Bad table at {url}"))
    })?;

    table.push_constant("month", Cell::Number(f64::from(month)));
    table.push_constant("team_code", Cell::from(code));
    table.push_constant("leg_used", Cell::Number(f64::from(leg)));
    table.push_constant("source_url", Cell::Text(schedule_url(leg, code, month)));
    Ok((leg, table))
}

fn scrape_team(
    team: &Team,
    config: &Config,
    fetcher: &mut Fetcher,
    summary: &mut RunSummary,
) -> Result<usize> {
    let code = team
        .nf3_codes
        .first()
        .copied()
        .with_context(|| format!("No nf3 code for {}", team.name))?;
    let mut months = vec![];
    for month in MONTHS {
        info!(
            "Fetching {} (tm={code}) mon={month} pref_leg={}",
            team.name,
            team.league.schedule_leg()
        );
        let item = format!("{} mon={month}", team.name);
        match fetch_month(team, code, month, fetcher) {
            Ok((leg, table)) => {
                info!(" -> rows={} leg_used={leg}", table.len());
                months.push(table);
                summary.record(item, Ok(0));
            }
            Err(e) => summary.record(item, Err(e)),
        }
    }
    if months.is_empty() {
        bail!("No schedule data for {}", team.name);
    }

    let order = NEEDED_COLUMNS.iter().chain(&META_COLUMNS).copied().collect_vec();
    let table = StatTable::concat(months).select(&order);
    let path = config
        .data_dir
        .join("matches")
        .join(format!("{}.csv", team.name));
    let rows = write_table(&path, &table)?;
    info!("[DONE] {}: {rows} rows saved -> {}", team.name, path.display());
    Ok(1)
}

pub fn run(config: &Config, fetcher: &mut Fetcher, summary: &mut RunSummary) {
    for team in &TEAMS {
        let result = scrape_team(team, config, fetcher, summary);
        summary.record(team.name, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTH_PAGE: &str = r#"
        <table>
          <tr><th>日付</th><th>曜</th><th>対戦T</th><th>球場</th><th>H/V</th><th>開始</th><th>結果</th></tr>
          <tr><td>4/1</td><td>火</td><td>ロッテ</td><td>エスコンＦ</td><td>H</td><td>18:00</td><td>○</td></tr>
          <tr><td>4/2</td><td>水</td><td>ロッテ</td><td>エスコンＦ</td><td>H</td><td>18:00</td><td>●</td></tr>
          <tr><td>日付</td><td>曜</td><td>対戦T</td><td>球場</td><td>H/V</td><td>開始</td><td>結果</td></tr>
          <tr><td></td><td></td><td>移動日</td><td></td><td></td><td></td><td></td></tr>
          <tr><td>合計</td><td></td><td></td><td></td><td></td><td></td><td>1勝1敗</td></tr>
        </table>"#;

    #[test]
    fn urls_and_leg_order() {
        assert_eq!(
            schedule_url(1, "F", 4),
            "https://nf3.sakura.ne.jp/php/stat_disp/stat_disp.php?y=0&leg=1&tm=F&mon=4&vst=all"
        );
        assert_eq!(legs_to_try(1), vec![1, 0, 2]);
        assert_eq!(legs_to_try(0), vec![0, 1, 2]);
    }

    #[test]
    fn month_keeps_needed_columns_and_game_rows() {
        let table = parse_month(MONTH_PAGE).unwrap();
        assert_eq!(table.columns, NEEDED_COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][0], Cell::from("4/2"));
    }

    #[test]
    fn partial_columns_are_enough() {
        let html = r#"
            <table>
              <tr><th>日付</th><th>球場</th><th>観客</th></tr>
              <tr><td>5/6</td><td>神宮</td><td>30000</td></tr>
            </table>"#;
        let table = parse_month(html).unwrap();
        assert_eq!(table.columns, vec!["日付", "球場"]);
    }

    #[test]
    fn month_without_games_is_an_error() {
        let html = r#"
            <table>
              <tr><th>日付</th><th>曜</th></tr>
              <tr><td>合計</td><td></td></tr>
            </table>"#;
        assert!(parse_month(html).is_err());

        let unrelated = "<table><tr><th>順位</th></tr><tr><td>1</td></tr></table>";
        let err = parse_month(unrelated).unwrap_err();
        assert!(err.to_string().contains("Needed columns missing"));
    }

    #[test]
    fn months_concatenate_in_fixed_column_order() {
        let mut april = parse_month(MONTH_PAGE).unwrap();
        april.push_constant("month", Cell::Number(4.0));
        let may_page = concat!(
            "<table><tr><th>球場</th><th>日付</th></tr>",
            "<tr><td>神宮</td><td>5/6</td></tr></table>",
        );
        let mut may = parse_month(may_page).unwrap();
        may.push_constant("month", Cell::Number(5.0));

        let order = NEEDED_COLUMNS.iter().chain(&META_COLUMNS).copied().collect_vec();
        let table = StatTable::concat(vec![april, may]).select(&order);
        assert_eq!(table.columns.last().map(String::as_str), Some("month"));
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[2][0], Cell::from("5/6"));
        assert_eq!(table.rows[2][1], Cell::Missing);
        assert_eq!(table.rows[2][6].to_string(), "5");
    }
}
