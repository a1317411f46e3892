pub mod header;
pub mod html;
pub mod output;
pub mod split;

use std::fmt;

use anyhow::{bail, Result};
use itertools::Itertools;

use crate::util::parse_number;

/// One header path per column, as read from up to three header rows.
pub type HeaderPath = Vec<String>;

/// A table straight out of the HTML, before any header normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<HeaderPath>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Flattens every header path with `flatten` and keeps all cells as text.
    pub fn flatten(self, flatten: impl Fn(&[String]) -> String) -> StatTable {
        let columns = self.headers.iter().map(|h| flatten(h.as_slice())).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|r| r.into_iter().map(Cell::Text).collect())
            .collect();
        StatTable { columns, rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    pub fn numeric(text: &str) -> Self {
        parse_number(text).map_or(Self::Missing, Self::Number)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A flat, named-column table ready to be written as CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl StatTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Replaces all column names; the count has to match.
    pub fn rename(&mut self, names: &[&str]) -> Result<()> {
        if names.len() != self.columns.len() {
            bail!(
                "Column count mismatch: expected {}, table has {} ({})",
                names.len(),
                self.columns.len(),
                self.columns.join(",")
            );
        }
        self.columns = names.iter().map(ToString::to_string).collect();
        Ok(())
    }

    /// Keeps the named columns that exist, in the order given.
    pub fn select(&self, names: &[&str]) -> Self {
        let picked = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (*n, i)))
            .collect_vec();
        Self {
            columns: picked.iter().map(|(n, _)| (*n).to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| {
                    picked
                        .iter()
                        .map(|(_, i)| r.get(*i).cloned().unwrap_or(Cell::Missing))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn retain_rows(&mut self, keep: impl Fn(&[Cell]) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Appends a column holding the same value on every row.
    pub fn push_constant(&mut self, name: &str, value: Cell) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Stacks tables on top of each other. The output has the union of all
    /// columns in first-appearance order; absent columns are left missing.
    pub fn concat(tables: Vec<Self>) -> Self {
        let columns = tables
            .iter()
            .flat_map(|t| t.columns.iter().cloned())
            .unique()
            .collect_vec();
        let mut rows = Vec::new();
        for table in tables {
            let mapping = columns
                .iter()
                .map(|c| table.column_index(c))
                .collect_vec();
            for row in table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|i| i.and_then(|i| row.get(i).cloned()).unwrap_or(Cell::Missing))
                        .collect(),
                );
            }
        }
        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> StatTable {
        StatTable {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        }
    }

    #[test]
    fn numbers_render_without_trailing_zeroes() {
        assert_eq!(Cell::numeric("3").to_string(), "3");
        assert_eq!(Cell::numeric("2.50").to_string(), "2.5");
        assert_eq!(Cell::numeric("-").to_string(), "");
    }

    #[test]
    fn rename_requires_matching_width() {
        let mut t = table(&["a", "b"], &[&["1", "2"]]);
        assert!(t.rename(&["x"]).is_err());
        t.rename(&["x", "y"]).unwrap();
        assert_eq!(t.columns, vec!["x", "y"]);
    }

    #[test]
    fn select_skips_absent_columns() {
        let t = table(&["日付", "曜", "球場"], &[&["3/29", "金", "神宮"]]);
        let s = t.select(&["日付", "対戦T", "球場"]);
        assert_eq!(s.columns, vec!["日付", "球場"]);
        assert_eq!(s.rows[0], vec![Cell::from("3/29"), Cell::from("神宮")]);
    }

    #[test]
    fn concat_unions_columns() {
        let a = table(&["チーム", "打率"], &[&["阪神", ".250"]]);
        let b = table(&["チーム", "本塁打"], &[&["西武", "80"]]);
        let c = StatTable::concat(vec![a, b]);
        assert_eq!(c.columns, vec!["チーム", "打率", "本塁打"]);
        assert_eq!(c.rows[0][2], Cell::Missing);
        assert_eq!(c.rows[1][1], Cell::Missing);
        assert_eq!(c.rows[1][2], Cell::from("80"));
    }
}
