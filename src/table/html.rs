//! HTML table extraction.
//!
//! Every `<table>` becomes a [`Grid`]: one entry per `<tr>` owned by that
//! table, with `colspan`/`rowspan` cells copied into each position they
//! cover. A grid is then cut into header rows and data rows.

use anyhow::{anyhow, bail, Context, Result};
use scraper::{ElementRef, Html, Selector};

use crate::table::RawTable;
use crate::util::collapse_whitespace;

const MAX_SPAN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDepth {
    /// Leading rows that sit in `<thead>` or hold only `<th>` cells; at least one.
    Auto,
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GridRow {
    cells: Vec<String>,
    header: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<GridRow>,
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("Invalid selector {s}: {e:?}"))
}

fn span(cell: ElementRef, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(MAX_SPAN))
}

/// Copies cells carried down by an earlier `rowspan` into the current row.
fn fill_pending(pending: &mut [Option<(String, usize)>], cells: &mut Vec<String>) {
    while let Some(slot) = pending.get_mut(cells.len()) {
        let Some((text, remaining)) = slot.as_mut() else {
            break;
        };
        cells.push(text.clone());
        *remaining -= 1;
        if *remaining == 0 {
            *slot = None;
        }
    }
}

impl Grid {
    fn from_table(table: ElementRef, row_selector: &Selector) -> Self {
        let mut pending: Vec<Option<(String, usize)>> = Vec::new();
        let mut rows = Vec::new();

        let owned_rows = table.select(row_selector).filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "table")
                .map(|e| e.id())
                == Some(table.id())
        });

        for tr in owned_rows {
            let in_thead = tr
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|p| p.value().name() == "thead");
            let mut cells = Vec::new();
            let mut all_th = true;
            let mut any_cell = false;

            let row_cells = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| matches!(e.value().name(), "th" | "td"));
            for cell in row_cells {
                any_cell = true;
                all_th &= cell.value().name() == "th";
                fill_pending(&mut pending, &mut cells);

                let text = collapse_whitespace(&cell.text().collect::<String>());
                let rowspan = span(cell, "rowspan");
                for _ in 0..span(cell, "colspan") {
                    let col = cells.len();
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    if rowspan > 1 {
                        pending[col] = Some((text.clone(), rowspan - 1));
                    }
                    cells.push(text.clone());
                }
            }
            if !any_cell {
                continue;
            }
            fill_pending(&mut pending, &mut cells);
            rows.push(GridRow {
                cells,
                header: in_thead || all_th,
            });
        }
        Self { rows }
    }

    /// Splits the grid into header paths and data rows. Data rows are padded
    /// or truncated to the header width; blank rows are dropped.
    pub fn into_raw(self, depth: HeaderDepth) -> Result<RawTable> {
        let header_count = match depth {
            HeaderDepth::Auto => self.rows.iter().take_while(|r| r.header).count().max(1),
            HeaderDepth::Fixed(n) => n,
        };
        if self.rows.len() < header_count {
            bail!(
                "Table has {} rows, expected at least {} header rows",
                self.rows.len(),
                header_count
            );
        }

        let mut rows = self.rows.into_iter().map(|r| r.cells);
        let header_rows: Vec<Vec<String>> = rows.by_ref().take(header_count).collect();
        let width = header_rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            bail!("Table has an empty header");
        }
        let headers = (0..width)
            .map(|i| {
                header_rows
                    .iter()
                    .map(|r| r.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        let rows = rows
            .filter(|r| r.iter().any(|c| !c.is_empty()))
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Ok(RawTable { headers, rows })
    }
}

/// All tables of the document, outermost first, in document order.
pub fn parse_tables(html: &str) -> Result<Vec<Grid>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    Ok(document
        .select(&table_selector)
        .map(|t| Grid::from_table(t, &row_selector))
        .collect())
}

pub fn first_table(html: &str, depth: HeaderDepth) -> Result<RawTable> {
    parse_tables(html)?
        .into_iter()
        .next()
        .context("No table found in page")?
        .into_raw(depth)
}
