//! Re-slices an opponent or stadium split table into one table per group.

use itertools::Itertools;

use crate::table::header::{partition, SplitHeader};
use crate::table::{Cell, RawTable, StatTable};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTable {
    /// Normalized group label, e.g. an opponent name, a stadium, or `通算`.
    pub group: String,
    pub table: StatTable,
}

/// Identifying columns keep their group label and their text; group columns
/// are named by their sub-label and coerced to numbers.
pub fn split_by_group(raw: &RawTable) -> Vec<GroupTable> {
    let headers = raw
        .headers
        .iter()
        .map(|p| SplitHeader::from_path(p).normalized())
        .collect_vec();
    let columns = partition(&headers);

    columns
        .groups
        .iter()
        .map(|(group, group_cols)| {
            let names = columns
                .identifying
                .iter()
                .map(|&i| headers[i].group.clone())
                .chain(group_cols.iter().map(|&i| headers[i].sub.clone()))
                .collect();
            let rows = raw
                .rows
                .iter()
                .map(|row| {
                    let cell = |i: usize| row.get(i).map_or("", String::as_str);
                    columns
                        .identifying
                        .iter()
                        .map(|&i| Cell::from(cell(i)))
                        .chain(group_cols.iter().map(|&i| Cell::numeric(cell(i))))
                        .collect()
                })
                .collect();
            GroupTable {
                group: group.clone(),
                table: StatTable {
                    columns: names,
                    rows,
                },
            }
        })
        .collect()
}
