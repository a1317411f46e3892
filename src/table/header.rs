use itertools::Itertools;

use crate::util::{fold_width, strip_whitespace};

/// Marker the split pages put in the third header row of every column.
pub const TOTAL_MARKER: &str = "合計";

/// Group label of the career-aggregate split.
pub const CAREER_TOTAL: &str = "通算";

/// (group, sub-group, total-marker) of one column of a split table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitHeader {
    pub group: String,
    pub sub: String,
    pub marker: Option<String>,
}

impl SplitHeader {
    /// Builds a header from a 2- or 3-part path. Missing parts are empty.
    pub fn from_path(path: &[String]) -> Self {
        let part = |i: usize| path.get(i).cloned().unwrap_or_default();
        Self {
            group: part(0),
            sub: part(1),
            marker: path.get(2).cloned(),
        }
    }

    pub fn normalized(&self) -> Self {
        let part = |s: &str| fold_width(s).trim().to_string();
        Self {
            group: strip_whitespace(&part(&self.group)),
            sub: part(&self.sub),
            marker: self.marker.as_deref().map(part),
        }
    }

    /// Player number, name and handedness span every header row with the
    /// same label and carry the total marker.
    pub fn is_identifying(&self) -> bool {
        self.group == self.sub && self.marker.as_deref().map_or(true, |m| m == TOTAL_MARKER)
    }
}

/// Column indices of a split table, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPartition {
    pub identifying: Vec<usize>,
    /// Split groups in first-appearance order.
    pub groups: Vec<(String, Vec<usize>)>,
}

pub fn partition(headers: &[SplitHeader]) -> ColumnPartition {
    let mut identifying = headers
        .iter()
        .positions(SplitHeader::is_identifying)
        .collect_vec();
    if identifying.is_empty() {
        identifying = (0..headers.len().min(3)).collect();
    }

    let id_groups = identifying
        .iter()
        .map(|&i| headers[i].group.as_str())
        .collect_vec();
    let groups = headers
        .iter()
        .map(|h| h.group.as_str())
        .unique()
        .filter(|g| !id_groups.contains(g))
        .map(|g| {
            let cols = headers.iter().positions(|h| h.group == g).collect_vec();
            (g.to_string(), cols)
        })
        .collect();

    ColumnPartition {
        identifying,
        groups,
    }
}

/// Last non-empty part of the path.
pub fn flatten_lower_preferred(path: &[String]) -> String {
    path.iter()
        .rev()
        .map(|p| p.trim())
        .find(|p| !p.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Parts joined with all whitespace removed. A part repeated in the next
/// header row is taken once, and a name that is the same string twice over
/// is cut in half.
pub fn flatten_joined(path: &[String]) -> String {
    let joined = strip_whitespace(&path.iter().dedup().join(""));
    let chars = joined.chars().collect_vec();
    let half = chars.len() / 2;
    if half > 0 && chars.len() % 2 == 0 && chars[..half] == chars[half..] {
        chars[..half].iter().collect()
    } else {
        joined
    }
}
