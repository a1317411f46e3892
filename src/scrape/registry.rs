//! The twelve NPB franchises and the codes each source site uses for them.

use strum_macros::{Display, EnumIter};

use crate::util::normalize_label;

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Display, EnumIter)]
pub enum League {
    Central,
    Pacific,
}

impl League {
    pub const fn japanese(self) -> &'static str {
        match self {
            Self::Central => "セ・リーグ",
            Self::Pacific => "パ・リーグ",
        }
    }

    /// npb.jp page suffix.
    pub const fn npb_code(self) -> &'static str {
        match self {
            Self::Central => "c",
            Self::Pacific => "p",
        }
    }

    /// `leg` query value the nf3 schedule page answers to first.
    pub const fn schedule_leg(self) -> u8 {
        match self {
            Self::Central => 0,
            Self::Pacific => 1,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Team {
    /// Lowercase key used in file names, e.g. `fighters`.
    pub key: &'static str,
    /// Directory and file name used by the nf3 jobs, e.g. `Fighters`.
    pub name: &'static str,
    pub league: League,
    /// Short Japanese name as printed in standings tables.
    pub japanese: &'static str,
    /// baseball-data.com suffix, as in `/stats/hitter-f/`.
    pub data_code: &'static str,
    /// nf3 team codes, tried in order.
    pub nf3_codes: &'static [&'static str],
}

impl Team {
    /// Exact lookup by short Japanese name, ignoring width and spacing.
    pub fn from_japanese(name: &str) -> Option<&'static Self> {
        let name = normalize_label(name);
        TEAMS.iter().find(|t| normalize_label(t.japanese) == name)
    }
}

pub const TEAMS: [Team; 12] = [
    Team {
        key: "fighters",
        name: "Fighters",
        league: League::Pacific,
        japanese: "日本ハム",
        data_code: "f",
        nf3_codes: &["F"],
    },
    Team {
        key: "hawks",
        name: "Hawks",
        league: League::Pacific,
        japanese: "ソフトバンク",
        data_code: "h",
        nf3_codes: &["H"],
    },
    Team {
        key: "buffaloes",
        name: "Buffaloes",
        league: League::Pacific,
        japanese: "オリックス",
        data_code: "bs",
        nf3_codes: &["B"],
    },
    Team {
        key: "marines",
        name: "Marines",
        league: League::Pacific,
        japanese: "ロッテ",
        data_code: "m",
        nf3_codes: &["M"],
    },
    Team {
        key: "lions",
        name: "Lions",
        league: League::Pacific,
        japanese: "西武",
        data_code: "l",
        nf3_codes: &["L"],
    },
    Team {
        key: "eagles",
        name: "Eagles",
        league: League::Pacific,
        japanese: "楽天",
        data_code: "e",
        nf3_codes: &["E"],
    },
    Team {
        key: "giants",
        name: "Giants",
        league: League::Central,
        japanese: "巨人",
        data_code: "g",
        nf3_codes: &["G"],
    },
    Team {
        key: "tigers",
        name: "Tigers",
        league: League::Central,
        japanese: "阪神",
        data_code: "t",
        nf3_codes: &["T"],
    },
    Team {
        key: "swallows",
        name: "Swallows",
        league: League::Central,
        japanese: "ヤクルト",
        data_code: "s",
        nf3_codes: &["S"],
    },
    Team {
        key: "dragons",
        name: "Dragons",
        league: League::Central,
        japanese: "中日",
        data_code: "d",
        nf3_codes: &["D"],
    },
    Team {
        key: "carp",
        name: "Carp",
        league: League::Central,
        japanese: "広島",
        data_code: "c",
        nf3_codes: &["C"],
    },
    Team {
        key: "baystars",
        name: "BayStars",
        league: League::Central,
        japanese: "DeNA",
        data_code: "yb",
        nf3_codes: &["DB", "YB"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn six_teams_per_league() {
        for league in League::iter() {
            let count = TEAMS.iter().filter(|t| t.league == league).count();
            assert_eq!(count, 6, "{league}");
        }
    }

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = TEAMS.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), TEAMS.len());
    }

    #[test]
    fn japanese_lookup_ignores_width() {
        assert_eq!(Team::from_japanese("ＤｅＮＡ").map(|t| t.key), Some("baystars"));
        assert_eq!(Team::from_japanese(" 日本 ハム").map(|t| t.key), Some("fighters"));
        assert_eq!(Team::from_japanese("近鉄"), None);
    }
}
