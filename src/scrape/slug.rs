//! Japanese label -> ASCII file name token.
//!
//! Lookup order: known aliases (substring match on the normalized label),
//! then the label's own ASCII characters, then a short MD5 digest.

use lazy_regex::regex;
use lazy_static::lazy_static;
use md5::{Digest, Md5};
use tracing::warn;

use crate::util::normalize_label;

const OPPONENT_ALIASES: &[(&str, &str)] = &[
    ("日本ハム", "Fighters"),
    ("北海道日本ハム", "Fighters"),
    ("ソフトバンク", "Hawks"),
    ("福岡ソフトバンク", "Hawks"),
    ("ロッテ", "Marines"),
    ("千葉ロッテ", "Marines"),
    ("楽天", "Eagles"),
    ("東北楽天", "Eagles"),
    ("オリックス", "Buffaloes"),
    ("西武", "Lions"),
    ("埼玉西武", "Lions"),
    ("巨人", "Giants"),
    ("読売", "Giants"),
    ("阪神", "Tigers"),
    ("DeNA", "BayStars"),
    ("ベイスターズ", "BayStars"),
    ("横浜", "BayStars"),
    ("広島", "Carp"),
    ("中日", "Dragons"),
    ("ヤクルト", "Swallows"),
];

// "みずほPayPay" has to come before "PayPay".
const STADIUM_ALIASES: &[(&str, &str)] = &[
    ("エスコンＦ", "escon_field_hokkaido"),
    ("みずほPayPay", "mizuhopaypay_dome"),
    ("ZOZOマリン", "zozo_marine"),
    ("楽天モバイル", "rakuten_mobile_park"),
    ("京セラD大阪", "kyocera_dome_osaka"),
    ("ベルーナドーム", "belluna_dome"),
    ("東京ドーム", "tokyo_dome"),
    ("神宮", "jinguu_stadium"),
    ("横浜", "yokohama_stadium"),
    ("バンテリンドーム", "banterin_dome_nagoya"),
    ("マツダ", "mazda_stadium"),
    ("甲子園", "koshien_stadium"),
    ("札幌ドーム", "sapporo_dome"),
    ("ほっと神戸", "hotto_motto_kobe"),
    ("北九州", "kitakyushu"),
    ("PayPay", "paypay_dome"),
    ("その他", "others"),
];

lazy_static! {
    pub static ref OPPONENT_SLUGS: SlugTable = SlugTable::new(OPPONENT_ALIASES);
    pub static ref STADIUM_SLUGS: SlugTable = SlugTable::new(STADIUM_ALIASES);
}

/// Ordered alias list with keys stored in normalized form.
#[derive(Debug)]
pub struct SlugTable {
    aliases: Vec<(String, &'static str)>,
}

impl SlugTable {
    pub fn new(aliases: &[(&str, &'static str)]) -> Self {
        Self {
            aliases: aliases
                .iter()
                .map(|(key, token)| (normalize_label(key), *token))
                .filter(|(key, _)| !key.is_empty())
                .collect(),
        }
    }

    fn lookup(&self, normalized: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()))
            .map(|(_, token)| *token)
    }

    pub fn slug(&self, label: &str) -> String {
        let normalized = normalize_label(label);
        if let Some(token) = self.lookup(&normalized) {
            return token.to_string();
        }

        let candidate = ascii_candidate(&normalized);
        if candidate.chars().any(|c| c.is_ascii_alphanumeric()) {
            // TODO: disambiguate short tokens instead of only warning; two
            // unrelated labels sharing one digit land in the same file.
            if candidate.len() <= 2 {
                warn!("Suspicious slug: label={label:?} slug={candidate:?}");
            }
            return candidate;
        }

        let hashed = hash_slug(&normalized);
        warn!("Slug fell back to hash: label={label:?} slug={hashed:?}");
        hashed
    }
}

/// Runs of characters outside `[0-9A-Za-z_.-]` become one `_`; leading
/// and trailing `.`/`_` are trimmed. May be empty.
fn ascii_candidate(s: &str) -> String {
    regex!(r"[^0-9A-Za-z_.\-]+")
        .replace_all(s, "_")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// `u` followed by the first 8 hex digits of the MD5 of `s`.
fn hash_slug(s: &str) -> String {
    let digest = format!("{:x}", Md5::digest(s.as_bytes()));
    format!("u{}", &digest[..8])
}
