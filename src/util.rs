use unicode_normalization::UnicodeNormalization;

/// NFKC fold: full-width ASCII, half-width katakana and the ideographic
/// space all come out in their usual forms.
pub(crate) fn fold_width(s: &str) -> String {
    s.nfkc().collect()
}

pub(crate) fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses whitespace runs to a single space and trims.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Width fold, trim, and drop all interior whitespace. Used wherever a
/// Japanese label is compared against a known name.
pub(crate) fn normalize_label(s: &str) -> String {
    strip_whitespace(&fold_width(s))
}

/// Lenient numeric parse: blanks, dashes and anything else unparseable
/// yield `None`.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = fold_width(s);
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn human_size(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if n < 1024.0 {
            return format!("{n:.1}{unit}");
        }
        n /= 1024.0;
    }
    format!("{n:.1}PB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_full_width_letters_and_space() {
        assert_eq!(fold_width("ＤｅＮＡ"), "DeNA");
        assert_eq!(fold_width("エスコンＦ"), "エスコンF");
        assert_eq!(fold_width("東京\u{3000}ドーム"), "東京 ドーム");
        assert_eq!(fold_width("１２３"), "123");
    }

    #[test]
    fn folds_half_width_katakana() {
        assert_eq!(fold_width("ｴｽｺﾝF"), "エスコンF");
        assert_eq!(fold_width("ﾔｸﾙﾄ"), "ヤクルト");
        assert_eq!(fold_width("ﾄﾞｰﾑ"), "ドーム");
    }

    #[test]
    fn normalize_label_removes_all_spacing() {
        assert_eq!(normalize_label(" 京セラ Ｄ\u{3000}大阪 "), "京セラD大阪");
    }

    #[test]
    fn parse_number_is_lenient() {
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number(" .285 "), Some(0.285));
        assert_eq!(parse_number("２"), Some(2.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("nan"), None);
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(512), "512.0B");
        assert_eq!(human_size(1536), "1.5KB");
        assert_eq!(human_size(500 * 1024 * 1024), "500.0MB");
    }
}
