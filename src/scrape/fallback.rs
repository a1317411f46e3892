use std::fmt::Display;

use anyhow::{bail, Result};
use tracing::warn;

/// Tries each candidate in order and returns the first that works along
/// with its result. Failures are logged; if all fail, the last error is
/// returned with the number of candidates tried.
pub fn first_success<C, T, F>(
    item: &str,
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<(C, T)>
where
    C: Display,
    F: FnMut(&C) -> Result<T>,
{
    let mut last_error = None;
    let mut tried = 0;
    for candidate in candidates {
        tried += 1;
        match attempt(&candidate) {
            Ok(value) => return Ok((candidate, value)),
            Err(e) => {
                warn!("{item}: candidate {candidate} failed: {e:#}");
                last_error = Some(e);
            }
        }
    }
    match last_error {
        Some(e) => Err(e.context(format!("All {tried} candidates failed for {item}"))),
        None => bail!("No candidates to try for {item}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn first_working_candidate_wins() {
        let mut seen = vec![];
        let (code, value) = first_success("BayStars", ["DB", "YB", "XX"], |c| {
            seen.push(c.to_string());
            if *c == "YB" {
                Ok(42)
            } else {
                Err(anyhow!("404"))
            }
        })
        .unwrap();
        assert_eq!((code, value), ("YB", 42));
        assert_eq!(seen, vec!["DB", "YB"]);
    }

    #[test]
    fn all_failing_reports_last_error() {
        let err = first_success("Giants", [0, 1, 2], |leg| -> Result<()> {
            Err(anyhow!("leg {leg} empty"))
        })
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("All 3 candidates failed for Giants"));
        assert!(message.contains("leg 2 empty"));
    }

    #[test]
    fn no_candidates_is_an_error() {
        let none: Vec<&str> = vec![];
        assert!(first_success("Carp", none, |_| Ok(())).is_err());
    }
}
