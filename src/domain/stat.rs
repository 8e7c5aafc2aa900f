use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::commit::LineStats;

static INSERTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) insertion").expect("valid insertion pattern"));
static DELETIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) deletion").expect("valid deletion pattern"));

/// Reads the closing summary line of `git show --stat`.
///
/// Only the last non-empty line counts. Anything that does not match reads as
/// zero, so binary-only changes and garbage input both yield empty stats.
pub fn parse_stat_summary(text: &str) -> LineStats {
    let Some(last_line) = text.lines().rev().find(|line| !line.trim().is_empty()) else {
        return LineStats::default();
    };

    LineStats {
        insertions: capture_count(&INSERTIONS, last_line),
        deletions: capture_count(&DELETIONS, last_line),
    }
}

fn capture_count(pattern: &Regex, line: &str) -> u64 {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|count| count.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(insertions: u64, deletions: u64) -> LineStats {
        LineStats {
            insertions,
            deletions,
        }
    }

    #[test]
    fn parses_both_counts() {
        assert_eq!(
            parse_stat_summary("3 insertions(+), 1 deletion(-)"),
            stats(3, 1)
        );
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(parse_stat_summary(""), stats(0, 0));
        assert_eq!(parse_stat_summary("\n  \n"), stats(0, 0));
    }

    #[test]
    fn handles_one_sided_summaries() {
        assert_eq!(
            parse_stat_summary(" 2 files changed, 40 insertions(+)"),
            stats(40, 0)
        );
        assert_eq!(
            parse_stat_summary(" 1 file changed, 1 deletion(-)"),
            stats(0, 1)
        );
    }

    #[test]
    fn binary_change_reports_nothing() {
        let text = " logo.png | Bin 0 -> 1520 bytes\n 1 file changed";
        assert_eq!(parse_stat_summary(text), stats(0, 0));
    }

    #[test]
    fn only_the_last_line_is_authoritative() {
        let text = " src/a.rs | 12 ++++++++----\n 9 insertions in a comment\n 1 file changed, 8 insertions(+), 4 deletions(-)\n";
        assert_eq!(parse_stat_summary(text), stats(8, 4));
    }

    #[test]
    fn oversized_counts_fall_back_to_zero() {
        let text = "99999999999999999999999 insertions(+), 2 deletions(-)";
        assert_eq!(parse_stat_summary(text), stats(0, 2));
    }
}
