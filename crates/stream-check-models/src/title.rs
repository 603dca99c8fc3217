use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Earliest year treated as a plausible release year when stripping a
/// trailing "(YYYY)" token.
const MIN_RELEASE_YEAR: u32 = 1880;

/// Canonical matching key derived from a display title, with the release
/// year separated out. The year disambiguates candidates but is never part
/// of the key itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NormalizedTitle {
    pub key: String,
    pub year: Option<u32>,
}

impl NormalizedTitle {
    /// Normalize a display title for cross-source comparison.
    ///
    /// Total and deterministic. Re-normalizing a produced `key` yields the
    /// same key (the year, once stripped, is gone from the key for good).
    pub fn from_display(display: &str) -> Self {
        let (rest, year) = split_trailing_year(display);
        Self {
            key: canonicalize(rest),
            year,
        }
    }
}

/// Split off a trailing parenthesized year ("Parasite (2019)" -> "Parasite",
/// 2019). Only a token of exactly four digits inside the plausible release
/// range counts; anything else stays in the title verbatim.
fn split_trailing_year(title: &str) -> (&str, Option<u32>) {
    let trimmed = title.trim_end();
    let Some(body) = trimmed.strip_suffix(')') else {
        return (title, None);
    };
    let Some(open) = body.rfind('(') else {
        return (title, None);
    };
    let token = &body[open + 1..];
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(year) = token.parse::<u32>() {
            if (MIN_RELEASE_YEAR..=max_plausible_year()).contains(&year) {
                return (body[..open].trim_end(), Some(year));
            }
        }
    }
    (title, None)
}

fn max_plausible_year() -> u32 {
    Utc::now().year() as u32 + 2
}

/// Lower-case, drop punctuation, collapse whitespace.
fn canonicalize(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut pending_space = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            pending_space = true;
        }
        // punctuation contributes nothing, not even a separator
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_year() {
        let normalized = NormalizedTitle::from_display("Parasite (2019)");
        assert_eq!(normalized.key, "parasite");
        assert_eq!(normalized.year, Some(2019));
    }

    #[test]
    fn test_title_without_year() {
        let normalized = NormalizedTitle::from_display("Se7en");
        assert_eq!(normalized.key, "se7en");
        assert_eq!(normalized.year, None);
    }

    #[test]
    fn test_non_year_parenthetical_is_kept() {
        let normalized = NormalizedTitle::from_display("Okja (Director's Cut)");
        assert_eq!(normalized.key, "okja directors cut");
        assert_eq!(normalized.year, None);
    }

    #[test]
    fn test_leading_number_is_not_a_year() {
        let normalized = NormalizedTitle::from_display("2001: A Space Odyssey (1968)");
        assert_eq!(normalized.key, "2001 a space odyssey");
        assert_eq!(normalized.year, Some(1968));
    }

    #[test]
    fn test_implausible_year_stays_in_key() {
        let normalized = NormalizedTitle::from_display("Starship (3022)");
        assert_eq!(normalized.key, "starship 3022");
        assert_eq!(normalized.year, None);
    }

    #[test]
    fn test_whitespace_collapses() {
        let normalized = NormalizedTitle::from_display("  The   Matrix  ");
        assert_eq!(normalized.key, "the matrix");
    }

    #[test]
    fn test_normalizing_a_key_is_a_noop() {
        for title in [
            "Parasite (2019)",
            "Se7en",
            "Okja (Director's Cut)",
            "WALL·E",
            "The Good, the Bad and the Ugly (1966)",
        ] {
            let first = NormalizedTitle::from_display(title);
            let second = NormalizedTitle::from_display(&first.key);
            assert_eq!(second.key, first.key, "key changed for {title:?}");
            assert_eq!(second.year, None, "a key must not carry a year");
        }
    }
}
