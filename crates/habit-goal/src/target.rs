// target.rs: Derive a numeric total and unit from a free-text goal target.
//
// "read 10 books"  → (10, "books")
// "read ten books" → (10, "books")
// "run 5"          → (5, "")
// "meditate"       → (1, "")
//
// Only the tail of the text is consulted. Spelled numbers are matched one
// word at a time: "twenty-five" resolves to 5, not 25.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Spelled-out numbers recognized by the parser.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
    ("hundred", 100),
];

static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*(\w+)?$").expect("trailing digits pattern is valid")
});

static TRAILING_WORD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    let words: Vec<&str> = NUMBER_WORDS.iter().map(|(word, _)| *word).collect();
    let pattern = format!(r"(?i)\b({})\b\s*(\w+)?$", words.join("|"));
    Regex::new(&pattern).expect("number word pattern is valid")
});

/// The quantity a goal target asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTarget {
    pub total: f64,
    pub unit: String,
}

impl ParsedTarget {
    fn new(total: f64, unit: Option<&str>) -> Self {
        Self {
            total,
            unit: unit.unwrap_or_default().to_string(),
        }
    }
}

/// Parse a goal target into `(total, unit)`. Never fails.
///
/// A trailing digit sequence wins over a trailing number word; text with
/// neither is a single-unit goal. A literal count of zero is read as one so
/// the resulting total is always positive.
///
/// Number words only count as whole words. A substring match would read
/// "stretch often" as ten; here it stays a single-unit goal.
pub fn parse_target(text: &str) -> ParsedTarget {
    let text = text.trim_end();

    if let Some(caps) = TRAILING_DIGITS.captures(text) {
        // All-ASCII-digit input only fails to parse on overflow.
        let count = caps[1].parse::<u64>().unwrap_or(u64::MAX).max(1);
        return ParsedTarget::new(count as f64, caps.get(2).map(|m| m.as_str()));
    }

    if let Some(caps) = TRAILING_WORD_NUMBER.captures(text) {
        let word = caps[1].to_lowercase();
        let count = NUMBER_WORDS
            .iter()
            .find(|(w, _)| *w == word)
            .map_or(1, |(_, n)| *n);
        return ParsedTarget::new(f64::from(count), caps.get(2).map(|m| m.as_str()));
    }

    ParsedTarget::new(1.0, None)
}
