//! Heuristic extraction of card queries from free text.
//!
//! Three entry points, all pure:
//!
//! - [`parse`] scans hovered page text token by token for a set code, a card
//!   number and a rarity. Word order and punctuation do not matter, and no
//!   name is extracted because localized names make poor match keys.
//! - [`parse_sentence`] matches whole-sentence layouts such as
//!   `Name (SET NUM)` and does extract a name.
//! - [`parse_lines`] splits popup input into one query per line.

use std::sync::LazyLock;

use regex::Regex;

use crate::config;
use crate::models::{normalize_card_number, CardQuery, SearchMode};

/// Rarity / print-variant vocabulary, longest entries first.
pub const RARITY_TOKENS: &[&str] = &[
    "rainbow r", "rainbow", "promo", "sar", "chr", "sr", "ar", "ur", "rr", "hr",
];

/// Pure-letter tokens accepted as a set code when no alphanumeric code is present.
pub const KNOWN_CODES: &[&str] = &[
    "ar", "sar", "sr", "chr", "ur", "rr", "hr", "bw", "xy", "dp", "sm", "sv", "swsh", "hgss",
];

static SET_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z]{1,4}[0-9]{1,3}[a-z]{0,2}$").expect("set code regex")
});

static NUM_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,3})\s*/\s*([0-9]{1,3})\b").expect("number regex"));

// Sentence layouts, tried in order.
static SET_NUM_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z]+\d+[a-zA-Z]*)\s+(\d+)/(\d+)").expect("sentence regex")
});
static NAME_PAREN_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+?)\s*\(([a-zA-Z]+\d+[a-zA-Z]*)\s+(\d+)\)").expect("sentence regex")
});
static SET_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-zA-Z]+\d+[a-zA-Z]*)\s+([a-zA-Z][a-zA-Z\s']*[a-zA-Z])\b")
        .expect("sentence regex")
});
static NAME_THEN_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-zA-Z][a-zA-Z\s']*[a-zA-Z])\s+([a-zA-Z]+\d+[a-zA-Z]*)\b")
        .expect("sentence regex")
});
static BARE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-zA-Z]+\d+[a-zA-Z]*)\b").expect("sentence regex"));

static LINE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+\d+[a-zA-Z]*$").expect("line regex"));
static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("line regex"));

// ---------------------------------------------------------------------------
// Token scan
// ---------------------------------------------------------------------------

/// True if hovered text is long enough to mean something and short enough
/// not to be a whole paragraph.
pub fn is_parseable_length(text: &str) -> bool {
    let len = text.trim().chars().count();
    len > config::MIN_HOVER_TEXT && len < config::MAX_HOVER_TEXT
}

/// Scan hovered text for a set code, a card number and a rarity.
///
/// Returns `None` when the text is out of bounds or none of the three was found.
///
/// ```rust
/// use card_price_lookup::parser::parse;
/// let q = parse("Team Rocket's Wanaider AR SV10 099/098").unwrap();
/// assert_eq!(q.set_number.as_deref(), Some("sv10"));
/// assert_eq!(q.card_number.as_deref(), Some("99"));
/// assert_eq!(q.card_type.as_deref(), Some("ar"));
/// assert_eq!(q.name, None);
/// ```
pub fn parse(text: &str) -> Option<CardQuery> {
    if !is_parseable_length(text) {
        return None;
    }
    let clean = collapse_whitespace(text);
    let tokens = tokens(&clean);

    let set_number = scan_set_code(&tokens);
    let card_number = scan_card_number(&clean, &tokens);
    let card_type = scan_rarity(&tokens);

    if set_number.is_none() && card_number.is_none() && card_type.is_none() {
        tracing::debug!(text = %clean, "no card info in hover text");
        return None;
    }

    Some(CardQuery {
        name: None,
        set_number: set_number.map(|s| s.to_lowercase()),
        card_number: card_number.map(|n| n.to_string()),
        card_type: card_type.map(|t| t.to_lowercase()),
        search_mode: SearchMode::HoverNormal,
        row_number: None,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-separated words with surrounding punctuation removed.
fn tokens(clean: &str) -> Vec<&str> {
    clean
        .split(' ')
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn scan_set_code<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    tokens
        .iter()
        .find(|t| SET_CODE.is_match(t))
        .or_else(|| {
            tokens
                .iter()
                .find(|t| KNOWN_CODES.contains(&t.to_lowercase().as_str()))
        })
        .copied()
}

fn scan_card_number(clean: &str, tokens: &[&str]) -> Option<u32> {
    if let Some(caps) = NUM_TOTAL.captures(clean) {
        if let Ok(n) = caps[1].parse() {
            return Some(n);
        }
    }

    let candidates: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| (1..=3).contains(&t.len()) && t.chars().all(|c| c.is_ascii_digit()))
        .collect();

    if let Some(padded) = candidates.iter().find(|t| t.len() == 3) {
        return padded.parse().ok();
    }
    candidates
        .iter()
        .filter_map(|t| t.parse::<u32>().ok())
        .filter(|n| *n <= 999)
        .max()
}

fn scan_rarity(tokens: &[&str]) -> Option<&'static str> {
    let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    for (i, token) in lower.iter().enumerate() {
        if token == "rainbow" && lower.get(i + 1).map(String::as_str) == Some("r") {
            return Some("rainbow r");
        }
        if let Some(hit) = RARITY_TOKENS.iter().copied().find(|r| *r == token.as_str()) {
            return Some(hit);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Sentence layouts
// ---------------------------------------------------------------------------

/// Match whole-sentence card layouts and extract a name where one is present.
///
/// Layouts are tried in order, first match wins:
///
/// 1. `anything SET NUM/TOTAL`, name = text before the set code
/// 2. `Name (SET NUM)`
/// 3. `SET Name`
/// 4. `Name SET`
/// 5. a bare set code
pub fn parse_sentence(text: &str) -> Option<CardQuery> {
    let clean = collapse_whitespace(text);
    let mut query = CardQuery::new(SearchMode::HoverNormal);

    if let Some(caps) = SET_NUM_TOTAL.captures(&clean) {
        let set = caps.get(1)?;
        let before = clean[..set.start()].trim();
        if before.chars().count() > 2 {
            query.name = Some(before.to_lowercase());
        }
        query.set_number = Some(set.as_str().to_lowercase());
        query.card_number = Some(normalize_card_number(&caps[2]));
    } else if let Some(caps) = NAME_PAREN_SET.captures(&clean) {
        query.name = Some(caps[1].trim().to_lowercase());
        query.set_number = Some(caps[2].to_lowercase());
        query.card_number = Some(normalize_card_number(&caps[3]));
    } else if let Some(caps) = SET_THEN_NAME.captures(&clean) {
        query.set_number = Some(caps[1].to_lowercase());
        query.name = Some(caps[2].to_lowercase());
    } else if let Some(caps) = NAME_THEN_SET.captures(&clean) {
        query.name = Some(caps[1].to_lowercase());
        query.set_number = Some(caps[2].to_lowercase());
    } else if let Some(caps) = BARE_SET.captures(&clean) {
        query.set_number = Some(caps[1].to_lowercase());
    } else {
        return None;
    }

    Some(query)
}

// ---------------------------------------------------------------------------
// Popup lines
// ---------------------------------------------------------------------------

/// Split popup input into one normal-mode query per non-empty line.
///
/// Within a line, a letters-then-digits word is the set code, an all-digit
/// word is the card number (the last of each wins), and every other word is
/// part of the lowercased name. `row_number` is the 1-based line index.
pub fn parse_lines(input: &str) -> Vec<CardQuery> {
    input
        .trim()
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let mut query = CardQuery::new(SearchMode::Normal).row_number(index + 1);
            let mut name_parts: Vec<String> = Vec::new();

            for part in line.split_whitespace() {
                if LINE_SET.is_match(part) {
                    query.set_number = Some(part.to_lowercase());
                } else if LINE_NUMBER.is_match(part) {
                    query.card_number = Some(part.to_string());
                } else {
                    name_parts.push(part.to_lowercase());
                }
            }

            if !name_parts.is_empty() {
                query.name = Some(name_parts.join(" "));
            }
            Some(query)
        })
        .collect()
}
