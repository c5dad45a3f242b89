// src/services/providers/parse.rs

//! Text helpers shared by the provider parsers.
//!
//! Result pages drift often, so parsing works on normalized text rather than
//! exact markup: find a date, collect the 1-2 digit tokens that fall in the
//! game's range, split them into main numbers and bonus, and let
//! [`DrawRecord::new`] reject anything malformed.

use std::ops::Range;

use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;

use crate::models::{DrawRecord, GameConfig};

const DATE_FORMATS: [&str; 5] = ["%A %B %d %Y", "%B %d %Y", "%a %b %d %Y", "%b %d %Y", "%Y-%m-%d"];

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

const WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";

/// Records extracted from one page.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<DrawRecord>,
    /// Dated entries whose numbers failed validation
    pub dropped: usize,
}

impl ParseOutcome {
    /// Validate and keep one candidate draw.
    pub fn push_candidate(&mut self, date: NaiveDate, numbers: &[u8], game: &GameConfig) {
        let record = split_main_and_bonus(numbers, game)
            .and_then(|(main, bonus)| DrawRecord::new(date, main, bonus, game));
        match record {
            Some(record) => self.records.push(record),
            None => self.dropped += 1,
        }
    }
}

/// Parse a date written as "Wednesday, January 3, 2024", "January 3 2024" or
/// "2024-01-03".
pub fn parse_draw_date(text: &str) -> Option<NaiveDate> {
    let cleaned = normalize_whitespace(&text.replace(',', " "));
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an element with whitespace normalized.
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// First `picks_per_line` numbers are the main numbers, the next is the bonus.
pub fn split_main_and_bonus<'a>(
    numbers: &'a [u8],
    game: &GameConfig,
) -> Option<(&'a [u8], Option<u8>)> {
    if numbers.len() < game.picks_per_line {
        return None;
    }
    let (main, rest) = numbers.split_at(game.picks_per_line);
    Some((main, rest.first().copied()))
}

/// Drop repeated values, keeping first occurrences in order.
pub fn dedupe_preserving_order(numbers: &[u8]) -> Vec<u8> {
    let mut seen = std::collections::HashSet::new();
    numbers.iter().copied().filter(|n| seen.insert(*n)).collect()
}

/// Finds draw dates and number tokens in free text.
#[derive(Debug, Clone)]
pub struct TextScanner {
    date: Regex,
    month: Regex,
    token: Regex,
}

impl TextScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            date: Regex::new(&format!(
                r"(?:\b(?:{WEEKDAYS}),?\s+)?\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b|\b\d{{4}}-\d{{2}}-\d{{2}}\b"
            ))?,
            month: Regex::new(&format!(r"\b(?:{MONTHS})\b"))?,
            token: Regex::new(r"\b\d{1,2}\b")?,
        })
    }

    /// First parseable date in `text` with its byte range.
    pub fn find_date(&self, text: &str) -> Option<(Range<usize>, NaiveDate)> {
        self.date
            .find_iter(text)
            .find_map(|m| parse_draw_date(m.as_str()).map(|d| (m.range(), d)))
    }

    /// Byte offsets where a month name starts.
    pub fn month_starts(&self, text: &str) -> Vec<usize> {
        self.month.find_iter(text).map(|m| m.start()).collect()
    }

    /// 1-2 digit tokens inside the game's range, in order.
    pub fn numbers(&self, text: &str, game: &GameConfig) -> Vec<u8> {
        self.token
            .find_iter(text)
            .filter_map(|m| m.as_str().parse::<u8>().ok())
            .filter(|n| game.contains(*n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameType;

    #[test]
    fn test_parse_draw_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 3);
        assert_eq!(parse_draw_date("Wednesday January 3 2024"), expected);
        assert_eq!(parse_draw_date("Wednesday, January 3, 2024"), expected);
        assert_eq!(parse_draw_date("January 03, 2024"), expected);
        assert_eq!(parse_draw_date("  2024-01-03 "), expected);
        assert_eq!(parse_draw_date("Winning Numbers"), None);
    }

    #[test]
    fn test_find_date_skips_surrounding_text() {
        let scanner = TextScanner::new().unwrap();
        let text = "Draw of Saturday, March 9, 2024 results 1 2 3";
        let (range, date) = scanner.find_date(text).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(&text[range], "Saturday, March 9, 2024");
    }

    #[test]
    fn test_numbers_filters_range_and_long_tokens() {
        let scanner = TextScanner::new().unwrap();
        let game = GameConfig::for_game(GameType::Lotto649);
        let numbers = scanner.numbers("04 17 0 50 123 49 $5,000,000", &game);
        assert_eq!(numbers, vec![4, 17, 49, 5]);
    }

    #[test]
    fn test_split_main_and_bonus() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let (main, bonus) = split_main_and_bonus(&[1, 2, 3, 4, 5, 6, 7, 8], &game).unwrap();
        assert_eq!(main, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(bonus, Some(7));
        assert!(split_main_and_bonus(&[1, 2, 3], &game).is_none());
    }

    #[test]
    fn test_push_candidate_counts_drops() {
        let game = GameConfig::for_game(GameType::Lotto649);
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut outcome = ParseOutcome::default();
        outcome.push_candidate(date, &[1, 2, 3, 4, 5, 6, 7], &game);
        outcome.push_candidate(date, &[1, 1, 3, 4, 5, 6], &game);
        outcome.push_candidate(date, &[1, 2], &game);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped, 2);
    }
}
