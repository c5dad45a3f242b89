// src/services/providers/olg.rs

//! Ontario Lottery and Gaming past-results tables.
//!
//! Every table row with a cell that parses as a date is a candidate draw.
//! Numbers come from the remaining cells in document order.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::parse::{ParseOutcome, TextScanner, dedupe_preserving_order, element_text, parse_draw_date};
use super::{PageCollector, PageParser, SourceFetcher};
use crate::error::{AppError, FetchError, Result};
use crate::models::{DrawRecord, GameConfig, GameType, Provider, SourceConfig};

/// Parser for OLG result tables.
#[derive(Debug, Clone)]
pub struct OlgParser {
    rows: Selector,
    cells: Selector,
    scanner: TextScanner,
}

impl OlgParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rows: parse_selector("table tr")?,
            cells: parse_selector("td, th")?,
            scanner: TextScanner::new()?,
        })
    }
}

impl PageParser for OlgParser {
    fn parse(&self, html: &str, game: &GameConfig) -> ParseOutcome {
        let document = Html::parse_document(html);
        let mut outcome = ParseOutcome::default();

        for row in document.select(&self.rows) {
            let cells: Vec<String> = row.select(&self.cells).map(|c| element_text(&c)).collect();

            let Some((date_index, date)) = cells
                .iter()
                .enumerate()
                .find_map(|(i, c)| parse_draw_date(c).map(|d| (i, d)))
            else {
                continue;
            };

            let numbers: Vec<u8> = cells
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date_index)
                .flat_map(|(_, c)| self.scanner.numbers(c, game))
                .collect();

            outcome.push_candidate(date, &dedupe_preserving_order(&numbers), game);
        }

        outcome
    }
}

pub(super) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// OLG adapter.
pub struct OlgFetcher {
    pages: PageCollector,
    source: SourceConfig,
    parser: OlgParser,
}

impl OlgFetcher {
    pub fn new(pages: PageCollector, source: SourceConfig) -> Result<Self> {
        Ok(Self {
            pages,
            source,
            parser: OlgParser::new()?,
        })
    }
}

#[async_trait]
impl SourceFetcher for OlgFetcher {
    fn provider(&self) -> Provider {
        Provider::Olg
    }

    async fn fetch(&self, game: GameType) -> std::result::Result<Vec<DrawRecord>, FetchError> {
        let config = GameConfig::for_game(game);
        self.pages
            .collect(Provider::Olg, self.source.urls_for(game), &config, &self.parser)
            .await
    }
}
