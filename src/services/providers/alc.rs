// src/services/providers/alc.rs

//! Atlantic Lottery winning-number pages.
//!
//! Markup varies between the game pages, so any element matched by the
//! block selector is a candidate: it must contain a date somewhere, and the
//! numbers are read from the remaining text.

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::olg::parse_selector;
use super::parse::{ParseOutcome, TextScanner, dedupe_preserving_order, element_text};
use super::{PageCollector, PageParser, SourceFetcher};
use crate::error::{FetchError, Result};
use crate::models::{DrawRecord, GameConfig, GameType, Provider, SourceConfig};

pub const DEFAULT_BLOCK_SELECTOR: &str = "table tr, li, .winning-numbers, .game-result";

/// Parser for ALC result blocks.
#[derive(Debug, Clone)]
pub struct AlcParser {
    blocks: Selector,
    scanner: TextScanner,
}

impl AlcParser {
    pub fn new() -> Result<Self> {
        Self::with_selector(DEFAULT_BLOCK_SELECTOR)
    }

    pub fn with_selector(selector: &str) -> Result<Self> {
        Ok(Self {
            blocks: parse_selector(selector)?,
            scanner: TextScanner::new()?,
        })
    }
}

impl PageParser for AlcParser {
    fn parse(&self, html: &str, game: &GameConfig) -> ParseOutcome {
        let document = Html::parse_document(html);
        let mut outcome = ParseOutcome::default();

        for block in document.select(&self.blocks) {
            let text = element_text(&block);
            let Some((range, date)) = self.scanner.find_date(&text) else {
                continue;
            };

            let mut numbers = self.scanner.numbers(&text[..range.start], game);
            numbers.extend(self.scanner.numbers(&text[range.end..], game));
            outcome.push_candidate(date, &dedupe_preserving_order(&numbers), game);
        }

        outcome
    }
}

/// ALC adapter.
pub struct AlcFetcher {
    pages: PageCollector,
    source: SourceConfig,
    parser: AlcParser,
}

impl AlcFetcher {
    pub fn new(pages: PageCollector, source: SourceConfig) -> Result<Self> {
        let parser = match source.block_selector.as_deref() {
            Some(selector) => AlcParser::with_selector(selector)?,
            None => AlcParser::new()?,
        };
        Ok(Self {
            pages,
            source,
            parser,
        })
    }
}

#[async_trait]
impl SourceFetcher for AlcFetcher {
    fn provider(&self) -> Provider {
        Provider::Alc
    }

    async fn fetch(&self, game: GameType) -> std::result::Result<Vec<DrawRecord>, FetchError> {
        let config = GameConfig::for_game(game);
        self.pages
            .collect(Provider::Alc, self.source.urls_for(game), &config, &self.parser)
            .await
    }
}
