// src/services/providers/wclc.rs

//! Western Canada Lottery Corporation print pages.
//!
//! The print view is a flat list of draws without reliable markup, so the
//! page text is split at each month name. A block is a draw when it starts
//! with a full date; the numbers following the date are the main numbers
//! and then the bonus.

use async_trait::async_trait;
use scraper::Html;

use super::parse::{ParseOutcome, TextScanner, normalize_whitespace};
use super::{PageCollector, PageParser, SourceFetcher};
use crate::error::{FetchError, Result};
use crate::models::{DrawRecord, GameConfig, GameType, Provider, SourceConfig};

/// Parser for WCLC print-mode result pages.
#[derive(Debug, Clone)]
pub struct WclcParser {
    scanner: TextScanner,
}

impl WclcParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            scanner: TextScanner::new()?,
        })
    }

    fn page_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        normalize_whitespace(&text)
    }
}

impl PageParser for WclcParser {
    fn parse(&self, html: &str, game: &GameConfig) -> ParseOutcome {
        let text = Self::page_text(html);
        let starts = self.scanner.month_starts(&text);
        let mut outcome = ParseOutcome::default();

        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let block = &text[start..end];

            // Only a block opening with a full date is a draw.
            let Some((range, date)) = self.scanner.find_date(block) else {
                continue;
            };
            if range.start != 0 {
                continue;
            }

            let numbers = self.scanner.numbers(&block[range.end..], game);
            outcome.push_candidate(date, &numbers, game);
        }

        outcome
    }
}

/// WCLC adapter.
pub struct WclcFetcher {
    pages: PageCollector,
    source: SourceConfig,
    parser: WclcParser,
}

impl WclcFetcher {
    pub fn new(pages: PageCollector, source: SourceConfig) -> Result<Self> {
        Ok(Self {
            pages,
            source,
            parser: WclcParser::new()?,
        })
    }
}

#[async_trait]
impl SourceFetcher for WclcFetcher {
    fn provider(&self) -> Provider {
        Provider::Wclc
    }

    async fn fetch(&self, game: GameType) -> std::result::Result<Vec<DrawRecord>, FetchError> {
        let config = GameConfig::for_game(game);
        self.pages
            .collect(Provider::Wclc, self.source.urls_for(game), &config, &self.parser)
            .await
    }
}
