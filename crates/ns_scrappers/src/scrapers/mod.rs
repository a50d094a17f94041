use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{Error, NewsSource, RawArticle, Result};
use serde::{Deserialize, Serialize};

pub mod google_news;

pub use google_news::GoogleNewsSource;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub search_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            search_url: google_news::DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Builds the news source registered under `name`.
pub fn create_source(name: &str, config: &SourceConfig) -> Result<Arc<dyn NewsSource>> {
    match name.to_lowercase().as_str() {
        "google" | "google-news" => Ok(Arc::new(GoogleNewsSource::new(config)?)),
        other => Err(Error::Config(format!(
            "Unknown news source: {}. Available sources: google-news",
            other
        ))),
    }
}

/// A source serving a fixed list of articles, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    articles: Vec<RawArticle>,
}

impl FixedSource {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl NewsSource for FixedSource {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn fetch(&self, _company: &str, limit: usize) -> Result<Vec<RawArticle>> {
        Ok(self.articles.iter().take(limit).cloned().collect())
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use scraper::{ElementRef, Html, Selector};

    /// Visible text of an element with whitespace runs collapsed.
    pub fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn extract_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
        let selector = Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector: {}", e)))?;

        Ok(document.select(&selector).map(element_text).collect())
    }
}
