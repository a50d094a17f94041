use async_trait::async_trait;
use ns_core::{NewsSource, RawArticle, Result};
use reqwest::{header, Client};
use scraper::Html;
use url::Url;

use super::{utils, SourceConfig};

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

// Result cards carry no semantic markup; these class lists were read off the
// rendered page and break whenever Google reshuffles it.
const TITLE_SELECTOR: &str = "div.n0jPhd.ynAwRc.MBeuO.nDgy9d";
const DESCRIPTION_SELECTOR: &str = "div.GI74Re.nDgy9d";

/// Pairs the i-th title with the i-th description on a Google News results
/// page, keeping at most `limit` pairs.
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<RawArticle>> {
    let document = Html::parse_document(html);
    let titles = utils::extract_texts(&document, TITLE_SELECTOR)?;
    let descriptions = utils::extract_texts(&document, DESCRIPTION_SELECTOR)?;

    Ok(titles
        .into_iter()
        .zip(descriptions)
        .take(limit)
        .map(|(title, description)| RawArticle::new(title, description))
        .collect())
}

#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    search_url: Url,
    user_agent: String,
}

impl GoogleNewsSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            search_url: Url::parse(&config.search_url)?,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn search_url(&self, company: &str) -> Url {
        let query = format!("{} news", company.trim());
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("tbm", "nws");
        url
    }
}

#[async_trait]
impl NewsSource for GoogleNewsSource {
    fn name(&self) -> &str {
        "Google News"
    }

    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>> {
        let response = self
            .client
            .get(self.search_url(company))
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("❌ Google News search for {} failed with {}", company, status);
            return Ok(Vec::new());
        }

        let html = response.text().await?;
        let articles = parse_results(&html, limit)?;
        tracing::info!("📰 Found {} articles about {}", articles.len(), company);
        Ok(articles)
    }
}
