use std::sync::Arc;

use futures::future::join_all;
use ns_core::{AnalysisReport, AnnotatedArticle, Error, NewsSource, RawArticle, Result};
use ns_inference::{Aggregator, Annotator, Narrator};
use tokio::sync::Semaphore;
use tracing::info;

pub const DEFAULT_ARTICLE_LIMIT: usize = 10;
pub const MAX_ARTICLE_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// How many annotation calls may be in flight at once.
    pub max_concurrent_annotations: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_annotations: 4,
        }
    }
}

/// Runs one analysis request end to end:
/// fetch → annotate each article → compare → narrate → assemble.
pub struct AnalysisManager {
    source: Arc<dyn NewsSource>,
    annotator: Annotator,
    aggregator: Aggregator,
    narrator: Option<Narrator>,
    semaphore: Semaphore,
}

impl AnalysisManager {
    pub fn new(
        source: Arc<dyn NewsSource>,
        annotator: Annotator,
        aggregator: Aggregator,
        narrator: Option<Narrator>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            source,
            annotator,
            aggregator,
            narrator,
            semaphore: Semaphore::new(config.max_concurrent_annotations.max(1)),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Only a transport failure while fetching articles is returned as an
    /// error; every later stage degrades to its fallback value instead.
    #[tracing::instrument(skip(self))]
    pub async fn analyze(&self, company: &str, limit: usize) -> Result<AnalysisReport> {
        let company = company.trim();
        if company.is_empty() {
            return Err(Error::InvalidInput("company name must not be empty".to_string()));
        }
        if limit == 0 || limit > MAX_ARTICLE_LIMIT {
            return Err(Error::InvalidInput(format!(
                "article limit must be between 1 and {}",
                MAX_ARTICLE_LIMIT
            )));
        }

        info!("🦗 Fetching up to {} articles from {}", limit, self.source.name());
        let mut raw = self.source.fetch(company, limit).await?;
        raw.truncate(limit);

        info!("🤖 Annotating {} articles", raw.len());
        let articles = self.annotate_all(&raw).await;

        info!("📊 Comparing coverage");
        let comparative = self.aggregator.aggregate(&articles).await;

        let audio = match &self.narrator {
            Some(narrator) => {
                info!("🔊 Narrating summary in {}", narrator.language());
                Some(narrator.narrate(company, &comparative.final_sentiment_analysis).await)
            }
            None => None,
        };

        info!("✅ Analysis completed");
        Ok(AnalysisReport::assemble(company, articles, comparative, audio.as_ref()))
    }

    // join_all yields results in input order regardless of completion order.
    async fn annotate_all(&self, raw: &[RawArticle]) -> Vec<AnnotatedArticle> {
        let total = raw.len();
        let futures = raw.iter().enumerate().map(|(i, article)| async move {
            let _permit = self.semaphore.acquire().await.ok();
            tracing::debug!("📝 Annotating article {}/{}: {}", i + 1, total, article.title);
            self.annotator.annotate(&article.title, &article.description).await
        });
        join_all(futures).await
    }
}
