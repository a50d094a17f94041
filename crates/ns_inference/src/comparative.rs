use ns_core::{
    AnnotatedArticle, ComparativeReport, CoverageDifference, Error, ResponseSchema, Result,
    SentimentDistribution, TopicOverlap,
};
use serde::Deserialize;

use crate::structured::StructuredClient;

pub const SCHEMA_NAME: &str = "comparative_analysis";

pub const FALLBACK_ANALYSIS: &str = "Failed to perform comparative analysis.";
pub const NO_COVERAGE_ANALYSIS: &str =
    "No recent news coverage was found, so no overall sentiment could be determined.";

const MAX_COVERAGE_DIFFERENCES: usize = 3;

#[derive(Deserialize)]
struct ComparisonResponse {
    coverage_differences: Vec<CoverageDifference>,
    #[serde(default)]
    topic_overlap: TopicOverlap,
    final_sentiment_analysis: String,
}

/// Renders the annotated articles as the plain-text digest sent to the model.
pub fn summarize_articles(articles: &[AnnotatedArticle]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            format!(
                "Article {}:\nTitle: {}\nSentiment: {}\nTopics: {}\nSummary: {}",
                i + 1,
                article.title,
                article.sentiment,
                article.topics.join(", "),
                article.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the cross-article comparison.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: StructuredClient,
    schema: ResponseSchema,
}

impl Aggregator {
    pub fn new(client: StructuredClient) -> Self {
        Self {
            client,
            schema: Self::schema(),
        }
    }

    pub fn schema() -> ResponseSchema {
        let topics = ResponseSchema::array(ResponseSchema::string());
        ResponseSchema::new(
            SCHEMA_NAME,
            ResponseSchema::object(vec![
                (
                    "coverage_differences",
                    ResponseSchema::array(ResponseSchema::object(vec![
                        ("comparison", ResponseSchema::string()),
                        ("impact", ResponseSchema::string()),
                    ])),
                ),
                (
                    "topic_overlap",
                    ResponseSchema::object(vec![
                        ("common_topics", topics.clone()),
                        ("unique_topics", topics),
                    ]),
                ),
                ("final_sentiment_analysis", ResponseSchema::string()),
            ]),
        )
    }

    /// Never fails. The sentiment distribution and the local topic partition
    /// are always exact; only the narrative fields depend on the model and
    /// fall back to empty values plus [`FALLBACK_ANALYSIS`].
    pub async fn aggregate(&self, articles: &[AnnotatedArticle]) -> ComparativeReport {
        let sentiment_distribution = SentimentDistribution::from_articles(articles);
        let topic_overlap = TopicOverlap::from_articles(articles);

        if articles.is_empty() {
            return ComparativeReport {
                sentiment_distribution,
                coverage_differences: Vec::new(),
                topic_overlap,
                model_topic_overlap: TopicOverlap::default(),
                final_sentiment_analysis: NO_COVERAGE_ANALYSIS.to_string(),
            };
        }

        match self.compare(articles).await {
            Ok(response) => ComparativeReport {
                sentiment_distribution,
                coverage_differences: response.coverage_differences,
                topic_overlap,
                model_topic_overlap: response.topic_overlap,
                final_sentiment_analysis: response.final_sentiment_analysis,
            },
            Err(e) => {
                tracing::warn!("⚠️ Comparative analysis of {} articles failed: {}", articles.len(), e);
                ComparativeReport {
                    sentiment_distribution,
                    coverage_differences: Vec::new(),
                    topic_overlap,
                    model_topic_overlap: TopicOverlap::default(),
                    final_sentiment_analysis: FALLBACK_ANALYSIS.to_string(),
                }
            }
        }
    }

    async fn compare(&self, articles: &[AnnotatedArticle]) -> Result<ComparisonResponse> {
        let prompt = format!(
            "Compare how the following news articles cover the same company.\n\n\
             {}\n\n\
             Give 2-3 meaningful coverage differences, each with the comparison and its \
             likely impact on how the company is perceived. List the topics shared by \
             several articles and the topics unique to one article, and finish with an \
             overall sentiment conclusion and its implications.",
            summarize_articles(articles)
        );

        let mut response: ComparisonResponse = self.client.generate(&prompt, &self.schema).await?;
        let analysis = response.final_sentiment_analysis.trim();
        if analysis.is_empty() {
            return Err(Error::Schema("empty final_sentiment_analysis".to_string()));
        }
        response.final_sentiment_analysis = analysis.to_string();
        response.coverage_differences.truncate(MAX_COVERAGE_DIFFERENCES);
        Ok(response)
    }
}
