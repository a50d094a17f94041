use ns_core::{AnnotatedArticle, ResponseSchema, Result, Sentiment};
use serde::Deserialize;

use crate::structured::StructuredClient;

pub const SCHEMA_NAME: &str = "article_annotation";

#[derive(Deserialize)]
struct AnnotationResponse {
    sentiment: Sentiment,
    topics: Vec<String>,
    summary: String,
}

/// Asks the model for the sentiment, topics and summary of one article.
#[derive(Debug, Clone)]
pub struct Annotator {
    client: StructuredClient,
    schema: ResponseSchema,
}

impl Annotator {
    pub fn new(client: StructuredClient) -> Self {
        Self {
            client,
            schema: Self::schema(),
        }
    }

    pub fn schema() -> ResponseSchema {
        let labels: Vec<&str> = Sentiment::ALL.iter().map(Sentiment::as_str).collect();
        ResponseSchema::new(
            SCHEMA_NAME,
            ResponseSchema::object(vec![
                ("title", ResponseSchema::string()),
                ("sentiment", ResponseSchema::string_enum(&labels)),
                ("topics", ResponseSchema::array(ResponseSchema::string())),
                ("summary", ResponseSchema::string()),
            ]),
        )
    }

    /// Never fails: any model, transport or schema problem yields
    /// [`AnnotatedArticle::fallback`] for this article.
    pub async fn annotate(&self, title: &str, description: &str) -> AnnotatedArticle {
        match self.try_annotate(title, description).await {
            Ok(article) => article,
            Err(e) => {
                tracing::warn!("⚠️ Falling back to neutral annotation for {:?}: {}", title, e);
                AnnotatedArticle::fallback(title)
            }
        }
    }

    async fn try_annotate(&self, title: &str, description: &str) -> Result<AnnotatedArticle> {
        let prompt = format!(
            "Analyze the sentiment of the news article below. \
             Classify it as Positive, Negative or Neutral, \
             list the key topics it mentions and summarize it in 2-3 sentences.\n\n\
             Title: {}\nDescription: {}",
            title, description
        );
        let response: AnnotationResponse = self.client.generate(&prompt, &self.schema).await?;

        let topics = response
            .topics
            .into_iter()
            .map(|topic| topic.trim().to_string())
            .filter(|topic| !topic.is_empty())
            .collect();

        Ok(AnnotatedArticle {
            title: title.to_string(),
            sentiment: response.sentiment,
            topics,
            summary: response.summary.trim().to_string(),
        })
    }
}
