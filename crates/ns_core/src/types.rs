use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";

pub const FALLBACK_TOPIC: &str = "Error";
pub const FALLBACK_SUMMARY: &str = "Failed to analyze sentiment";

/// A (title, description) pair as found on the source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
}

impl RawArticle {
    /// Builds an article, substituting placeholders for blank text.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let title = title.into();
        let description = description.into();
        Self {
            title: non_blank_or(title, NO_TITLE),
            description: non_blank_or(description, NO_DESCRIPTION),
        }
    }
}

fn non_blank_or(text: String, placeholder: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else if trimmed.len() == text.len() {
        text
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Sentiment::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Schema(format!("unknown sentiment label: {:?}", s)))
    }
}

// Labels outside the closed set are rejected rather than mapped, so callers
// decide the fallback.
impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedArticle {
    pub title: String,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub summary: String,
}

impl AnnotatedArticle {
    /// The annotation used when the model could not analyze an article.
    pub fn fallback(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sentiment: Sentiment::Neutral,
            topics: vec![FALLBACK_TOPIC.to_string()],
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn from_articles(articles: &[AnnotatedArticle]) -> Self {
        let mut distribution = Self::default();
        for article in articles {
            distribution.record(article.sentiment);
        }
        distribution
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDifference {
    pub comparison: String,
    pub impact: String,
}

/// Topics shared by several articles versus topics seen in only one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicOverlap {
    #[serde(default)]
    pub common_topics: BTreeSet<String>,
    #[serde(default, alias = "unique_topics_in_each_article")]
    pub unique_topics: BTreeSet<String>,
}

impl TopicOverlap {
    /// Partitions topics by the number of distinct articles mentioning them.
    /// Repeats inside a single article's list count once.
    pub fn from_articles(articles: &[AnnotatedArticle]) -> Self {
        let mut article_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for article in articles {
            let distinct: BTreeSet<&str> = article
                .topics
                .iter()
                .map(|topic| topic.trim())
                .filter(|topic| !topic.is_empty())
                .collect();
            for topic in distinct {
                *article_counts.entry(topic).or_insert(0) += 1;
            }
        }

        let mut overlap = Self::default();
        for (topic, count) in article_counts {
            if count >= 2 {
                overlap.common_topics.insert(topic.to_string());
            } else {
                overlap.unique_topics.insert(topic.to_string());
            }
        }
        overlap
    }

    pub fn is_empty(&self) -> bool {
        self.common_topics.is_empty() && self.unique_topics.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeReport {
    pub sentiment_distribution: SentimentDistribution,
    pub coverage_differences: Vec<CoverageDifference>,
    /// Computed locally from the annotated articles.
    pub topic_overlap: TopicOverlap,
    /// The model's own reading of the overlap. Advisory only.
    pub model_topic_overlap: TopicOverlap,
    pub final_sentiment_analysis: String,
}

impl ComparativeReport {
    /// Splits off the final verdict, which the top-level report carries on its own.
    pub fn into_parts(self) -> (ComparativeScore, String) {
        let score = ComparativeScore {
            sentiment_distribution: self.sentiment_distribution,
            coverage_differences: self.coverage_differences,
            topic_overlap: self.topic_overlap,
            model_topic_overlap: self.model_topic_overlap,
        };
        (score, self.final_sentiment_analysis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeScore {
    pub sentiment_distribution: SentimentDistribution,
    pub coverage_differences: Vec<CoverageDifference>,
    pub topic_overlap: TopicOverlap,
    pub model_topic_overlap: TopicOverlap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub file_path: PathBuf,
}

impl AudioArtifact {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles")]
    pub articles: Vec<AnnotatedArticle>,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative: ComparativeScore,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment_analysis: String,
    pub audio_path: Option<String>,
}

impl AnalysisReport {
    pub fn assemble(
        company: impl Into<String>,
        articles: Vec<AnnotatedArticle>,
        comparative: ComparativeReport,
        audio: Option<&AudioArtifact>,
    ) -> Self {
        let (comparative, final_sentiment_analysis) = comparative.into_parts();
        Self {
            company: company.into(),
            articles,
            comparative,
            final_sentiment_analysis,
            audio_path: audio.map(|artifact| artifact.path().to_string_lossy().into_owned()),
        }
    }
}
