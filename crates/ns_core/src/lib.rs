pub mod error;
pub mod models;
pub mod source;
pub mod speech;
pub mod types;

pub use error::{Error, Result};
pub use models::{ResponseSchema, StructuredGenerator};
pub use source::NewsSource;
pub use speech::SpeechSynthesizer;
pub use types::{
    AnalysisReport, AnnotatedArticle, AudioArtifact, ComparativeReport, ComparativeScore,
    CoverageDifference, RawArticle, Sentiment, SentimentDistribution, TopicOverlap,
};
