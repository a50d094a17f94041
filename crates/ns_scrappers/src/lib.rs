pub mod manager;
pub mod scrapers;

pub use manager::{AnalysisManager, ManagerConfig, DEFAULT_ARTICLE_LIMIT, MAX_ARTICLE_LIMIT};
pub use scrapers::{create_source, FixedSource, GoogleNewsSource, SourceConfig};

pub mod prelude {
    pub use super::manager::AnalysisManager;
    pub use super::scrapers::create_source;
    pub use ns_core::{AnalysisReport, Error, NewsSource, Result};
}
