use std::fmt;
use std::time::Duration;

pub mod annotator;
pub mod comparative;
pub mod models;
pub mod narrator;
pub mod speech;
pub mod structured;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TARGET_LANGUAGE: &str = "hi";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to talk to the language model, built once at startup
/// and handed to the components that need it.
#[derive(Clone)]
pub struct Config {
    /// Which backend answers structured prompts: `gemini` or `dummy`.
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub request_timeout: Duration,
    /// ISO 639-1 code of the language the audio summary is spoken in.
    pub target_language: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("target_language", &self.target_language)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

pub mod prelude {
    pub use super::annotator::Annotator;
    pub use super::comparative::Aggregator;
    pub use super::models::create_model;
    pub use super::narrator::Narrator;
    pub use super::structured::StructuredClient;
    pub use super::Config;
    pub use ns_core::{AnnotatedArticle, ComparativeReport, Error, Result};
}

pub use annotator::Annotator;
pub use comparative::Aggregator;
pub use models::create_model;
pub use narrator::Narrator;
pub use structured::StructuredClient;
