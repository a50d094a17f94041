use std::sync::Arc;

use ns_core::{Error, Result, StructuredGenerator};

use crate::Config;

pub mod dummy;
pub mod gemini;
#[cfg(test)]
pub(crate) mod scripted;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
#[cfg(test)]
pub(crate) use scripted::ScriptedModel;

/// Builds the structured-generation backend named by `config.provider`.
pub fn create_model(config: &Config) -> Result<Arc<dyn StructuredGenerator>> {
    match config.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown model provider: {}. Available providers: gemini, dummy",
            other
        ))),
    }
}
