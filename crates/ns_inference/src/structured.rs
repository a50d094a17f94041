use std::sync::Arc;

use ns_core::{Error, ResponseSchema, Result, StructuredGenerator};
use serde::de::DeserializeOwned;

/// Prompt + schema in, typed value out.
///
/// The annotator, the aggregator and the narrator all go through this one
/// client so request and parsing logic live in a single place.
#[derive(Debug, Clone)]
pub struct StructuredClient {
    model: Arc<dyn StructuredGenerator>,
}

impl StructuredClient {
    pub fn new(model: Arc<dyn StructuredGenerator>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn generate<T: DeserializeOwned>(&self, prompt: &str, schema: &ResponseSchema) -> Result<T> {
        let raw = self.model.generate(prompt, schema).await?;
        serde_json::from_str(strip_code_fence(&raw)).map_err(|e| {
            Error::Schema(format!(
                "{} response from {} did not match schema: {}",
                schema.name(),
                self.model.name(),
                e
            ))
        })
    }
}

// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
