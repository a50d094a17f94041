use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ns_core::{Error, ResponseSchema, Result, StructuredGenerator};

/// Replays canned responses keyed by schema name.
///
/// Schemas without a script fail with an inference error, which makes it
/// easy to force the fallback path of a single call site.
#[derive(Default)]
pub struct ScriptedModel {
    responses: HashMap<String, String>,
    calls: AtomicUsize,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("scripts", &self.responses.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model whose every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn respond(mut self, schema_name: &str, response: impl Into<String>) -> Self {
        self.responses.insert(schema_name.to_string(), response.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredGenerator for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn generate(&self, _prompt: &str, schema: &ResponseSchema) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(schema.name())
            .cloned()
            .ok_or_else(|| Error::Inference(format!("no scripted response for {}", schema.name())))
    }
}
