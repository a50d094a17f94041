use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::Result;

/// A JSON response schema in the OpenAPI subset understood by
/// schema-constrained generation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSchema {
    #[serde(skip)]
    name: String,
    #[serde(flatten)]
    schema: Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_value(&self) -> &Value {
        &self.schema
    }

    pub fn string() -> Value {
        json!({ "type": "STRING" })
    }

    pub fn string_enum(values: &[&str]) -> Value {
        json!({ "type": "STRING", "enum": values })
    }

    pub fn array(items: Value) -> Value {
        json!({ "type": "ARRAY", "items": items })
    }

    /// An object whose listed properties are all required, in order.
    pub fn object(properties: Vec<(&str, Value)>) -> Value {
        let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
        let mut props = Map::new();
        for (name, schema) in properties {
            props.insert(name.to_string(), schema);
        }
        json!({
            "type": "OBJECT",
            "properties": props,
            "required": required,
            "propertyOrdering": required,
        })
    }
}

#[async_trait]
pub trait StructuredGenerator: Send + Sync + fmt::Debug {
    /// Name of the backing model for logs
    fn name(&self) -> &str;

    /// Runs `prompt` and returns the raw JSON text the model produced under `schema`.
    async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> Result<String>;
}
