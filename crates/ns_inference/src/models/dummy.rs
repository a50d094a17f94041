use std::fmt;

use async_trait::async_trait;
use ns_core::{ResponseSchema, Result, StructuredGenerator};
use serde_json::{Map, Value};

const PLACEHOLDER: &str = "placeholder";

/// Offline model that answers every prompt with a schema-valid placeholder.
///
/// Enum choices are picked from the prompt length so different articles get
/// different labels, deterministically.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder_for(schema: &Value, seed: usize) -> Value {
    match schema.get("type").and_then(Value::as_str).unwrap_or("STRING") {
        "OBJECT" => {
            let mut object = Map::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, property) in properties {
                    object.insert(name.clone(), placeholder_for(property, seed));
                }
            }
            Value::Object(object)
        }
        "ARRAY" => {
            let item = schema
                .get("items")
                .map(|items| placeholder_for(items, seed))
                .unwrap_or(Value::Null);
            Value::Array(vec![item])
        }
        "INTEGER" | "NUMBER" => Value::from(0),
        "BOOLEAN" => Value::Bool(false),
        _ => match schema.get("enum").and_then(Value::as_array) {
            Some(choices) if !choices.is_empty() => choices[seed % choices.len()].clone(),
            _ => Value::String(PLACEHOLDER.to_string()),
        },
    }
}

#[async_trait]
impl StructuredGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        let value = placeholder_for(schema.as_value(), prompt.len());
        Ok(serde_json::to_string(&value)?)
    }
}
