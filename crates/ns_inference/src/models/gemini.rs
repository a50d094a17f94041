use std::fmt;

use async_trait::async_trait;
use ns_core::{Error, ResponseSchema, Result, StructuredGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::Config;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a ResponseSchema,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Google Gemini through the `generateContent` endpoint with a JSON
/// response schema.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("Gemini API key is required".to_string()))?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model_name: config.model_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl StructuredGenerator for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        tracing::debug!("Requesting {} from {}", schema.name(), self.model_name);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Gemini returned {} for {}: {}",
                status,
                schema.name(),
                body.trim()
            )));
        }

        let response = response.json::<GenerateResponse>().await?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("Gemini returned no candidates".to_string()))?;

        candidate
            .content
            .into_iter()
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .ok_or_else(|| {
                Error::Inference(format!(
                    "Gemini candidate had no text (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::{HeaderMap, StatusCode}, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base_url: String) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            base_url,
            ..Config::default()
        }
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(&Config::default());
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Configuration error: Gemini API key is required"
        );

        let result = GeminiModel::new(&Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        });
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_reads_text() {
        let app = Router::new().route(
            "/models/:call",
            post(|Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(call, "gemini-2.0-flash:generateContent");
                assert_eq!(headers["x-goog-api-key"], "test-key");
                assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
                assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
                assert!(body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap()
                    .contains("hello"));
                Json(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "{\"translated\": \"namaste\"}"}]},
                        "finishReason": "STOP"
                    }]
                }))
            }),
        );
        let model = GeminiModel::new(&config(serve(app).await)).unwrap();
        let schema = ResponseSchema::new(
            "translation",
            ResponseSchema::object(vec![("translated", ResponseSchema::string())]),
        );

        let text = model.generate("say hello", &schema).await.unwrap();
        assert_eq!(text, "{\"translated\": \"namaste\"}");
    }

    #[tokio::test]
    async fn test_generate_reports_http_errors() {
        let app = Router::new().route(
            "/models/:call",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let model = GeminiModel::new(&config(serve(app).await)).unwrap();
        let schema = ResponseSchema::new("translation", ResponseSchema::string());

        let err = model.generate("prompt", &schema).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_generate_without_candidates() {
        let app = Router::new().route(
            "/models/:call",
            post(|| async { Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})) }),
        );
        let model = GeminiModel::new(&config(serve(app).await)).unwrap();
        let schema = ResponseSchema::new("translation", ResponseSchema::string());

        assert!(model.generate("prompt", &schema).await.is_err());
    }
}
