use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{Error, Result, SpeechSynthesizer};
use reqwest::Client;
use url::Url;

use super::split_text;

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com";
const MAX_CHUNK_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TTS_URL.to_string(),
            request_timeout: crate::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Speech from the Google Translate TTS endpoint.
///
/// The endpoint only accepts short inputs, so text is sent in chunks and the
/// returned MP3 streams are concatenated.
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: Url,
}

impl fmt::Debug for GoogleTranslateTts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslateTts")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GoogleTranslateTts {
    pub fn new(config: &TtsConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))?;
        let endpoint = base.join("/translate_tts")?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, endpoint })
    }

    fn chunk_url(&self, chunk: &str, language: &str, idx: usize, total: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("ie", "UTF-8")
            .append_pair("client", "tw-ob")
            .append_pair("tl", language)
            .append_pair("q", chunk)
            .append_pair("idx", &idx.to_string())
            .append_pair("total", &total.to_string())
            .append_pair("textlen", &chunk.chars().count().to_string());
        url
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    fn name(&self) -> &str {
        "Google Translate TTS"
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::Speech("nothing to synthesize".to_string()));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .get(self.chunk_url(chunk, language, idx, chunks.len()))
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Speech(format!(
                    "TTS chunk {}/{} failed with {}",
                    idx + 1,
                    chunks.len(),
                    status
                )));
            }
            audio.extend_from_slice(&response.bytes().await?);
        }

        if audio.is_empty() {
            return Err(Error::Speech("TTS returned no audio".to_string()));
        }
        tracing::debug!("Synthesized {} bytes of {} speech in {} chunks", audio.len(), language, chunks.len());
        Ok(audio)
    }
}
