use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// File extension of the produced audio, without the dot.
    fn extension(&self) -> &str {
        "mp3"
    }

    /// Synthesizes `text` spoken in `language` (an ISO 639-1 code).
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}
