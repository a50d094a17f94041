use std::sync::Arc;

use ns_core::{AudioArtifact, Error, ResponseSchema, Result, SpeechSynthesizer};
use ns_storage::{AudioStore, AUDIO_EXTENSION};
use serde::Deserialize;

use crate::speech::silence::{silent_mp3, DEFAULT_FRAMES};
use crate::structured::StructuredClient;

pub const SCHEMA_NAME: &str = "translation";

const ENGLISH: &str = "en";

/// The sentence spoken when the summary itself cannot be narrated, with the
/// language it is written in. Unsupported languages get the English one.
pub fn apology_for(language: &str) -> (&'static str, &'static str) {
    match language {
        "hi" => ("hi", "माफ़ करें, हम आपके अनुरोध को प्रोसेस नहीं कर सके।"),
        "es" => ("es", "Lo sentimos, no pudimos procesar su solicitud."),
        "fr" => ("fr", "Désolé, nous n'avons pas pu traiter votre demande."),
        "de" => ("de", "Entschuldigung, wir konnten Ihre Anfrage nicht bearbeiten."),
        _ => (ENGLISH, "Sorry, we could not process your request."),
    }
}

/// Reduces a language tag to its lowercase primary subtag: `EN-us` → `en`.
pub fn normalize_language(tag: &str) -> String {
    let tag = tag.trim();
    let primary = tag.split(['-', '_']).next().unwrap_or(tag);
    if primary.is_empty() {
        ENGLISH.to_string()
    } else {
        primary.to_lowercase()
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "hi" => "Hindi",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "en" => "English",
        other => other,
    }
}

#[derive(Deserialize)]
struct TranslationResponse {
    #[allow(dead_code)]
    original: String,
    translated: String,
}

/// Turns the final verdict into a spoken audio file.
pub struct Narrator {
    client: StructuredClient,
    speech: Arc<dyn SpeechSynthesizer>,
    store: AudioStore,
    language: String,
    schema: ResponseSchema,
}

impl Narrator {
    pub fn new(
        client: StructuredClient,
        speech: Arc<dyn SpeechSynthesizer>,
        store: AudioStore,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            speech,
            store,
            language: normalize_language(&language.into()),
            schema: Self::schema(),
        }
    }

    pub fn schema() -> ResponseSchema {
        ResponseSchema::new(
            SCHEMA_NAME,
            ResponseSchema::object(vec![
                ("original", ResponseSchema::string()),
                ("translated", ResponseSchema::string()),
            ]),
        )
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Never fails. If translation or synthesis fails the apology sentence
    /// is spoken instead, and if that fails too a short silent clip is
    /// written, so a playable file sits at the returned path whenever the
    /// audio directory is writable.
    pub async fn narrate(&self, company: &str, text: &str) -> AudioArtifact {
        match self.try_narrate(company, text).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!("⚠️ Narration for {} failed, speaking apology instead: {}", company, e);
                self.narrate_apology(company).await
            }
        }
    }

    async fn try_narrate(&self, company: &str, text: &str) -> Result<AudioArtifact> {
        let spoken = self.translate(text).await?;
        let audio = self.speech.synthesize(&spoken, &self.language).await?;
        self.store.write(company, self.speech.extension(), &audio).await
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if self.language == ENGLISH {
            return Ok(text.to_string());
        }
        let prompt = format!(
            "Translate the following English text to {}. \
             Put the source text in `original` and only the translation, \
             without any explanation, in `translated`.\n\n{}",
            language_name(&self.language),
            text
        );
        let response: TranslationResponse = self.client.generate(&prompt, &self.schema).await?;
        let translated = response.translated.trim();
        if translated.is_empty() {
            return Err(Error::Schema("empty translation".to_string()));
        }
        Ok(translated.to_string())
    }

    async fn narrate_apology(&self, company: &str) -> AudioArtifact {
        let (voice, apology) = apology_for(&self.language);
        let result = match self.speech.synthesize(apology, voice).await {
            Ok(audio) => self.store.write(company, self.speech.extension(), &audio).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!("⚠️ Could not synthesize apology for {}, writing silence: {}", company, e);
                self.write_silence(company).await
            }
        }
    }

    async fn write_silence(&self, company: &str) -> AudioArtifact {
        match self.store.write(company, AUDIO_EXTENSION, &silent_mp3(DEFAULT_FRAMES)).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!("❌ Audio directory {} is not writable: {}", self.store.dir().display(), e);
                AudioArtifact::new(self.store.path_for(company, AUDIO_EXTENSION))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScriptedModel;
    use async_trait::async_trait;
    use ns_storage::AudioConfig;
    use std::sync::Mutex;

    /// Records what it was asked to say and returns it as bytes.
    #[derive(Default)]
    struct EchoSpeech {
        spoken: Mutex<Vec<String>>,
        voices: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for EchoSpeech {
        fn name(&self) -> &str {
            "Echo"
        }

        async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
            if self.fail {
                return Err(Error::Speech("engine down".to_string()));
            }
            self.spoken.lock().unwrap().push(text.to_string());
            self.voices.lock().unwrap().push(language.to_string());
            Ok(text.as_bytes().to_vec())
        }
    }

    fn narrator(
        model: ScriptedModel,
        speech: Arc<EchoSpeech>,
        dir: &std::path::Path,
        language: &str,
    ) -> Narrator {
        Narrator::new(
            StructuredClient::new(Arc::new(model)),
            speech,
            AudioStore::new(AudioConfig::new(dir)),
            language,
        )
    }

    #[tokio::test]
    async fn test_narrate_translated_text() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech::default());
        let model = ScriptedModel::new().respond(
            SCHEMA_NAME,
            r#"{"original": "Mostly positive.", "translated": "ज़्यादातर सकारात्मक।"}"#,
        );
        let artifact = narrator(model, speech.clone(), dir.path(), "hi")
            .narrate("Acme", "Mostly positive.")
            .await;

        assert_eq!(artifact.path(), dir.path().join("Acme.mp3"));
        assert_eq!(std::fs::read_to_string(artifact.path()).unwrap(), "ज़्यादातर सकारात्मक।");
    }

    #[tokio::test]
    async fn test_narrate_speaks_apology_when_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech::default());
        let artifact = narrator(ScriptedModel::failing(), speech.clone(), dir.path(), "hi")
            .narrate("Acme", "Mostly positive.")
            .await;

        let metadata = std::fs::metadata(artifact.path()).unwrap();
        assert!(metadata.len() > 0);
        assert_eq!(*speech.spoken.lock().unwrap(), vec![apology_for("hi").1.to_string()]);
        assert_eq!(*speech.voices.lock().unwrap(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_narrate_writes_silence_when_everything_fails() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech { fail: true, ..EchoSpeech::default() });
        let artifact = narrator(ScriptedModel::failing(), speech, dir.path(), "hi")
            .narrate("../Acme", "Mostly positive.")
            .await;

        assert_eq!(artifact.path(), dir.path().join("Acme.mp3"));
        let audio = std::fs::read(artifact.path()).unwrap();
        assert_eq!(audio, silent_mp3(DEFAULT_FRAMES));
    }

    #[tokio::test]
    async fn test_narrate_english_skips_translation() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech::default());
        let model = Arc::new(ScriptedModel::failing());
        let narrator = Narrator::new(
            StructuredClient::new(model.clone()),
            speech.clone(),
            AudioStore::new(AudioConfig::new(dir.path())),
            "en",
        );

        narrator.narrate("Acme", "Mostly positive.").await;
        assert_eq!(model.calls(), 0);
        assert_eq!(*speech.spoken.lock().unwrap(), vec!["Mostly positive.".to_string()]);
    }

    #[tokio::test]
    async fn test_language_tag_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech::default());
        let model = Arc::new(ScriptedModel::failing());
        let narrator = Narrator::new(
            StructuredClient::new(model.clone()),
            speech.clone(),
            AudioStore::new(AudioConfig::new(dir.path())),
            " EN-us ",
        );
        assert_eq!(narrator.language(), "en");

        narrator.narrate("Acme", "Mostly positive.").await;
        assert_eq!(model.calls(), 0);
        assert_eq!(*speech.voices.lock().unwrap(), vec!["en".to_string()]);
    }

    #[tokio::test]
    async fn test_unsupported_language_apologizes_in_english_voice() {
        let dir = tempfile::tempdir().unwrap();
        let speech = Arc::new(EchoSpeech::default());
        narrator(ScriptedModel::failing(), speech.clone(), dir.path(), "ja")
            .narrate("Acme", "Mostly positive.")
            .await;

        assert_eq!(*speech.spoken.lock().unwrap(), vec![apology_for("en").1.to_string()]);
        assert_eq!(*speech.voices.lock().unwrap(), vec!["en".to_string()]);
    }

    #[test]
    fn test_apology_defaults_to_english() {
        assert_eq!(apology_for("xx"), apology_for("en"));
        assert_eq!(apology_for("xx").0, "en");
        assert_ne!(apology_for("hi"), apology_for("en"));
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("hi"), "hi");
        assert_eq!(normalize_language("EN"), "en");
        assert_eq!(normalize_language("pt_BR"), "pt");
        assert_eq!(normalize_language("  "), "en");
    }
}
