use super::synthesizer::Synthesizer;
use crate::domain::audio::AudioFormat;
use crate::domain::conversion::{CatalogVoice, LanguageCode, VoiceSpec};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_CHUNK_CHARS: usize = 4096;

/// OpenAI voices are multilingual; the per-language order only decides defaults
const VOICES: &[CatalogVoice] = &[
    CatalogVoice::new("alloy", LanguageCode::English),
    CatalogVoice::new("echo", LanguageCode::Spanish),
    CatalogVoice::new("nova", LanguageCode::French),
    CatalogVoice::new("onyx", LanguageCode::German),
    CatalogVoice::new("fable", LanguageCode::Italian),
    CatalogVoice::new("shimmer", LanguageCode::Portuguese),
];

/// OpenAI TTS implementation of the synthesizer
pub struct OpenAiSynthesizer {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSynthesizer {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn voice(id: &str) -> Voice {
        match id.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }

    /// OpenAI accepts speeds between 0.25 and 4.0
    fn speed(speed: f32) -> f32 {
        speed.clamp(0.25, 4.0)
    }
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn max_chunk_chars(&self) -> usize {
        MAX_CHUNK_CHARS
    }

    fn voices(&self) -> &'static [CatalogVoice] {
        VOICES
    }

    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            model = %self.model,
            voice = %voice.voice,
            speed = voice.speed,
            text_length = text.chars().count(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: Self::voice(&voice.voice),
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: Some(Self::speed(voice.speed)),
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %voice.voice,
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::debug!(
            provider = "openai",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "Chunk synthesized"
        );

        Ok(audio_bytes)
    }
}
