use super::synthesizer::Synthesizer;
use crate::domain::audio::AudioFormat;
use crate::domain::conversion::{CatalogVoice, LanguageCode, VoiceSpec};
use async_trait::async_trait;
use quick_xml::escape::escape;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 billed characters per request
const MAX_CHUNK_CHARS: usize = 3000;

const VOICES: &[CatalogVoice] = &[
    CatalogVoice::new("Joanna", LanguageCode::English),
    CatalogVoice::new("Matthew", LanguageCode::English),
    CatalogVoice::new("Amy", LanguageCode::English),
    CatalogVoice::new("Lupe", LanguageCode::Spanish),
    CatalogVoice::new("Lucia", LanguageCode::Spanish),
    CatalogVoice::new("Conchita", LanguageCode::Spanish),
    CatalogVoice::new("Lea", LanguageCode::French),
    CatalogVoice::new("Celine", LanguageCode::French),
    CatalogVoice::new("Vicki", LanguageCode::German),
    CatalogVoice::new("Hans", LanguageCode::German),
    CatalogVoice::new("Bianca", LanguageCode::Italian),
    CatalogVoice::new("Carla", LanguageCode::Italian),
    CatalogVoice::new("Camila", LanguageCode::Portuguese),
    CatalogVoice::new("Vitoria", LanguageCode::Portuguese),
    CatalogVoice::new("Ricardo", LanguageCode::Portuguese),
    CatalogVoice::new("Ines", LanguageCode::Portuguese),
];

/// Voices available on the neural engine; the rest only exist as standard voices
const NEURAL_VOICES: &[&str] = &[
    "Joanna", "Matthew", "Amy", "Lupe", "Lucia", "Lea", "Vicki", "Bianca", "Camila", "Vitoria",
    "Ines",
];

/// AWS Polly implementation of the synthesizer
pub struct PollySynthesizer {
    polly_client: Arc<PollyClient>,
}

impl PollySynthesizer {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    fn engine_for(voice: &str) -> Engine {
        if NEURAL_VOICES.contains(&voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }

    /// Wrap text in SSML so the speed multiplier becomes a prosody rate
    fn to_ssml(text: &str, speed: f32) -> String {
        let rate = (speed * 100.0).round() as u32;
        format!(
            "<speak><prosody rate=\"{}%\">{}</prosody></speak>",
            rate,
            escape(text)
        )
    }
}

#[async_trait]
impl Synthesizer for PollySynthesizer {
    fn name(&self) -> &'static str {
        "polly"
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
        let engine = Self::engine_for(&voice.voice);
        let voice_id = VoiceId::from(voice.voice.as_str());

        tracing::debug!(
            voice = %voice.voice,
            engine = ?engine,
            speed = voice.speed,
            text_length = text.chars().count(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(Self::to_ssml(text, voice.speed))
            .text_type(TextType::Ssml)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice = %voice.voice,
                    engine = ?engine,
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        let audio_stream = result
            .audio_stream
            .collect()
            .await
            .map_err(|e| format!("Failed to read audio stream: {}", e))?;
        let audio_bytes = audio_stream.into_bytes().to_vec();

        tracing::debug!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "Chunk synthesized"
        );

        Ok(audio_bytes)
    }
}
