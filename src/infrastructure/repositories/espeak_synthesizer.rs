use super::synthesizer::Synthesizer;
use crate::domain::audio::AudioFormat;
use crate::domain::conversion::{CatalogVoice, LanguageCode, VoiceSpec};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// eSpeak reads arbitrarily long input, but long calls block a worker for a while
const MAX_CHUNK_CHARS: usize = 4900;

/// Words per minute at speed 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

const VOICES: &[CatalogVoice] = &[
    CatalogVoice::new("en-us", LanguageCode::English),
    CatalogVoice::new("en", LanguageCode::English),
    CatalogVoice::new("es", LanguageCode::Spanish),
    CatalogVoice::new("es-419", LanguageCode::Spanish),
    CatalogVoice::new("fr", LanguageCode::French),
    CatalogVoice::new("de", LanguageCode::German),
    CatalogVoice::new("it", LanguageCode::Italian),
    CatalogVoice::new("pt-br", LanguageCode::Portuguese),
    CatalogVoice::new("pt", LanguageCode::Portuguese),
];

/// Local eSpeak NG engine, invoked as a child process per chunk
pub struct EspeakSynthesizer {
    binary: String,
}

impl EspeakSynthesizer {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }

    fn words_per_minute(speed: f32) -> u32 {
        (BASE_WORDS_PER_MINUTE * speed).round() as u32
    }
}

#[async_trait]
impl Synthesizer for EspeakSynthesizer {
    fn name(&self) -> &'static str {
        "espeak"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn max_chunk_chars(&self) -> usize {
        MAX_CHUNK_CHARS
    }

    fn voices(&self) -> &'static [CatalogVoice] {
        VOICES
    }

    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        // eSpeak cannot patch the WAV header when writing to a pipe, so it
        // writes to a file instead
        let output = tempfile::Builder::new()
            .prefix("espeak_")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| format!("Failed to create eSpeak output file: {}", e))?;

        let mut child = Command::new(&self.binary)
            .arg("-v")
            .arg(&voice.voice)
            .arg("-s")
            .arg(Self::words_per_minute(voice.speed).to_string())
            .arg("-w")
            .arg(output.path())
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("Failed to spawn {}: {}", self.binary, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| format!("Failed to write text to eSpeak: {}", e))?;
        }

        let result = child
            .wait_with_output()
            .await
            .map_err(|e| format!("eSpeak process failed: {}", e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                status = %result.status,
                stderr = %stderr.trim(),
                voice = %voice.voice,
                "eSpeak exited with failure"
            );
            return Err(format!("eSpeak exited with {}: {}", result.status, stderr.trim()));
        }

        let audio_bytes = tokio::fs::read(output.path())
            .await
            .map_err(|e| format!("Failed to read eSpeak output: {}", e))?;

        tracing::debug!(
            provider = "espeak",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "Chunk synthesized"
        );

        Ok(audio_bytes)
    }
}
