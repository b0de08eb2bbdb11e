use crate::domain::audio::AudioFormat;
use crate::domain::conversion::{CatalogVoice, VoiceSpec};
use async_trait::async_trait;

/// A text-to-speech backend.
///
/// Implementations synthesize exactly one chunk per call and never split or
/// merge text themselves; chunking and assembly belong to the conversion
/// service. The only state shared between calls is the backend's own client.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Short provider name used in logs and status responses
    fn name(&self) -> &'static str;

    /// Codec of every payload returned by `synthesize`
    fn audio_format(&self) -> AudioFormat;

    /// Largest chunk, in characters, a single call accepts
    fn max_chunk_chars(&self) -> usize;

    /// Voices this backend offers. Each language's default voice is listed first.
    fn voices(&self) -> &'static [CatalogVoice];

    /// Synthesize one chunk of text
    ///
    /// # Errors
    /// Returns a human readable cause if the provider fails or is unavailable
    async fn synthesize(&self, text: &str, voice: &VoiceSpec) -> Result<Vec<u8>, String>;
}
