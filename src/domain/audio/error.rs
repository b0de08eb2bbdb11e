use super::AudioFormat;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("no audio segments to assemble")]
    NoSegments,
    #[error("segment {chunk_index} is {found}, expected {expected}")]
    MixedFormats {
        chunk_index: usize,
        expected: AudioFormat,
        found: AudioFormat,
    },
    #[error("segment {chunk_index} is not valid {format}: {cause}")]
    InvalidSegment {
        chunk_index: usize,
        format: AudioFormat,
        cause: String,
    },
    #[error("segment {chunk_index} has incompatible audio parameters: {cause}")]
    IncompatibleSegment { chunk_index: usize, cause: String },
    #[error("failed to encode output: {0}")]
    Encode(String),
}
