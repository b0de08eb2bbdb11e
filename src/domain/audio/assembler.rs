use super::{mp3, wav, AssemblyError, AudioFormat, AudioSegment, SegmentInfo};

/// Stitch segments into one artifact of their shared codec.
///
/// Segments are ordered by ascending chunk index regardless of the order
/// they are handed in, so completion order never leaks into the output.
pub fn assemble(
    mut segments: Vec<AudioSegment>,
    inter_chunk_silence_ms: u32,
) -> Result<Vec<u8>, AssemblyError> {
    let format = segments.first().ok_or(AssemblyError::NoSegments)?.format;

    if let Some(odd) = segments.iter().find(|s| s.format != format) {
        return Err(AssemblyError::MixedFormats {
            chunk_index: odd.chunk_index,
            expected: format,
            found: odd.format,
        });
    }

    segments.sort_by_key(|s| s.chunk_index);

    let parts: Vec<(usize, &[u8])> = segments
        .iter()
        .map(|s| (s.chunk_index, s.bytes.as_slice()))
        .collect();

    match format {
        AudioFormat::Mp3 => mp3::concat(&parts, inter_chunk_silence_ms),
        AudioFormat::Wav => wav::concat(&parts, inter_chunk_silence_ms),
    }
}

/// Check that one segment decodes and report its layout
pub fn inspect(
    chunk_index: usize,
    format: AudioFormat,
    bytes: &[u8],
) -> Result<SegmentInfo, AssemblyError> {
    match format {
        AudioFormat::Mp3 => mp3::inspect(chunk_index, bytes),
        AudioFormat::Wav => wav::inspect(chunk_index, bytes),
    }
}

pub fn duration_ms(format: AudioFormat, bytes: &[u8]) -> Result<f64, AssemblyError> {
    match format {
        AudioFormat::Mp3 => mp3::duration_ms(bytes),
        AudioFormat::Wav => wav::duration_ms(bytes),
    }
}
