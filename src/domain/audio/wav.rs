use super::{AssemblyError, AudioFormat, SampleEncoding, SegmentInfo, SegmentLayout};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

fn open(chunk_index: usize, bytes: &[u8]) -> Result<WavReader<Cursor<&[u8]>>, AssemblyError> {
    WavReader::new(Cursor::new(bytes)).map_err(|e| AssemblyError::InvalidSegment {
        chunk_index,
        format: AudioFormat::Wav,
        cause: e.to_string(),
    })
}

/// Decode every WAV payload and re-encode them as one file, in the given
/// order, with `silence_ms` of digital silence between consecutive payloads
pub fn concat(segments: &[(usize, &[u8])], silence_ms: u32) -> Result<Vec<u8>, AssemblyError> {
    let mut readers = Vec::with_capacity(segments.len());
    for (chunk_index, bytes) in segments {
        readers.push((*chunk_index, open(*chunk_index, bytes)?));
    }

    let spec: WavSpec = match readers.first() {
        Some((_, reader)) => reader.spec(),
        None => return Err(AssemblyError::NoSegments),
    };

    for (chunk_index, reader) in &readers {
        let other = reader.spec();
        if other != spec {
            return Err(AssemblyError::IncompatibleSegment {
                chunk_index: *chunk_index,
                cause: format!("{} differs from {}", layout(other), layout(spec)),
            });
        }
    }

    let silence_samples =
        (spec.sample_rate as u64 * silence_ms as u64 / 1000) as usize * spec.channels as usize;

    let mut cursor = Cursor::new(Vec::new());
    {
        let encode = |e: hound::Error| AssemblyError::Encode(e.to_string());
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode)?;

        for (position, (chunk_index, mut reader)) in readers.into_iter().enumerate() {
            let invalid = |e: hound::Error| AssemblyError::InvalidSegment {
                chunk_index,
                format: AudioFormat::Wav,
                cause: e.to_string(),
            };

            match spec.sample_format {
                SampleFormat::Int => {
                    if position > 0 {
                        for _ in 0..silence_samples {
                            writer.write_sample(0i32).map_err(encode)?;
                        }
                    }
                    for sample in reader.samples::<i32>() {
                        writer.write_sample(sample.map_err(invalid)?).map_err(encode)?;
                    }
                }
                SampleFormat::Float => {
                    if position > 0 {
                        for _ in 0..silence_samples {
                            writer.write_sample(0.0f32).map_err(encode)?;
                        }
                    }
                    for sample in reader.samples::<f32>() {
                        writer.write_sample(sample.map_err(invalid)?).map_err(encode)?;
                    }
                }
            }
        }

        writer.finalize().map_err(encode)?;
    }

    Ok(cursor.into_inner())
}

fn layout(spec: WavSpec) -> SegmentLayout {
    SegmentLayout {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        encoding: match spec.sample_format {
            SampleFormat::Int => SampleEncoding::Int(spec.bits_per_sample),
            SampleFormat::Float => SampleEncoding::Float(spec.bits_per_sample),
        },
    }
}

/// Validate one WAV payload and report its layout and length
pub fn inspect(chunk_index: usize, bytes: &[u8]) -> Result<SegmentInfo, AssemblyError> {
    let reader = open(chunk_index, bytes)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AssemblyError::InvalidSegment {
            chunk_index,
            format: AudioFormat::Wav,
            cause: "sample rate is zero".to_string(),
        });
    }

    Ok(SegmentInfo {
        layout: layout(spec),
        duration_ms: reader.duration() as f64 * 1000.0 / spec.sample_rate as f64,
    })
}

/// Playback duration of a WAV payload in milliseconds
pub fn duration_ms(bytes: &[u8]) -> Result<f64, AssemblyError> {
    Ok(inspect(0, bytes)?.duration_ms)
}
