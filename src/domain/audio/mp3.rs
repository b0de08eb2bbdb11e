//! MPEG Layer III frame-level concatenation.
//!
//! MP3 streams tolerate being cut and joined at frame boundaries, so segments
//! are stitched without re-encoding. symphonia's reader yields the audio
//! frames of each payload with tags and encoder info frames already dropped;
//! silence is produced as zero-filled frames sharing the stream's header.

use super::{AssemblyError, AudioFormat, SampleEncoding, SegmentInfo, SegmentLayout};
use std::io::Cursor;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const HEADER_LEN: usize = 4;

/// One audio frame, header included
struct Frame {
    data: Box<[u8]>,
    samples: u64,
}

impl Frame {
    /// A zero-filled frame with this frame's header, which decodes as silence
    fn silent(&self) -> Vec<u8> {
        let mut frame = vec![0u8; self.data.len()];
        frame[..HEADER_LEN].copy_from_slice(&self.data[..HEADER_LEN]);
        // Zeroed CRC would not verify, so mark the frame unprotected
        frame[1] |= 0x01;
        frame
    }
}

struct Mp3Stream {
    layout: SegmentLayout,
    frames: Vec<Frame>,
}

impl Mp3Stream {
    fn duration_ms(&self) -> f64 {
        let samples: u64 = self.frames.iter().map(|f| f.samples).sum();
        samples as f64 * 1000.0 / self.layout.sample_rate as f64
    }
}

fn read_frames(chunk_index: usize, bytes: &[u8]) -> Result<Mp3Stream, AssemblyError> {
    let invalid = |cause: String| AssemblyError::InvalidSegment {
        chunk_index,
        format: AudioFormat::Mp3,
        cause,
    };

    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");
    let format_opts = FormatOptions {
        enable_gapless: false,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&hint, source, &format_opts, &MetadataOptions::default())
        .map_err(|e| invalid(e.to_string()))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| invalid("no audio track".to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| invalid("unknown sample rate".to_string()))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(1);

    let mut frames = Vec::new();
    while let Ok(packet) = reader.next_packet() {
        if packet.track_id() != track_id || packet.data.len() <= HEADER_LEN {
            continue;
        }
        frames.push(Frame {
            samples: packet.dur,
            data: packet.data,
        });
    }

    if frames.is_empty() {
        return Err(invalid("no MPEG audio frames found".to_string()));
    }

    Ok(Mp3Stream {
        layout: SegmentLayout {
            sample_rate,
            channels,
            encoding: SampleEncoding::Compressed,
        },
        frames,
    })
}

/// Validate one MP3 payload and report its layout and length
pub fn inspect(chunk_index: usize, bytes: &[u8]) -> Result<SegmentInfo, AssemblyError> {
    let stream = read_frames(chunk_index, bytes)?;
    Ok(SegmentInfo {
        layout: stream.layout,
        duration_ms: stream.duration_ms(),
    })
}

/// Concatenate MP3 payloads in the given order with `silence_ms` between them
pub fn concat(segments: &[(usize, &[u8])], silence_ms: u32) -> Result<Vec<u8>, AssemblyError> {
    let mut output = Vec::with_capacity(segments.iter().map(|(_, b)| b.len()).sum());
    let mut previous: Option<(SegmentLayout, Vec<u8>, u64)> = None;

    for (chunk_index, bytes) in segments {
        let stream = read_frames(*chunk_index, bytes)?;

        if let Some((layout, silent, frame_samples)) = &previous {
            if layout.sample_rate != stream.layout.sample_rate {
                return Err(AssemblyError::IncompatibleSegment {
                    chunk_index: *chunk_index,
                    cause: format!(
                        "sample rate {} Hz differs from {} Hz",
                        stream.layout.sample_rate, layout.sample_rate
                    ),
                });
            }

            if silence_ms > 0 && *frame_samples > 0 {
                let wanted_samples = silence_ms as u64 * layout.sample_rate as u64;
                let count = wanted_samples.div_ceil(frame_samples * 1000);
                for _ in 0..count {
                    output.extend_from_slice(silent);
                }
            }
        }

        for frame in &stream.frames {
            output.extend_from_slice(&frame.data);
        }

        previous = stream
            .frames
            .last()
            .map(|last| (stream.layout, last.silent(), last.samples));
    }

    Ok(output)
}

/// Playback duration of an MP3 payload in milliseconds
pub fn duration_ms(bytes: &[u8]) -> Result<f64, AssemblyError> {
    Ok(read_frames(0, bytes)?.duration_ms())
}
