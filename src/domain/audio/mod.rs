pub mod assembler;
pub mod error;
pub mod mp3;
pub mod wav;

pub use assembler::{assemble, inspect};
pub use error::AssemblyError;

use serde::{Deserialize, Serialize};

/// Codec of synthesized segments and of the final artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Encoded audio for one chunk, tagged with the chunk it came from
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub chunk_index: usize,
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
}

/// How samples are stored in a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Compressed,
    Int(u16),
    Float(u16),
}

/// Stream parameters segments must share to be joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    pub sample_rate: u32,
    pub channels: u16,
    pub encoding: SampleEncoding,
}

impl std::fmt::Display for SegmentLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz/{} ch", self.sample_rate, self.channels)?;
        match self.encoding {
            SampleEncoding::Compressed => Ok(()),
            SampleEncoding::Int(bits) => write!(f, "/{} bit", bits),
            SampleEncoding::Float(bits) => write!(f, "/{} bit float", bits),
        }
    }
}

/// What a decodable segment looks like
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInfo {
    pub layout: SegmentLayout,
    pub duration_ms: f64,
}
