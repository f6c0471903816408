use crate::codecs::VideoCodec;
use crate::mp4::SampleDescriptor;
use serde::Serialize;

/// Where an extractor is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Uninitialized,
    /// Sample table boxes located
    Initiated,
    Resolving,
    Fetching,
    Repacking,
    Done,
    /// Last extraction failed with this status code
    Failed(i32),
}

/// Self-decodable stream of the target samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementaryStream {
    pub codec: VideoCodec,
    /// Parameter sets followed by the repacked samples
    pub data: Vec<u8>,
    /// Length of the parameter sets at the start of `data`
    pub private_data_len: usize,
    pub samples: Vec<SampleDescriptor>,
}

impl ElementaryStream {
    pub fn private_data(&self) -> &[u8] {
        &self.data[..self.private_data_len]
    }

    pub fn sample_data(&self) -> &[u8] {
        &self.data[self.private_data_len..]
    }
}

/// Fetch accounting of one extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub chunks_used: u32,
    pub chunk_size: u32,
    pub fetch_requests: u32,
    pub bytes_fetched: u64,
    pub file_size: u64,
    /// File bytes that were never fetched
    pub bytes_saved: u64,
}

/// Result of `FrameExtractor::extract`: a status code and message, and the
/// stream only on success
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub status: i32,
    pub message: String,
    pub stream: Option<ElementaryStream>,
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        self.status == crate::errors::SUCCESS_CODE
    }
}
