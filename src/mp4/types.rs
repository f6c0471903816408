use serde::Serialize;

/// The chunk holding a target sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkDescriptor {
    /// 1-based chunk number
    pub chunk_number: u32,
    /// Number of the first sample stored in the chunk
    pub first_sample: u32,
    pub sample_description_id: u16,
}

/// A sample located relative to the start of its chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleInChunk {
    pub sample_number: u32,
    pub offset_in_chunk: u64,
    pub size: u32,
}

/// A sample located in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleDescriptor {
    pub sample_number: u32,
    pub offset_in_file: u64,
    pub size: u32,
}

impl SampleDescriptor {
    pub fn end(&self) -> u64 {
        self.offset_in_file + self.size as u64
    }
}

/// Everything needed to fetch and repack the target samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSamples {
    pub sample_description_id: u16,
    pub samples: Vec<SampleDescriptor>,
}
