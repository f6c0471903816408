use super::{chunk_len, ByteSource, ChunkMap};
use crate::errors::{FrameExtractorResult, StreamError};

/// Byte source over an in-memory buffer
pub struct MemoryByteSource {
    label: String,
    data: Vec<u8>,
    fetch_calls: u64,
}

impl MemoryByteSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_label(data, "in-memory buffer")
    }

    pub fn with_label(data: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data,
            fetch_calls: 0,
        }
    }

    /// Number of `fetch_chunks` calls served so far.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls
    }
}

impl ByteSource for MemoryByteSource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn fetch_chunks(
        &mut self,
        offset: u64,
        count: u32,
        chunk_size: u32,
    ) -> FrameExtractorResult<ChunkMap> {
        self.fetch_calls += 1;
        let size = self.size();
        let mut chunks = ChunkMap::with_capacity(count as usize);
        for i in 0..count as u64 {
            let chunk_offset = offset + i * chunk_size as u64;
            let len = chunk_len(size, chunk_offset, chunk_size);
            if len == 0 {
                return Err(StreamError::new(format!(
                    "chunk at offset {} is beyond the end of the buffer ({} bytes)",
                    chunk_offset, size
                ))
                .into());
            }
            let start = chunk_offset as usize;
            chunks.insert(chunk_offset, self.data[start..start + len].to_vec());
        }
        Ok(chunks)
    }

    fn describe(&self) -> String {
        format!("{} ({} bytes)", self.label, self.data.len())
    }
}
