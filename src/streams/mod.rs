use crate::errors::FrameExtractorResult;
use std::collections::HashMap;

pub mod file_source;
pub mod http_source;
pub mod memory_source;

pub use file_source::FileByteSource;
pub use http_source::HttpByteSource;
pub use memory_source::MemoryByteSource;

/// Chunk buffers keyed by their chunk-aligned start offset
pub type ChunkMap = HashMap<u64, Vec<u8>>;

/// Random access to the bytes of a (possibly remote) media file in fixed-size chunks
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Total byte length of the media
    fn size(&self) -> u64;

    /// Fetch `count` consecutive chunks of `chunk_size` bytes starting at `offset`.
    ///
    /// Must return exactly `count` buffers keyed by their start offset; only the
    /// buffer that reaches the end of the media may be short.
    fn fetch_chunks(
        &mut self,
        offset: u64,
        count: u32,
        chunk_size: u32,
    ) -> FrameExtractorResult<ChunkMap>;

    /// Human readable label, shown when a download needs confirmation
    fn describe(&self) -> String;

    fn print_stats(&self) {}
}

/// Byte length of the chunk starting at `chunk_offset`, clipped to the end of the media.
pub(crate) fn chunk_len(file_size: u64, chunk_offset: u64, chunk_size: u32) -> usize {
    file_size
        .saturating_sub(chunk_offset)
        .min(chunk_size as u64) as usize
}
