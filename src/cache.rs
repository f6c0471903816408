//! Chunk cache: the only path from the extraction pipeline to the byte source.
//!
//! Reads are resolved to chunk-aligned offsets; missing chunks are grouped into
//! maximal contiguous runs and each run is fetched with a single request, so the
//! scattered metadata reads done while walking `moov` cost few round trips.

use crate::bits;
use crate::config::Verbosity;
use crate::errors::{FrameExtractorError, FrameExtractorResult, StreamError};
use crate::mp4::r#box::FourCc;
use crate::streams::{ByteSource, ChunkMap};

pub struct ChunkCache<S: ByteSource> {
    source: S,
    chunk_size: u32,
    chunk_limit: u32,
    file_size: u64,
    chunks: ChunkMap,
    chunks_used: u32,
    fetch_requests: u32,
    bytes_fetched: u64,
    verbose: Verbosity,
}

impl<S: ByteSource> ChunkCache<S> {
    pub fn new(source: S, chunk_size: u32, chunk_limit: u32, verbose: Verbosity) -> Self {
        let file_size = source.size();
        Self {
            source,
            chunk_size,
            chunk_limit,
            file_size,
            chunks: ChunkMap::new(),
            chunks_used: 0,
            fetch_requests: 0,
            bytes_fetched: 0,
            verbose,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Chunks fetched so far, the quantity bounded by the chunk limit.
    pub fn chunks_used(&self) -> u32 {
        self.chunks_used
    }

    pub fn cached_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn fetch_requests(&self) -> u32 {
        self.fetch_requests
    }

    pub fn bytes_fetched(&self) -> u64 {
        self.bytes_fetched
    }

    fn read_chunks(&mut self, offset: u64, count: u32) -> FrameExtractorResult<()> {
        verbose!(
            self.verbose,
            Reading,
            "reading {} chunks in offset {}...",
            count,
            offset
        );
        if self.chunks_used as u64 + count as u64 > self.chunk_limit as u64 {
            return Err(FrameExtractorError::ChunksLimitExceeded {
                used: self.chunks_used,
                requested: count,
                limit: self.chunk_limit,
            });
        }

        let fetched = self.source.fetch_chunks(offset, count, self.chunk_size)?;
        self.fetch_requests += 1;
        self.chunks_used += count;

        for i in 0..count as u64 {
            let chunk_offset = offset + i * self.chunk_size as u64;
            if !fetched.contains_key(&chunk_offset) {
                return Err(StreamError::new(format!(
                    "byte source did not return chunk at offset {}",
                    chunk_offset
                ))
                .into());
            }
        }
        for (chunk_offset, bytes) in fetched {
            self.bytes_fetched += bytes.len() as u64;
            self.chunks.insert(chunk_offset, bytes);
        }
        Ok(())
    }

    /// Return exactly `length` bytes starting at `offset`, fetching missing chunks.
    pub fn get_bytes(&mut self, offset: u64, length: u64) -> FrameExtractorResult<Vec<u8>> {
        verbose!(
            self.verbose,
            Reading,
            "getting {} bytes in offset {}",
            length,
            offset
        );
        if length == 0 {
            return Ok(Vec::new());
        }
        let end = offset.checked_add(length).ok_or_else(|| {
            FrameExtractorError::FileTruncated(format!(
                "byte range {}+{} overflows",
                offset, length
            ))
        })?;
        if end > self.file_size {
            return Err(FrameExtractorError::FileTruncated(format!(
                "requested bytes {}..{} but the file has only {} bytes",
                offset, end, self.file_size
            )));
        }

        let chunk_size = self.chunk_size as u64;
        let first = offset - offset % chunk_size;
        let required: Vec<u64> = (first..end).step_by(chunk_size as usize).collect();

        // one fetch per maximal run of missing chunks
        let mut run_start: Option<usize> = None;
        for (i, chunk_offset) in required.iter().enumerate() {
            if !self.chunks.contains_key(chunk_offset) {
                if run_start.is_none() {
                    run_start = Some(i);
                }
            } else if let Some(start) = run_start.take() {
                self.read_chunks(required[start], (i - start) as u32)?;
            }
        }
        if let Some(start) = run_start {
            self.read_chunks(required[start], (required.len() - start) as u32)?;
        }

        let mut out = Vec::with_capacity(length as usize);
        for chunk_offset in required {
            let chunk = &self.chunks[&chunk_offset];
            let from = offset.saturating_sub(chunk_offset) as usize;
            let to = ((end - chunk_offset) as usize).min(chunk.len());
            if from >= to {
                break;
            }
            out.extend_from_slice(&chunk[from..to]);
        }
        if out.len() as u64 != length {
            return Err(FrameExtractorError::FileTruncated(format!(
                "expected {} bytes at offset {}, only {} available",
                length,
                offset,
                out.len()
            )));
        }
        Ok(out)
    }

    pub fn read_u8(&mut self, offset: u64) -> FrameExtractorResult<u8> {
        Ok(self.get_bytes(offset, 1)?[0])
    }

    pub fn read_u16(&mut self, offset: u64) -> FrameExtractorResult<u16> {
        let bytes = self.get_bytes(offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self, offset: u64) -> FrameExtractorResult<u32> {
        let bytes = self.get_bytes(offset, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self, offset: u64) -> FrameExtractorResult<u64> {
        let bytes = self.get_bytes(offset, 8)?;
        let mut pos = 0;
        bits::read_u64(&bytes, &mut pos)
            .ok_or_else(|| FrameExtractorError::FileTruncated(format!("u64 at {}", offset)))
    }

    pub fn read_characters(&mut self, offset: u64, count: u64) -> FrameExtractorResult<Vec<u8>> {
        self.get_bytes(offset, count)
    }

    pub fn read_fourcc(&mut self, offset: u64) -> FrameExtractorResult<FourCc> {
        let bytes = self.get_bytes(offset, 4)?;
        Ok(FourCc([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
