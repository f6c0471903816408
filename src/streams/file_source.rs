use super::{chunk_len, ByteSource, ChunkMap};
use crate::errors::{FrameExtractorResult, StreamError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Local file wrapper
pub struct FileByteSource {
    path: PathBuf,
    file: File,
    size: u64,
    read_count: u64,
    bytes_read: u64,
}

impl FileByteSource {
    pub fn open<P: AsRef<Path>>(path: P) -> FrameExtractorResult<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            file,
            size,
            read_count: 0,
            bytes_read: 0,
        })
    }

    /// Number of chunk runs read from disk.
    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl ByteSource for FileByteSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn fetch_chunks(
        &mut self,
        offset: u64,
        count: u32,
        chunk_size: u32,
    ) -> FrameExtractorResult<ChunkMap> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.read_count += 1;

        let mut chunks = ChunkMap::with_capacity(count as usize);
        for i in 0..count as u64 {
            let chunk_offset = offset + i * chunk_size as u64;
            let len = chunk_len(self.size, chunk_offset, chunk_size);
            if len == 0 {
                return Err(StreamError::new(format!(
                    "chunk at offset {} is beyond the end of {}",
                    chunk_offset,
                    self.path.display()
                ))
                .into());
            }
            let mut buf = vec![0u8; len];
            self.file.read_exact(&mut buf)?;
            self.bytes_read += len as u64;
            chunks.insert(chunk_offset, buf);
        }
        Ok(chunks)
    }

    fn describe(&self) -> String {
        format!("local file {} ({} bytes)", self.path.display(), self.size)
    }

    fn print_stats(&self) {
        log::info!("📊 Read Statistics:");
        log::info!("   🔢 Disk reads: {}", self.read_count);
        log::info!("   📥 Total read: {} bytes", self.bytes_read);
    }
}
