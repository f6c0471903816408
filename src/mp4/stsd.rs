use super::r#box::{BoxRef, FourCc};
use crate::cache::ChunkCache;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;

/// Bytes from the start of a visual sample entry to its first child box
pub const VISUAL_SAMPLE_ENTRY_SIZE: u64 = 86;

/// A sample description entry inside `stsd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleEntry {
    pub box_ref: BoxRef,
    pub fourcc: FourCc,
}

impl SampleEntry {
    /// Range where the codec configuration box is searched.
    pub fn children_range(&self) -> (u64, u64) {
        (self.box_ref.offset + VISUAL_SAMPLE_ENTRY_SIZE, self.box_ref.end())
    }
}

/// Find the sample entry whose data reference id equals `id`.
pub fn find_sample_description<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stsd: &BoxRef,
    id: u16,
) -> FrameExtractorResult<SampleEntry> {
    let entry_count = cache.read_u32(stsd.content_start() + 4)?;
    let mut offset = stsd.content_start() + 8;

    for _ in 0..entry_count {
        if offset + 16 > stsd.end() {
            break;
        }
        let size = cache.read_u32(offset)? as u64;
        if size < 16 || offset + size > stsd.end() {
            return Err(FrameExtractorError::FileTruncated(format!(
                "sample description at {} has invalid size {}",
                offset, size
            )));
        }
        let fourcc = cache.read_fourcc(offset + 4)?;
        let entry_id = cache.read_u16(offset + 14)?;
        if entry_id == id {
            return Ok(SampleEntry {
                box_ref: BoxRef {
                    offset,
                    size,
                    header_size: 8,
                },
                fourcc,
            });
        }
        offset += size;
    }

    Err(FrameExtractorError::SampleDescriptionNotFound { id })
}
