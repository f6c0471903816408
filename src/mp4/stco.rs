use super::navigator::ChunkOffsetBox;
use super::types::ChunkDescriptor;
use crate::cache::ChunkCache;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;

/// File offset of each chunk, read from `stco` (32-bit) or `co64` (64-bit).
pub fn chunks_offsets<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    offsets_box: ChunkOffsetBox,
    chunks: &[ChunkDescriptor],
) -> FrameExtractorResult<Vec<u64>> {
    let box_ref = offsets_box.box_ref();
    let entry_count = cache.read_u32(box_ref.content_start() + 4)?;
    let table_start = box_ref.content_start() + 8;
    let entry_size = offsets_box.entry_size();

    let mut offsets = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.chunk_number == 0 || chunk.chunk_number > entry_count {
            return Err(FrameExtractorError::InvalidSampleTable(format!(
                "chunk {} is outside the {} entries of the chunk offset table",
                chunk.chunk_number, entry_count
            )));
        }
        let position = table_start + (chunk.chunk_number as u64 - 1) * entry_size;
        if position + entry_size > box_ref.end() {
            return Err(FrameExtractorError::FileTruncated(format!(
                "chunk offset entry {} lies past the end of the box",
                chunk.chunk_number
            )));
        }
        let offset = match offsets_box {
            ChunkOffsetBox::Stco(_) => cache.read_u32(position)? as u64,
            ChunkOffsetBox::Co64(_) => cache.read_u64(position)?,
        };
        offsets.push(offset);
    }
    Ok(offsets)
}
