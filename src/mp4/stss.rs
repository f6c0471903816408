use super::r#box::BoxRef;
use crate::cache::ChunkCache;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;

/// Index into the sync sample table for the requested position.
///
/// `offset` wraps around the table (`-1` is the last entry) and `mult` scales the
/// wrapped index, so `offset = -1, mult = 0.5` picks the middle key frame.
/// The rounded product is clamped into the table so a rounding edge can never
/// select the slot past the last entry.
pub fn sync_sample_index(entry_count: u32, offset: i64, mult: f64) -> u32 {
    if entry_count == 0 {
        return 0;
    }
    let residue = offset.rem_euclid(entry_count as i64);
    let idx = (residue as f64 * mult).round();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as u64).min(entry_count as u64 - 1) as u32
    }
}

/// Number of entries in the `stss` table.
pub fn sync_sample_count<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stss: &BoxRef,
) -> FrameExtractorResult<u32> {
    cache.read_u32(stss.content_start() + 4)
}

/// Resolve the absolute sample number of the targeted sync sample.
pub fn get_target_key_sample<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stss: &BoxRef,
    target_frame_offset: i64,
    target_frame_mult: f64,
) -> FrameExtractorResult<u32> {
    let entry_count = sync_sample_count(cache, stss)?;
    if entry_count == 0 {
        return Err(FrameExtractorError::InvalidSampleTable(
            "stss has no entries".to_string(),
        ));
    }
    let table_end = stss.content_start() + 8 + entry_count as u64 * 4;
    if table_end > stss.end() {
        return Err(FrameExtractorError::FileTruncated(format!(
            "stss declares {} entries but holds only {} bytes",
            entry_count,
            stss.content_size()
        )));
    }

    let idx = sync_sample_index(entry_count, target_frame_offset, target_frame_mult);
    cache.read_u32(stss.content_start() + 8 + idx as u64 * 4)
}
