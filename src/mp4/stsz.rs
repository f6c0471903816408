use super::r#box::BoxRef;
use super::types::{ChunkDescriptor, SampleInChunk};
use crate::cache::ChunkCache;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;

/// Uniform sample size (0 when sizes are tabulated) and sample count.
pub fn stsz_header<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stsz: &BoxRef,
) -> FrameExtractorResult<(u32, u32)> {
    let sample_size = cache.read_u32(stsz.content_start() + 4)?;
    let sample_count = cache.read_u32(stsz.content_start() + 8)?;
    Ok((sample_size, sample_count))
}

pub fn number_of_samples<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stsz: &BoxRef,
) -> FrameExtractorResult<u32> {
    Ok(stsz_header(cache, stsz)?.1)
}

/// Sample numbers from `target` onward: up to `frames_after` following samples,
/// never within `frames_limit_from_end` of the end, and always `target` itself.
pub fn expand_target_range(
    target: u32,
    sample_count: u32,
    frames_after: u32,
    frames_limit_from_end: u32,
) -> Vec<u32> {
    let t = target as i64;
    let last_allowed = sample_count as i64 - frames_limit_from_end as i64;
    let end = (last_allowed.min(t + frames_after as i64) + 1).max(t + 1);
    (t..end).map(|s| s as u32).collect()
}

/// Size of each target sample and its offset inside its chunk.
///
/// Only the size entries between the chunk's first sample and the target are
/// read, never the whole table.
pub fn samples_sizes_and_offsets<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    stsz: &BoxRef,
    chunks: &[ChunkDescriptor],
    targets: &[u32],
) -> FrameExtractorResult<Vec<SampleInChunk>> {
    let (uniform_size, sample_count) = stsz_header(cache, stsz)?;
    let table_start = stsz.content_start() + 12;

    let mut samples = Vec::with_capacity(targets.len());
    for (chunk, &target) in chunks.iter().zip(targets) {
        if target == 0 || target > sample_count {
            return Err(FrameExtractorError::InvalidSampleTable(format!(
                "sample {} is outside the {} samples of stsz",
                target, sample_count
            )));
        }
        if chunk.first_sample == 0 || chunk.first_sample > target {
            return Err(FrameExtractorError::InvalidSampleTable(format!(
                "chunk {} starts at sample {}, after sample {}",
                chunk.chunk_number, chunk.first_sample, target
            )));
        }
        let preceding = (target - chunk.first_sample) as u64;

        if uniform_size != 0 {
            samples.push(SampleInChunk {
                sample_number: target,
                offset_in_chunk: preceding * uniform_size as u64,
                size: uniform_size,
            });
            continue;
        }

        let from = table_start + (chunk.first_sample as u64 - 1) * 4;
        let length = (preceding + 1) * 4;
        if from + length > stsz.end() {
            return Err(FrameExtractorError::FileTruncated(format!(
                "stsz entry for sample {} lies past the end of the box",
                target
            )));
        }
        let entries = cache.get_bytes(from, length)?;
        let sizes: Vec<u64> = entries
            .chunks_exact(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64)
            .collect();
        let (size, before) = match sizes.split_last() {
            Some((size, before)) => (*size, before),
            None => {
                return Err(FrameExtractorError::FileTruncated(format!(
                    "stsz entry for sample {} is missing",
                    target
                )))
            }
        };

        samples.push(SampleInChunk {
            sample_number: target,
            offset_in_chunk: before.iter().sum(),
            size: size as u32,
        });
    }
    Ok(samples)
}
