use super::r#box::BoxRef;
use super::types::ChunkDescriptor;
use crate::bits::read_u32;
use crate::cache::ChunkCache;
use crate::config::ExtractorConfig;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::policy::{ConfirmKind, ConfirmRequest, ConfirmationPolicy};
use crate::streams::ByteSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleToChunkEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_id: u32,
}

/// Parse the entries of a fetched `stsc` box body (starting at version/flags).
pub fn parse_stsc(body: &[u8]) -> FrameExtractorResult<Vec<SampleToChunkEntry>> {
    let mut pos = 4;
    let entry_count = read_u32(body, &mut pos).ok_or_else(|| {
        FrameExtractorError::FileTruncated("stsc box too small for its header".to_string())
    })?;

    let required_size = 8 + entry_count as u64 * 12;
    if required_size > body.len() as u64 {
        return Err(FrameExtractorError::FileTruncated(format!(
            "stsc box too small for {} entries: expected {} bytes, got {}",
            entry_count,
            required_size,
            body.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        // bounds checked above
        let first_chunk = read_u32(body, &mut pos).unwrap_or_default();
        let samples_per_chunk = read_u32(body, &mut pos).unwrap_or_default();
        let sample_description_id = read_u32(body, &mut pos).unwrap_or_default();
        entries.push(SampleToChunkEntry {
            first_chunk,
            samples_per_chunk,
            sample_description_id,
        });
    }
    Ok(entries)
}

/// The run currently being walked
struct Run {
    first_chunk: u32,
    samples_per_chunk: u32,
    first_sample: u64,
    description_id: u16,
}

impl Run {
    fn start(entry: &SampleToChunkEntry, found_samples: u64) -> FrameExtractorResult<Self> {
        if entry.samples_per_chunk == 0 {
            return Err(FrameExtractorError::InvalidSampleTable(format!(
                "stsc run at chunk {} has zero samples per chunk",
                entry.first_chunk
            )));
        }
        let description_id = u16::try_from(entry.sample_description_id).map_err(|_| {
            FrameExtractorError::InvalidSampleTable(format!(
                "stsc run at chunk {} has sample description id {} above 65535",
                entry.first_chunk, entry.sample_description_id
            ))
        })?;
        Ok(Run {
            first_chunk: entry.first_chunk,
            samples_per_chunk: entry.samples_per_chunk,
            first_sample: found_samples + 1,
            description_id,
        })
    }

    fn resolve(&self, target: u32, found_chunks: u64) -> FrameExtractorResult<ChunkDescriptor> {
        let spc = self.samples_per_chunk as u64;
        let chunk = (target as u64 - self.first_sample) / spc + found_chunks + 1;
        let first_sample = self.first_sample + (chunk - found_chunks - 1) * spc;
        let overflow = || {
            FrameExtractorError::InvalidSampleTable(format!(
                "sample {} maps past the 32-bit chunk range",
                target
            ))
        };
        Ok(ChunkDescriptor {
            chunk_number: u32::try_from(chunk).map_err(|_| overflow())?,
            first_sample: u32::try_from(first_sample).map_err(|_| overflow())?,
            sample_description_id: self.description_id,
        })
    }
}

/// Map sorted, 1-based sample numbers to the chunks holding them in one pass
/// over the run-length table. Samples past the last entry belong to the final
/// run, which continues indefinitely.
pub fn resolve_sample_chunks(
    entries: &[SampleToChunkEntry],
    targets: &[u32],
) -> FrameExtractorResult<Vec<ChunkDescriptor>> {
    let first = entries.first().ok_or_else(|| {
        FrameExtractorError::InvalidSampleTable("stsc has no entries".to_string())
    })?;
    if targets.windows(2).any(|w| w[0] > w[1]) || targets.first() == Some(&0) {
        return Err(FrameExtractorError::InvalidSampleTable(
            "target samples must be sorted and 1-based".to_string(),
        ));
    }

    let mut resolved = Vec::with_capacity(targets.len());
    let mut pending = targets.iter().copied().peekable();
    let mut found_samples = 0u64;
    let mut found_chunks = 0u64;
    let mut run = Run::start(first, found_samples)?;

    for entry in &entries[1..] {
        if entry.first_chunk <= run.first_chunk {
            return Err(FrameExtractorError::InvalidSampleTable(format!(
                "stsc first_chunk {} does not follow {}",
                entry.first_chunk, run.first_chunk
            )));
        }
        let run_chunks = (entry.first_chunk - run.first_chunk) as u64;
        found_samples += run_chunks * run.samples_per_chunk as u64;

        while let Some(target) = pending.next_if(|t| *t as u64 <= found_samples) {
            resolved.push(run.resolve(target, found_chunks)?);
        }

        found_chunks += run_chunks;
        run = Run::start(entry, found_samples)?;
    }

    for target in pending {
        resolved.push(run.resolve(target, found_chunks)?);
    }

    Ok(resolved)
}

/// Fetch the `stsc` table (after the size checks) and resolve `targets`.
pub fn get_samples_chunks<S: ByteSource, P: ConfirmationPolicy + ?Sized>(
    cache: &mut ChunkCache<S>,
    stsc: &BoxRef,
    targets: &[u32],
    config: &ExtractorConfig,
    policy: &mut P,
) -> FrameExtractorResult<Vec<ChunkDescriptor>> {
    if stsc.size > config.stsc_size_limit {
        return Err(FrameExtractorError::StscTooLarge { size: stsc.size });
    }
    if stsc.size > config.stsc_size_threshold {
        let request = ConfirmRequest {
            kind: ConfirmKind::StscTable,
            byte_count: stsc.size,
            source_description: Some(cache.source().describe()),
        };
        if !policy.confirm(&request) {
            return Err(FrameExtractorError::StscTooLarge { size: stsc.size });
        }
    }

    let body = cache.get_bytes(stsc.content_start(), stsc.content_size())?;
    let entries = parse_stsc(&body)?;
    verbose!(
        config.verbose,
        AlgorithmVars,
        "stsc entries: {}, targets: {:?}",
        entries.len(),
        targets
    );

    let chunks = resolve_sample_chunks(&entries, targets)?;
    for (target, chunk) in targets.iter().zip(&chunks) {
        verbose!(
            config.verbose,
            AlgorithmVars,
            "sample {} -> chunk {} (first sample {}, description {})",
            target,
            chunk.chunk_number,
            chunk.first_sample,
            chunk.sample_description_id
        );
    }
    Ok(chunks)
}
