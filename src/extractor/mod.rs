//! Extraction pipeline: box discovery, sample resolution, fetching and repacking.

mod types;

pub use types::{ElementaryStream, ExtractionOutcome, ExtractionState, ExtractionStats};

use crate::cache::ChunkCache;
use crate::codecs::select_codec;
use crate::config::{ExtractorConfig, MB_SIZE};
use crate::decoder::FrameDecoder;
use crate::errors::{FrameExtractorError, FrameExtractorResult, SUCCESS_CODE};
use crate::mp4::{
    chunks_offsets, discover_boxes, expand_target_range, find_box, find_sample_description,
    get_samples_chunks, get_target_key_sample, number_of_samples, samples_sizes_and_offsets,
    SampleDescriptor, SampleTableBoxes, TargetSamples,
};
use crate::policy::{ConfirmKind, ConfirmRequest, ConfirmationPolicy, RejectAll};
use crate::streams::ByteSource;
use log::warn;
use std::path::Path;

/// Extracts key frames from one MP4 source.
///
/// Box locations and fetched chunks are kept for the lifetime of the
/// extractor, so repeated extractions only fetch what they have not seen.
pub struct FrameExtractor<S: ByteSource> {
    cache: ChunkCache<S>,
    config: ExtractorConfig,
    policy: Box<dyn ConfirmationPolicy>,
    boxes: Option<SampleTableBoxes>,
    state: ExtractionState,
}

impl<S: ByteSource> FrameExtractor<S> {
    /// Soft thresholds are refused until a policy is set with [`with_policy`](Self::with_policy).
    pub fn new(source: S, config: ExtractorConfig) -> FrameExtractorResult<Self> {
        config.validate()?;
        let cache = ChunkCache::new(source, config.chunk_size, config.chunk_limit, config.verbose);
        Ok(Self {
            cache,
            config,
            policy: Box::new(RejectAll),
            boxes: None,
            state: ExtractionState::Uninitialized,
        })
    }

    pub fn with_policy<P: ConfirmationPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        self.cache.source()
    }

    pub fn state(&self) -> ExtractionState {
        self.state
    }

    pub fn is_initiated(&self) -> bool {
        self.boxes.is_some()
    }

    /// Locate the sample table boxes of the video track. Runs once.
    pub fn init(&mut self) -> FrameExtractorResult<SampleTableBoxes> {
        if let Some(boxes) = self.boxes {
            return Ok(boxes);
        }
        verbose!(self.config.verbose, AlgorithmVars, "initiating...");
        let boxes = discover_boxes(&mut self.cache, self.config.verbose)?;
        self.boxes = Some(boxes);
        self.state = ExtractionState::Initiated;
        Ok(boxes)
    }

    /// Resolve the target samples to file locations.
    pub fn collect_target_samples(&mut self) -> FrameExtractorResult<TargetSamples> {
        let boxes = self.init()?;
        self.state = ExtractionState::Resolving;
        let verbose = self.config.verbose;

        let target = get_target_key_sample(
            &mut self.cache,
            &boxes.stss,
            self.config.target_frame_offset,
            self.config.target_frame_mult,
        )?;
        verbose!(verbose, AlgorithmVars, "target key sample number: {}", target);

        let sample_count = number_of_samples(&mut self.cache, &boxes.stsz)?;
        let targets = expand_target_range(
            target,
            sample_count,
            self.config.frames_after,
            self.config.frames_limit_from_end,
        );
        verbose!(
            verbose,
            AlgorithmVars,
            "targeting {} samples: {:?}",
            targets.len(),
            targets
        );

        let chunks = get_samples_chunks(
            &mut self.cache,
            &boxes.stsc,
            &targets,
            &self.config,
            self.policy.as_mut(),
        )?;
        let in_chunk = samples_sizes_and_offsets(&mut self.cache, &boxes.stsz, &chunks, &targets)?;
        verbose!(verbose, AlgorithmVars, "target samples in chunks: {:?}", in_chunk);
        let offsets = chunks_offsets(&mut self.cache, boxes.chunk_offsets, &chunks)?;
        verbose!(verbose, AlgorithmVars, "target chunks offsets: {:?}", offsets);

        let sample_description_id = chunks
            .first()
            .map(|c| c.sample_description_id)
            .ok_or_else(|| FrameExtractorError::InvalidSampleTable("no target samples".to_string()))?;
        let samples = in_chunk
            .iter()
            .zip(&offsets)
            .map(|(sample, chunk_offset)| SampleDescriptor {
                sample_number: sample.sample_number,
                offset_in_file: chunk_offset + sample.offset_in_chunk,
                size: sample.size,
            })
            .collect();

        Ok(TargetSamples {
            sample_description_id,
            samples,
        })
    }

    fn check_download_size(&mut self, download_size: u64) -> FrameExtractorResult<()> {
        if download_size > self.config.download_limit {
            return Err(FrameExtractorError::DownloadLimitExceeded {
                size: download_size,
            });
        }
        if download_size > self.config.download_threshold {
            warn!(
                "download size {:.2} MB above download threshold",
                download_size as f64 / MB_SIZE as f64
            );
            let request = ConfirmRequest {
                kind: ConfirmKind::DownloadSize,
                byte_count: download_size,
                source_description: Some(self.cache.source().describe()),
            };
            if !self.policy.confirm(&request) {
                return Err(FrameExtractorError::DownloadLimitExceeded {
                    size: download_size,
                });
            }
        }
        Ok(())
    }

    /// Fetch the target samples and build their elementary stream.
    pub fn retrieve_elementary_stream(
        &mut self,
        targets: &TargetSamples,
    ) -> FrameExtractorResult<ElementaryStream> {
        let boxes = self.init()?;
        let entry = find_sample_description(&mut self.cache, &boxes.stsd, targets.sample_description_id)?;
        let codec = select_codec(entry.fourcc)?;
        verbose!(self.config.verbose, AlgorithmVars, "using codec: {}", entry.fourcc);

        let (start, end) = entry.children_range();
        let config_box = find_box(&mut self.cache, Some(codec.config_box()), start, end)?.box_ref;
        let config = self
            .cache
            .get_bytes(config_box.content_start(), config_box.content_size())?;
        let private = codec.extract_private_data(&config)?;

        let min_byte = targets.samples.iter().map(|s| s.offset_in_file).min();
        let max_byte = targets.samples.iter().map(SampleDescriptor::end).max();
        let (Some(min_byte), Some(max_byte)) = (min_byte, max_byte) else {
            return Err(FrameExtractorError::InvalidSampleTable(
                "no target samples".to_string(),
            ));
        };

        self.state = ExtractionState::Fetching;
        let download_size = max_byte - min_byte;
        self.check_download_size(download_size)?;
        let span = self.cache.get_bytes(min_byte, download_size)?;

        self.state = ExtractionState::Repacking;
        let mut data = private.parameter_sets;
        let private_data_len = data.len();
        for sample in &targets.samples {
            let from = (sample.offset_in_file - min_byte) as usize;
            let packet = &span[from..from + sample.size as usize];
            data.extend(codec.repack_sample(packet, private.nal_length_size)?);
        }

        Ok(ElementaryStream {
            codec,
            data,
            private_data_len,
            samples: targets.samples.clone(),
        })
    }

    fn run_pipeline(&mut self) -> FrameExtractorResult<ElementaryStream> {
        let targets = self.collect_target_samples()?;
        let stream = self.retrieve_elementary_stream(&targets)?;
        self.state = ExtractionState::Done;
        Ok(stream)
    }

    /// Run the whole pipeline, propagating the typed error on failure.
    pub fn extract_elementary_stream(&mut self) -> FrameExtractorResult<ElementaryStream> {
        match self.run_pipeline() {
            Ok(stream) => {
                self.log_summary();
                Ok(stream)
            }
            Err(e) => {
                self.state = ExtractionState::Failed(e.status_code());
                Err(e)
            }
        }
    }

    /// Run the whole pipeline and report a status code and message.
    pub fn extract(&mut self) -> ExtractionOutcome {
        match self.extract_elementary_stream() {
            Ok(stream) => ExtractionOutcome {
                status: SUCCESS_CODE,
                message: format!(
                    "extracted {} samples ({} bytes of {})",
                    stream.samples.len(),
                    stream.data.len(),
                    stream.codec
                ),
                stream: Some(stream),
            },
            Err(e) => ExtractionOutcome {
                status: e.status_code(),
                message: e.to_string(),
                stream: None,
            },
        }
    }

    /// Extract, decode and save the last frame of the target samples to `output`.
    pub fn extract_frame<D: FrameDecoder + ?Sized>(
        &mut self,
        decoder: &mut D,
        output: &Path,
    ) -> (i32, String) {
        let result = self.extract_elementary_stream().and_then(|stream| {
            let frame = decoder.decode_last_frame(stream.codec, &stream.data)?;
            frame.save(output)?;
            Ok(())
        });
        match result {
            Ok(()) => (
                SUCCESS_CODE,
                format!("frame extracted to {}", output.display()),
            ),
            Err(e) => {
                self.state = ExtractionState::Failed(e.status_code());
                (e.status_code(), e.to_string())
            }
        }
    }

    pub fn stats(&self) -> ExtractionStats {
        let file_size = self.cache.file_size();
        ExtractionStats {
            chunks_used: self.cache.chunks_used(),
            chunk_size: self.cache.chunk_size(),
            fetch_requests: self.cache.fetch_requests(),
            bytes_fetched: self.cache.bytes_fetched(),
            file_size,
            bytes_saved: file_size.saturating_sub(self.cache.bytes_fetched()),
        }
    }

    fn log_summary(&self) {
        let stats = self.stats();
        verbose!(self.config.verbose, Summary, "success!");
        verbose!(self.config.verbose, Summary, "used chunks: {}.", stats.chunks_used);
        verbose!(
            self.config.verbose,
            Summary,
            "used memory: {:.2} MB",
            stats.bytes_fetched as f64 / MB_SIZE as f64
        );
        verbose!(
            self.config.verbose,
            Summary,
            "saved memory: {:.2} MB",
            stats.bytes_saved as f64 / MB_SIZE as f64
        );
        if self.config.verbose >= crate::config::Verbosity::Summary {
            self.cache.source().print_stats();
        }
    }
}
