use crate::errors::{FrameExtractorError, FrameExtractorResult};
use serde::{Deserialize, Serialize};

pub const KB_SIZE: u64 = 1024;
pub const MB_SIZE: u64 = 1024 * KB_SIZE;

/// Default fetch granularity (10 KB)
pub const DEFAULT_CHUNK_SIZE: u32 = 10 * KB_SIZE as u32;
pub const DEFAULT_CHUNK_LIMIT: u32 = 1000;
pub const DEFAULT_DOWNLOAD_THRESHOLD: u64 = 10 * MB_SIZE;
pub const DEFAULT_DOWNLOAD_LIMIT: u64 = 100 * MB_SIZE;
pub const DEFAULT_STSC_SIZE_THRESHOLD: u64 = MB_SIZE;
pub const DEFAULT_STSC_SIZE_LIMIT: u64 = 10 * MB_SIZE;

/// Diagnostic verbosity. Higher levels include every lower level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Quiet = 0,
    Summary = 1,
    AlgorithmVars = 2,
    BoxFinders = 3,
    Reading = 4,
}

impl Verbosity {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Quiet,
            1 => Verbosity::Summary,
            2 => Verbosity::AlgorithmVars,
            3 => Verbosity::BoxFinders,
            _ => Verbosity::Reading,
        }
    }
}

/// Options controlling which sample is targeted and how much may be fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Position among sync samples: 0.0 is the first, 1.0 the last
    pub target_frame_mult: f64,
    /// Index into the sync sample table before `target_frame_mult` is applied,
    /// wrapping around (-1 is the last entry)
    pub target_frame_offset: i64,
    /// Samples to include after the target, in decode order
    pub frames_after: u32,
    /// Samples at the end of the track that are never fetched
    pub frames_limit_from_end: u32,
    pub chunk_size: u32,
    /// Hard budget of fetched chunks per extractor instance
    pub chunk_limit: u32,
    /// Sample spans above this size need confirmation
    pub download_threshold: u64,
    /// Sample spans above this size always fail
    pub download_limit: u64,
    pub stsc_size_threshold: u64,
    pub stsc_size_limit: u64,
    pub verbose: Verbosity,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            target_frame_mult: 1.0,
            target_frame_offset: -1,
            frames_after: 0,
            frames_limit_from_end: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            download_threshold: DEFAULT_DOWNLOAD_THRESHOLD,
            download_limit: DEFAULT_DOWNLOAD_LIMIT,
            stsc_size_threshold: DEFAULT_STSC_SIZE_THRESHOLD,
            stsc_size_limit: DEFAULT_STSC_SIZE_LIMIT,
            verbose: Verbosity::Summary,
        }
    }
}

impl ExtractorConfig {
    /// Reject values the extraction pipeline cannot work with.
    pub fn validate(&self) -> FrameExtractorResult<()> {
        if !(0.0..=1.0).contains(&self.target_frame_mult) {
            return Err(FrameExtractorError::InvalidConfig(format!(
                "target_frame_mult must be within [0, 1], got {}",
                self.target_frame_mult
            )));
        }
        if self.chunk_size == 0 {
            return Err(FrameExtractorError::InvalidConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.download_threshold > self.download_limit {
            return Err(FrameExtractorError::InvalidConfig(format!(
                "download_threshold ({}) is above download_limit ({})",
                self.download_threshold, self.download_limit
            )));
        }
        if self.stsc_size_threshold > self.stsc_size_limit {
            return Err(FrameExtractorError::InvalidConfig(format!(
                "stsc_size_threshold ({}) is above stsc_size_limit ({})",
                self.stsc_size_threshold, self.stsc_size_limit
            )));
        }
        Ok(())
    }
}
