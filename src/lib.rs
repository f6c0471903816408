#[macro_use]
mod macros;

pub mod bits;

pub mod errors;
pub use errors::{DecodeError, FrameExtractorError, FrameExtractorResult, StreamError, SUCCESS_CODE};

pub mod config;
pub use config::{ExtractorConfig, Verbosity};

pub mod streams;
pub use streams::{ByteSource, FileByteSource, HttpByteSource, MemoryByteSource};

pub mod cache;
pub use cache::ChunkCache;

pub mod mp4;

pub mod codecs;
pub use codecs::{CodecPrivateData, VideoCodec};

pub mod policy;
pub use policy::{AlwaysConfirm, ConfirmKind, ConfirmRequest, ConfirmationPolicy, RejectAll};

pub mod decoder;
pub use decoder::{DecodedFrame, FrameDecoder, OpenH264Decoder};

pub mod extractor;
pub use extractor::{
    ElementaryStream, ExtractionOutcome, ExtractionState, ExtractionStats, FrameExtractor,
};

use std::path::Path;

macro_rules! with_byte_source {
    ($source:expr, $body:expr) => {
        if $source.starts_with("http://") || $source.starts_with("https://") {
            let source = HttpByteSource::new($source)?;
            $body(source)
        } else {
            let source = FileByteSource::open($source)?;
            $body(source)
        }
    };
}

/// Extract the elementary stream of the configured target samples from a local
/// path or an http(s) URL.
pub fn extract_elementary_stream(
    source: &str,
    config: ExtractorConfig,
) -> FrameExtractorResult<ElementaryStream> {
    with_byte_source!(source, |s| {
        FrameExtractor::new(s, config)?.extract_elementary_stream()
    })
}

/// Extract the target frame from a local path or an http(s) URL and save it to
/// `output`. Returns the status code and message of the extraction.
pub fn extract_frame_to_file<P: ConfirmationPolicy + 'static>(
    source: &str,
    output: &Path,
    config: ExtractorConfig,
    policy: P,
) -> FrameExtractorResult<(i32, String)> {
    let mut decoder = OpenH264Decoder::new();
    with_byte_source!(source, |s| {
        let mut extractor = FrameExtractor::new(s, config)?.with_policy(policy);
        Ok::<_, FrameExtractorError>(extractor.extract_frame(&mut decoder, output))
    })
}
