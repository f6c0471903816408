//! MPEG-4 Part 2 (`mp4v`) support.

use super::CodecPrivateData;
use crate::errors::{FrameExtractorError, FrameExtractorResult};

/// Start of the decoder specific info inside the `esds` body
const DECODER_SPECIFIC_INFO_OFFSET: usize = 25;

/// The decoder specific info of `esds`. Samples are already start-code delimited.
pub fn extract_private_data(config: &[u8]) -> FrameExtractorResult<CodecPrivateData> {
    let info = config.get(DECODER_SPECIFIC_INFO_OFFSET..).ok_or_else(|| {
        FrameExtractorError::FileTruncated(format!(
            "esds body of {} bytes has no decoder specific info",
            config.len()
        ))
    })?;
    Ok(CodecPrivateData {
        nal_length_size: 4,
        parameter_sets: info.to_vec(),
    })
}
