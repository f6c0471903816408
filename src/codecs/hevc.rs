//! H.265 decoder configuration (`hvcC`) parsing.

use super::annexb::push_with_start_code;
use super::CodecPrivateData;
use crate::bits::{read_bytes, read_u16, read_u8};
use crate::errors::{FrameExtractorError, FrameExtractorResult};

/// Offset of `lengthSizeMinusOne` in the record
const LENGTH_SIZE_OFFSET: usize = 21;
/// Offset of the first NAL array, right after `numOfArrays`
const ARRAYS_OFFSET: usize = 23;
/// VPS, SPS and PPS
const MAX_ARRAYS: usize = 3;

fn truncated(what: &str) -> FrameExtractorError {
    FrameExtractorError::FileTruncated(format!("hvcC ended while reading {}", what))
}

/// Parameter sets of the first three NAL arrays, each behind a start code.
pub fn extract_private_data(config: &[u8]) -> FrameExtractorResult<CodecPrivateData> {
    if config.len() < ARRAYS_OFFSET {
        return Err(truncated("the header"));
    }
    let nal_length_size = (config[LENGTH_SIZE_OFFSET] & 0x03) + 1;

    let mut parameter_sets = Vec::new();
    let mut pos = ARRAYS_OFFSET;
    let mut arrays = 0;
    while pos < config.len() && arrays < MAX_ARRAYS {
        // array_completeness, reserved, NAL_unit_type
        read_u8(config, &mut pos).ok_or_else(|| truncated("array type"))?;
        let count = read_u16(config, &mut pos).ok_or_else(|| truncated("NAL count"))?;
        for _ in 0..count {
            let len = read_u16(config, &mut pos).ok_or_else(|| truncated("NAL length"))?;
            let nal = read_bytes(config, &mut pos, len as usize).ok_or_else(|| truncated("NAL unit"))?;
            push_with_start_code(&mut parameter_sets, nal);
        }
        arrays += 1;
    }

    Ok(CodecPrivateData {
        nal_length_size,
        parameter_sets,
    })
}
