use crate::errors::{FrameExtractorError, FrameExtractorResult};

pub const START_CODE: [u8; 4] = [0, 0, 0, 1];

/// Append `nal` to `out` behind a 4-byte start code.
pub fn push_with_start_code(out: &mut Vec<u8>, nal: &[u8]) {
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(nal);
}

/// Replace the length prefixes of a sample with start codes.
///
/// Only 4-byte length fields are supported; a record running past the end of
/// the sample is a truncation.
pub fn length_prefixed_to_annexb(sample: &[u8], nal_length_size: u8) -> FrameExtractorResult<Vec<u8>> {
    if nal_length_size != 4 {
        return Err(FrameExtractorError::UnsupportedNalLength {
            length: nal_length_size,
        });
    }

    let mut out = Vec::with_capacity(sample.len());
    let mut pos = 0usize;
    while pos < sample.len() {
        if pos + 4 > sample.len() {
            return Err(FrameExtractorError::FileTruncated(format!(
                "NAL length field at {} runs past the {} byte sample",
                pos,
                sample.len()
            )));
        }
        let len = u32::from_be_bytes([
            sample[pos],
            sample[pos + 1],
            sample[pos + 2],
            sample[pos + 3],
        ]) as usize;
        pos += 4;
        let end = pos.checked_add(len).filter(|end| *end <= sample.len());
        let Some(end) = end else {
            return Err(FrameExtractorError::FileTruncated(format!(
                "NAL unit of {} bytes at {} runs past the {} byte sample",
                len,
                pos,
                sample.len()
            )));
        };
        push_with_start_code(&mut out, &sample[pos..end]);
        pos = end;
    }
    Ok(out)
}

/// Split an Annex-B byte stream into NAL units without their start codes.
///
/// Both 3 and 4 byte start codes are recognized; trailing zero bytes before a
/// start code belong to the start code.
pub fn split_annexb(stream: &[u8]) -> Vec<&[u8]> {
    let mut nals = Vec::new();
    let mut pos = 0usize;
    let mut current: Option<usize> = None;

    while pos + 3 <= stream.len() {
        if stream[pos..pos + 3] == [0, 0, 1] {
            if let Some(start) = current {
                push_trimmed(stream, start, pos, &mut nals);
            }
            current = Some(pos + 3);
            pos += 3;
            continue;
        }
        pos += 1;
    }
    if let Some(start) = current {
        push_trimmed(stream, start, stream.len(), &mut nals);
    }
    nals
}

fn push_trimmed<'a>(stream: &'a [u8], start: usize, mut end: usize, nals: &mut Vec<&'a [u8]>) {
    while end > start && stream[end - 1] == 0 {
        end -= 1;
    }
    if end > start {
        nals.push(&stream[start..end]);
    }
}
