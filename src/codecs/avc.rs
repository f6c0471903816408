//! H.264 decoder configuration (`avcC`) parsing.

use super::annexb::push_with_start_code;
use super::CodecPrivateData;
use crate::bits::{read_bytes, read_u16, read_u8};
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use std::fmt;

/// H.264 NAL unit types the extractor cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcNalType {
    NonIdr,
    Idr,
    Sei,
    Sps,
    Pps,
    Aud,
    Other(u8),
}

impl AvcNalType {
    pub fn from_header_byte(b: u8) -> Self {
        match b & 0x1f {
            1 => AvcNalType::NonIdr,
            5 => AvcNalType::Idr,
            6 => AvcNalType::Sei,
            7 => AvcNalType::Sps,
            8 => AvcNalType::Pps,
            9 => AvcNalType::Aud,
            v => AvcNalType::Other(v),
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, AvcNalType::NonIdr | AvcNalType::Idr)
    }
}

impl fmt::Display for AvcNalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AvcNalType::NonIdr => "NonIDR_1",
            AvcNalType::Idr => "IDR_5",
            AvcNalType::Sei => "SEI_6",
            AvcNalType::Sps => "SPS_7",
            AvcNalType::Pps => "PPS_8",
            AvcNalType::Aud => "AUD_9",
            AvcNalType::Other(v) => return write!(f, "Other_{v}"),
        };
        f.write_str(s)
    }
}

/// AVCDecoderConfigurationRecord (ISO/IEC 14496-15)
#[derive(Debug, Clone)]
pub struct AvccConfig {
    pub profile: u8,
    pub level: u8,
    /// lengthSizeMinusOne
    pub length_size_minus_one: u8,
    pub sps: Vec<Vec<u8>>,
    pub pps: Vec<Vec<u8>>,
}

fn truncated(what: &str) -> FrameExtractorError {
    FrameExtractorError::FileTruncated(format!("avcC ended while reading {}", what))
}

fn read_parameter_sets(data: &[u8], pos: &mut usize, count: usize, what: &str) -> FrameExtractorResult<Vec<Vec<u8>>> {
    let mut sets = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_u16(data, pos).ok_or_else(|| truncated(what))?;
        let set = read_bytes(data, pos, len as usize).ok_or_else(|| truncated(what))?;
        sets.push(set.to_vec());
    }
    Ok(sets)
}

impl AvccConfig {
    /// `data`: contents of the `avcC` box, without its header.
    pub fn parse(data: &[u8]) -> FrameExtractorResult<Self> {
        if data.len() < 6 {
            return Err(truncated("the header"));
        }
        let profile = data[1];
        let level = data[3];
        let length_size_minus_one = data[4] & 0x03;

        let mut pos = 5;
        let num_sps = read_u8(data, &mut pos).ok_or_else(|| truncated("SPS count"))? & 0x1f;
        let sps = read_parameter_sets(data, &mut pos, num_sps as usize, "SPS")?;
        let num_pps = read_u8(data, &mut pos).ok_or_else(|| truncated("PPS count"))? & 0x1f;
        let pps = read_parameter_sets(data, &mut pos, num_pps as usize, "PPS")?;

        Ok(AvccConfig {
            profile,
            level,
            length_size_minus_one,
            sps,
            pps,
        })
    }

    pub fn nal_length_size(&self) -> u8 {
        self.length_size_minus_one + 1
    }
}

/// SPS then PPS, each behind a start code.
pub fn extract_private_data(config: &[u8]) -> FrameExtractorResult<CodecPrivateData> {
    let avcc = AvccConfig::parse(config)?;
    let mut parameter_sets = Vec::new();
    for set in avcc.sps.iter().chain(&avcc.pps) {
        push_with_start_code(&mut parameter_sets, set);
    }
    Ok(CodecPrivateData {
        nal_length_size: avcc.nal_length_size(),
        parameter_sets,
    })
}

#[cfg(test)]
pub(crate) mod test_helpers {
    /// Build an `avcC` body from parameter sets.
    pub fn avcc_body(length_size_minus_one: u8, sps: &[&[u8]], pps: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![1, 0x4d, 0x40, 0x1e, 0xfc | length_size_minus_one];
        out.push(0xe0 | sps.len() as u8);
        for s in sps {
            out.extend_from_slice(&(s.len() as u16).to_be_bytes());
            out.extend_from_slice(s);
        }
        out.push(pps.len() as u8);
        for p in pps {
            out.extend_from_slice(&(p.len() as u16).to_be_bytes());
            out.extend_from_slice(p);
        }
        out
    }
}
