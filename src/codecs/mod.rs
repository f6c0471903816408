//! Per-codec parameter set extraction and sample repacking.
//!
//! The codec of a track is picked from its sample entry FourCC. Each codec
//! names the configuration box it reads and turns samples into a stream a
//! decoder can consume on its own.

pub mod annexb;
pub mod avc;
pub mod hevc;
pub mod mpeg4;

pub use annexb::{length_prefixed_to_annexb, split_annexb, START_CODE};
pub use avc::{AvcNalType, AvccConfig};

use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::mp4::r#box::{BoxKind, FourCc};
use std::fmt;

/// Parameter sets ready to be prepended to the repacked samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecPrivateData {
    /// Size of the length field in front of each NAL unit of a sample
    pub nal_length_size: u8,
    pub parameter_sets: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    H264,
    H265,
    Mpeg4Visual,
}

const CODECS: &[(FourCc, VideoCodec)] = &[
    (FourCc::new(b"avc1"), VideoCodec::H264),
    (FourCc::new(b"avc3"), VideoCodec::H264),
    (FourCc::new(b"hev1"), VideoCodec::H265),
    (FourCc::new(b"hvc1"), VideoCodec::H265),
    (FourCc::new(b"mp4v"), VideoCodec::Mpeg4Visual),
];

impl VideoCodec {
    pub fn from_fourcc(fourcc: FourCc) -> Option<Self> {
        CODECS
            .iter()
            .find(|(code, _)| *code == fourcc)
            .map(|(_, codec)| *codec)
    }

    pub fn codec_name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Mpeg4Visual => "mpeg4",
        }
    }

    /// Configuration box expected among the sample entry's children.
    pub fn config_box(&self) -> BoxKind {
        match self {
            VideoCodec::H264 => BoxKind::AvcC,
            VideoCodec::H265 => BoxKind::HvcC,
            VideoCodec::Mpeg4Visual => BoxKind::Esds,
        }
    }

    /// `config` is the body of the configuration box, without its header.
    pub fn extract_private_data(&self, config: &[u8]) -> FrameExtractorResult<CodecPrivateData> {
        match self {
            VideoCodec::H264 => avc::extract_private_data(config),
            VideoCodec::H265 => hevc::extract_private_data(config),
            VideoCodec::Mpeg4Visual => mpeg4::extract_private_data(config),
        }
    }

    pub fn repack_sample(&self, sample: &[u8], nal_length_size: u8) -> FrameExtractorResult<Vec<u8>> {
        match self {
            VideoCodec::H264 | VideoCodec::H265 => length_prefixed_to_annexb(sample, nal_length_size),
            VideoCodec::Mpeg4Visual => Ok(sample.to_vec()),
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_name())
    }
}

/// Codec for a sample entry type, or `CodecNotSupported`.
pub fn select_codec(fourcc: FourCc) -> FrameExtractorResult<VideoCodec> {
    VideoCodec::from_fourcc(fourcc).ok_or_else(|| FrameExtractorError::CodecNotSupported {
        found: fourcc.to_string(),
    })
}
