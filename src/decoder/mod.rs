//! Decode boundary: turns an elementary stream into the picture of its last frame.

mod h264;

pub use h264::OpenH264Decoder;

use crate::codecs::VideoCodec;
use crate::errors::DecodeError;
use image::RgbImage;
use std::path::Path;

/// A decoded picture in packed RGB8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl DecodedFrame {
    pub fn to_rgb_image(&self) -> Result<RgbImage, DecodeError> {
        RgbImage::from_raw(self.width, self.height, self.rgb.clone()).ok_or_else(|| {
            DecodeError::new(format!(
                "{} RGB bytes do not fill a {}x{} picture",
                self.rgb.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Save the picture; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), DecodeError> {
        self.to_rgb_image()?.save(path).map_err(|e| {
            DecodeError::new(format!("Failed to save frame to {}: {}", path.display(), e))
        })
    }
}

/// Something that can decode an elementary stream produced by the extractor
pub trait FrameDecoder {
    /// Decode `stream` and return its last complete frame.
    fn decode_last_frame(
        &mut self,
        codec: VideoCodec,
        stream: &[u8],
    ) -> Result<DecodedFrame, DecodeError>;
}
