use super::{DecodedFrame, FrameDecoder};
use crate::codecs::{split_annexb, AvcNalType, VideoCodec, START_CODE};
use crate::errors::DecodeError;
use log::{debug, warn};
use openh264::decoder::Decoder;
use openh264::formats::YUVSource;

/// H.264 decoding through OpenH264.
///
/// The stream is fed one NAL unit at a time; the last picture the decoder
/// produces wins.
#[derive(Debug, Default)]
pub struct OpenH264Decoder {
    frames_decoded: usize,
}

impl OpenH264Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pictures produced by the last call to `decode_last_frame`.
    pub fn frames_decoded(&self) -> usize {
        self.frames_decoded
    }
}

impl FrameDecoder for OpenH264Decoder {
    fn decode_last_frame(
        &mut self,
        codec: VideoCodec,
        stream: &[u8],
    ) -> Result<DecodedFrame, DecodeError> {
        if codec != VideoCodec::H264 {
            return Err(DecodeError::new(format!(
                "the bundled decoder only handles h264, stream is {}",
                codec
            )));
        }

        let mut decoder = Decoder::new()
            .map_err(|e| DecodeError::new(format!("Failed to create decoder: {}", e)))?;

        self.frames_decoded = 0;
        let mut last = None;
        let mut nal_data = Vec::new();
        for nal in split_annexb(stream) {
            let nal_type = AvcNalType::from_header_byte(nal[0]);
            nal_data.clear();
            nal_data.extend_from_slice(&START_CODE);
            nal_data.extend_from_slice(nal);

            match decoder.decode(&nal_data) {
                Ok(Some(yuv)) => {
                    let (width, height) = yuv.dimensions();
                    let mut rgb = vec![0u8; yuv.rgb8_len()];
                    yuv.write_rgb8(&mut rgb);
                    self.frames_decoded += 1;
                    debug!("decoded {}x{} picture from {}", width, height, nal_type);
                    last = Some(DecodedFrame {
                        width: width as u32,
                        height: height as u32,
                        rgb,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to decode {} NAL unit: {}", nal_type, e);
                }
            }
        }

        last.ok_or_else(|| DecodeError::new("Decoder returned no frame"))
    }
}


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_decodes_last_frame() {
        let mut decoder = OpenH264Decoder::new();
        let frame = decoder
            .decode_last_frame(VideoCodec::H264, &elementary_stream())
            .unwrap();
        assert!(frame.width > 0 && frame.height > 0);
        assert_eq!(frame.rgb.len(), (frame.width * frame.height * 3) as usize);
        assert!(decoder.frames_decoded() >= 1);
    }

    #[test]
    fn test_parameter_sets_alone_give_no_frame() {
        let mut stream = elementary_stream();
        stream.truncate(4 + SPS_BYTES.len() + 4 + PPS_BYTES.len());
        let mut decoder = OpenH264Decoder::new();
        assert!(decoder.decode_last_frame(VideoCodec::H264, &stream).is_err());
    }

    #[test]
    fn test_other_codecs_are_refused() {
        let mut decoder = OpenH264Decoder::new();
        let err = decoder
            .decode_last_frame(VideoCodec::H265, &elementary_stream())
            .unwrap_err();
        assert!(err.message.contains("h265"));
    }
}
