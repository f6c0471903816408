use std::error::Error;
use std::fmt;
use std::io;

/// Status code reported when an extraction succeeds
pub const SUCCESS_CODE: i32 = 0;

/// Enumeration of all failures that can abort an extraction
#[derive(Debug)]
pub enum FrameExtractorError {
    /// One or more required boxes are absent (names of the boxes sought)
    BoxNotFound(Vec<String>),
    /// No `trak` inside `moov` has a `vide` handler
    VideoTrackNotFound,
    /// Malformed or short box header / record
    FileTruncated(String),
    /// Fetching more chunks would exceed the configured budget
    ChunksLimitExceeded { used: u32, requested: u32, limit: u32 },
    /// The sample-to-chunk table is above the limit or was refused
    StscTooLarge { size: u64 },
    /// The sample byte span is above the limit or was refused
    DownloadLimitExceeded { size: u64 },
    /// No sample description entry carries the requested id
    SampleDescriptionNotFound { id: u16 },
    /// The sample description type has no codec plugin
    CodecNotSupported { found: String },
    /// NAL length field width other than 4 bytes
    UnsupportedNalLength { length: u8 },
    /// Sample table contents are inconsistent
    InvalidSampleTable(String),
    /// Rejected configuration value
    InvalidConfig(String),
    /// Failure surfaced by the decode collaborator
    Decode(DecodeError),
    /// Failure surfaced by the byte source
    Stream(StreamError),
}

/// Byte source specific errors
#[derive(Debug)]
pub struct StreamError {
    pub message: String,
}

impl StreamError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decoder specific errors
#[derive(Debug)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FrameExtractorError {
    /// Stable discriminant usable as a process exit code.
    pub fn status_code(&self) -> i32 {
        match self {
            FrameExtractorError::BoxNotFound(_) => 1,
            FrameExtractorError::VideoTrackNotFound => 2,
            FrameExtractorError::FileTruncated(_) => 3,
            FrameExtractorError::ChunksLimitExceeded { .. } => 4,
            FrameExtractorError::StscTooLarge { .. } => 5,
            FrameExtractorError::DownloadLimitExceeded { .. } => 6,
            FrameExtractorError::SampleDescriptionNotFound { .. } => 7,
            FrameExtractorError::CodecNotSupported { .. } => 8,
            FrameExtractorError::UnsupportedNalLength { .. } => 9,
            FrameExtractorError::Decode(_) => 10,
            FrameExtractorError::InvalidSampleTable(_) => 11,
            FrameExtractorError::InvalidConfig(_) => 12,
            FrameExtractorError::Stream(_) => 99,
        }
    }

    pub(crate) fn box_not_found(names: &[&str]) -> Self {
        FrameExtractorError::BoxNotFound(names.iter().map(|n| n.to_string()).collect())
    }
}

impl fmt::Display for FrameExtractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameExtractorError::BoxNotFound(names) => {
                write!(f, "none of [{}] has been found", names.join(", "))
            }
            FrameExtractorError::VideoTrackNotFound => write!(f, "no video trak found"),
            FrameExtractorError::FileTruncated(message) => {
                write!(f, "file truncated: {}", message)
            }
            FrameExtractorError::ChunksLimitExceeded {
                used,
                requested,
                limit,
            } => write!(
                f,
                "reached chunks limit of {}: {} chunks used, asked for {} more",
                limit, used, requested
            ),
            FrameExtractorError::StscTooLarge { size } => {
                write!(f, "stsc size too big: {} bytes", size)
            }
            FrameExtractorError::DownloadLimitExceeded { size } => {
                write!(f, "download size too big: {} bytes", size)
            }
            FrameExtractorError::SampleDescriptionNotFound { id } => {
                write!(f, "sample description with id {} not found", id)
            }
            FrameExtractorError::CodecNotSupported { found } => {
                write!(f, "codec not supported: found {}", found)
            }
            FrameExtractorError::UnsupportedNalLength { length } => write!(
                f,
                "NAL length field of {} bytes is not supported (only 4)",
                length
            ),
            FrameExtractorError::InvalidSampleTable(message) => {
                write!(f, "invalid sample table: {}", message)
            }
            FrameExtractorError::InvalidConfig(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            FrameExtractorError::Decode(err) => write!(f, "Decode error: {}", err),
            FrameExtractorError::Stream(err) => write!(f, "Stream error: {}", err),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for FrameExtractorError {}
impl Error for StreamError {}
impl Error for DecodeError {}

// Conversion implementations
impl From<io::Error> for FrameExtractorError {
    fn from(err: io::Error) -> Self {
        FrameExtractorError::Stream(StreamError::new(format!("I/O error: {}", err)))
    }
}

impl From<StreamError> for FrameExtractorError {
    fn from(err: StreamError) -> Self {
        FrameExtractorError::Stream(err)
    }
}

impl From<DecodeError> for FrameExtractorError {
    fn from(err: DecodeError) -> Self {
        FrameExtractorError::Decode(err)
    }
}

impl From<FrameExtractorError> for io::Error {
    fn from(err: FrameExtractorError) -> Self {
        io::Error::other(err)
    }
}

// Type alias for Result with FrameExtractorError
pub type FrameExtractorResult<T> = Result<T, FrameExtractorError>;
