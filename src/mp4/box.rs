use crate::cache::ChunkCache;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;
use std::fmt;

/// Four character code of a box or sample entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const fn new(code: &[u8; 4]) -> Self {
        FourCc(*code)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// The boxes the extractor ever looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxKind {
    Moov,
    Trak,
    Mdia,
    Hdlr,
    Minf,
    Stbl,
    Stsd,
    Stss,
    Stsc,
    Stsz,
    Stco,
    Co64,
    AvcC,
    HvcC,
    Esds,
}

impl BoxKind {
    pub fn fourcc(self) -> FourCc {
        let b = self.name().as_bytes();
        FourCc([b[0], b[1], b[2], b[3]])
    }

    pub fn name(self) -> &'static str {
        match self {
            BoxKind::Moov => "moov",
            BoxKind::Trak => "trak",
            BoxKind::Mdia => "mdia",
            BoxKind::Hdlr => "hdlr",
            BoxKind::Minf => "minf",
            BoxKind::Stbl => "stbl",
            BoxKind::Stsd => "stsd",
            BoxKind::Stss => "stss",
            BoxKind::Stsc => "stsc",
            BoxKind::Stsz => "stsz",
            BoxKind::Stco => "stco",
            BoxKind::Co64 => "co64",
            BoxKind::AvcC => "avcC",
            BoxKind::HvcC => "hvcC",
            BoxKind::Esds => "esds",
        }
    }
}

/// Location of a box in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRef {
    /// File offset of the box header
    pub offset: u64,
    /// Full size including the header
    pub size: u64,
    /// 8, or 16 for boxes with a 64-bit size
    pub header_size: u8,
}

impl BoxRef {
    pub fn content_start(&self) -> u64 {
        self.offset + self.header_size as u64
    }

    pub fn content_size(&self) -> u64 {
        self.size - self.header_size as u64
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Result of a box search: where it is and what it turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundBox {
    pub box_ref: BoxRef,
    pub name: FourCc,
}

/// Scan sibling boxes in `[start, end)` for the first box of kind `query`,
/// or the first box of any kind when `query` is `None`.
pub fn find_box<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    query: Option<BoxKind>,
    start: u64,
    end: u64,
) -> FrameExtractorResult<FoundBox> {
    let wanted = query.map(BoxKind::fourcc);
    let not_found = || match query {
        Some(kind) => FrameExtractorError::box_not_found(&[kind.name()]),
        None => FrameExtractorError::box_not_found(&["*"]),
    };

    let mut offset = start;
    while offset.saturating_add(8) <= end {
        let header = cache.get_bytes(offset, 8)?;
        let size32 = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let name = FourCc([header[4], header[5], header[6], header[7]]);
        let matches = wanted.map_or(true, |w| w == name);

        let (size, header_size) = match size32 {
            // box extends to the end of the range, nothing can follow it
            0 => {
                if !matches {
                    return Err(not_found());
                }
                (end - offset, 8u8)
            }
            1 => {
                if offset + 16 > end {
                    return Err(FrameExtractorError::FileTruncated(format!(
                        "64-bit size of box {} at {} is cut",
                        name, offset
                    )));
                }
                (cache.read_u64(offset + 8)?, 16u8)
            }
            2..=7 => {
                return Err(FrameExtractorError::FileTruncated(format!(
                    "box {} at {} has invalid size {}",
                    name, offset, size32
                )));
            }
            size => (size as u64, 8u8),
        };

        if size < header_size as u64 {
            return Err(FrameExtractorError::FileTruncated(format!(
                "box {} at {} has invalid size {}",
                name, offset, size
            )));
        }

        if matches {
            if offset.saturating_add(size) > end {
                return Err(FrameExtractorError::FileTruncated(format!(
                    "box {} at {} claims {} bytes, only {} available",
                    name,
                    offset,
                    size,
                    end - offset
                )));
            }
            return Ok(FoundBox {
                box_ref: BoxRef {
                    offset,
                    size,
                    header_size,
                },
                name,
            });
        }

        offset = offset.saturating_add(size);
    }

    Err(not_found())
}

/// Write a box header to a vector
pub fn write_box_header(output: &mut Vec<u8>, name: &str, size: u32) {
    output.extend_from_slice(&size.to_be_bytes());
    output.extend_from_slice(name.as_bytes());
}


#[cfg(test)]
mod tests {
    use super::test_boxes::make_box;
    use super::*;
    use crate::config::Verbosity;
    use crate::streams::MemoryByteSource;

    fn cache_over(data: Vec<u8>) -> ChunkCache<MemoryByteSource> {
        ChunkCache::new(MemoryByteSource::new(data), 16, 1000, Verbosity::Quiet)
    }

    #[test]
    fn test_finds_named_box_after_siblings() {
        let data = [
            make_box("ftyp", &[0; 12]),
            make_box("free", &[]),
            make_box("moov", &[1, 2, 3]),
        ]
        .concat();
        let len = data.len() as u64;
        let mut cache = cache_over(data);

        let found = find_box(&mut cache, Some(BoxKind::Moov), 0, len).unwrap();
        assert_eq!(found.name, FourCc::new(b"moov"));
        assert_eq!(found.box_ref.offset, 28);
        assert_eq!(found.box_ref.size, 11);
        assert_eq!(found.box_ref.content_start(), 36);
        assert_eq!(found.box_ref.end(), len);
    }

    #[test]
    fn test_wildcard_returns_first_box() {
        let data = [make_box("ftyp", &[0; 4]), make_box("moov", &[])].concat();
        let mut cache = cache_over(data);
        let found = find_box(&mut cache, None, 0, 20).unwrap();
        assert_eq!(found.name.to_string(), "ftyp");
        let found = find_box(&mut cache, None, 12, 20).unwrap();
        assert_eq!(found.name.to_string(), "moov");
    }

    #[test]
    fn test_missing_box_is_reported_by_name() {
        let data = make_box("free", &[0; 8]);
        let mut cache = cache_over(data);
        match find_box(&mut cache, Some(BoxKind::Stss), 0, 16) {
            Err(FrameExtractorError::BoxNotFound(names)) => assert_eq!(names, vec!["stss"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_64_bit_size() {
        let mut data = Vec::new();
        write_box_header(&mut data, "mdat", 1);
        data.extend_from_slice(&24u64.to_be_bytes());
        data.extend_from_slice(&[0xaa; 8]);
        data.extend(make_box("moov", &[]));
        let mut cache = cache_over(data);

        let mdat = find_box(&mut cache, None, 0, 32).unwrap();
        assert_eq!(mdat.box_ref.header_size, 16);
        assert_eq!(mdat.box_ref.size, 24);
        assert_eq!(mdat.box_ref.content_size(), 8);
        let moov = find_box(&mut cache, Some(BoxKind::Moov), 0, 32).unwrap();
        assert_eq!(moov.box_ref.offset, 24);
    }

    #[test]
    fn test_size_zero_extends_to_end_of_range() {
        let mut data = make_box("free", &[]);
        write_box_header(&mut data, "moov", 0);
        data.extend_from_slice(&[0; 12]);
        let mut cache = cache_over(data);

        let moov = find_box(&mut cache, Some(BoxKind::Moov), 0, 28).unwrap();
        assert_eq!(moov.box_ref.offset, 8);
        assert_eq!(moov.box_ref.size, 20);
    }

    #[test]
    fn test_size_zero_on_non_matching_box_ends_search() {
        let mut data = Vec::new();
        write_box_header(&mut data, "mdat", 0);
        data.extend_from_slice(&[0; 8]);
        data.extend(make_box("moov", &[]));
        let mut cache = cache_over(data);

        assert!(matches!(
            find_box(&mut cache, Some(BoxKind::Moov), 0, 24),
            Err(FrameExtractorError::BoxNotFound(_))
        ));
    }

    #[test]
    fn test_size_below_header_is_truncation() {
        let mut data = Vec::new();
        write_box_header(&mut data, "moov", 4);
        data.extend_from_slice(&[0; 8]);
        let mut cache = cache_over(data);

        assert!(matches!(
            find_box(&mut cache, Some(BoxKind::Moov), 0, 16),
            Err(FrameExtractorError::FileTruncated(_))
        ));
    }

    #[test]
    fn test_matched_box_cannot_escape_range() {
        let mut data = Vec::new();
        write_box_header(&mut data, "stbl", 64);
        data.extend_from_slice(&[0; 8]);
        let mut cache = cache_over(data);

        assert!(matches!(
            find_box(&mut cache, Some(BoxKind::Stbl), 0, 16),
            Err(FrameExtractorError::FileTruncated(_))
        ));
    }

    #[test]
    fn test_box_kind_names() {
        assert_eq!(BoxKind::AvcC.fourcc(), FourCc::new(b"avcC"));
        assert_eq!(BoxKind::Co64.fourcc().to_string(), "co64");
    }
}
