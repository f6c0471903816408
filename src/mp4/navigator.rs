use super::r#box::{find_box, BoxKind, BoxRef, FourCc};
use crate::cache::ChunkCache;
use crate::config::Verbosity;
use crate::errors::{FrameExtractorError, FrameExtractorResult};
use crate::streams::ByteSource;

const VIDEO_HANDLER: FourCc = FourCc::new(b"vide");

/// The chunk offset table in either of its two widths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOffsetBox {
    /// 32-bit offsets
    Stco(BoxRef),
    /// 64-bit offsets
    Co64(BoxRef),
}

impl ChunkOffsetBox {
    pub fn box_ref(&self) -> BoxRef {
        match self {
            ChunkOffsetBox::Stco(b) | ChunkOffsetBox::Co64(b) => *b,
        }
    }

    /// Width in bytes of one table entry.
    pub fn entry_size(&self) -> u64 {
        match self {
            ChunkOffsetBox::Stco(_) => 4,
            ChunkOffsetBox::Co64(_) => 8,
        }
    }
}

/// Sample table boxes of the video track, located once per extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTableBoxes {
    pub stsd: BoxRef,
    pub stss: BoxRef,
    pub stsc: BoxRef,
    pub stsz: BoxRef,
    pub chunk_offsets: ChunkOffsetBox,
}

impl SampleTableBoxes {
    pub fn get(&self, kind: BoxKind) -> Option<BoxRef> {
        match (kind, self.chunk_offsets) {
            (BoxKind::Stsd, _) => Some(self.stsd),
            (BoxKind::Stss, _) => Some(self.stss),
            (BoxKind::Stsc, _) => Some(self.stsc),
            (BoxKind::Stsz, _) => Some(self.stsz),
            (BoxKind::Stco, ChunkOffsetBox::Stco(b)) => Some(b),
            (BoxKind::Co64, ChunkOffsetBox::Co64(b)) => Some(b),
            _ => None,
        }
    }
}

/// The video `trak` and its `mdia` box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTrack {
    /// 0-based position among the `trak` boxes of `moov`
    pub index: usize,
    pub mdia: BoxRef,
}

fn find_child<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    kind: BoxKind,
    parent: &BoxRef,
) -> FrameExtractorResult<BoxRef> {
    Ok(find_box(cache, Some(kind), parent.content_start(), parent.end())?.box_ref)
}

/// Find the first `trak` in `moov` whose handler type is `vide`.
pub fn look_for_video_trak<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    moov: &BoxRef,
    verbose: Verbosity,
) -> FrameExtractorResult<VideoTrack> {
    let mut offset = moov.content_start();
    let mut index = 0usize;

    while offset + 8 <= moov.end() {
        let trak = match find_box(cache, Some(BoxKind::Trak), offset, moov.end()) {
            Ok(found) => found.box_ref,
            Err(FrameExtractorError::BoxNotFound(_)) => break,
            Err(e) => return Err(e),
        };
        let mdia = find_child(cache, BoxKind::Mdia, &trak)?;
        let hdlr = find_child(cache, BoxKind::Hdlr, &mdia)?;

        // skip version/flags and pre_defined
        let handler = cache.read_fourcc(hdlr.content_start() + 8)?;
        verbose!(verbose, BoxFinders, "trak {} type: {}", index, handler);

        if handler == VIDEO_HANDLER {
            return Ok(VideoTrack { index, mdia });
        }

        offset = trak.end();
        index += 1;
    }

    Err(FrameExtractorError::VideoTrackNotFound)
}

/// Walk `moov` → video `trak` → `mdia` → `minf` → `stbl` and locate the sample tables.
pub fn discover_boxes<S: ByteSource>(
    cache: &mut ChunkCache<S>,
    verbose: Verbosity,
) -> FrameExtractorResult<SampleTableBoxes> {
    let file_size = cache.file_size();
    let moov = find_box(cache, Some(BoxKind::Moov), 0, file_size)?.box_ref;
    verbose!(
        verbose,
        BoxFinders,
        "found! moov    size    {:12} at {}",
        moov.size,
        moov.offset
    );

    let track = look_for_video_trak(cache, &moov, verbose)?;
    verbose!(verbose, BoxFinders, "Video Trak Number {} found", track.index);

    let minf = find_child(cache, BoxKind::Minf, &track.mdia)?;
    let stbl = find_child(cache, BoxKind::Stbl, &minf)?;

    let stsd = find_child(cache, BoxKind::Stsd, &stbl)?;
    let stss = find_child(cache, BoxKind::Stss, &stbl)?;
    let stsc = find_child(cache, BoxKind::Stsc, &stbl)?;
    let stsz = find_child(cache, BoxKind::Stsz, &stbl)?;
    let chunk_offsets = match find_child(cache, BoxKind::Stco, &stbl) {
        Ok(stco) => ChunkOffsetBox::Stco(stco),
        Err(FrameExtractorError::BoxNotFound(_)) => match find_child(cache, BoxKind::Co64, &stbl) {
            Ok(co64) => ChunkOffsetBox::Co64(co64),
            Err(FrameExtractorError::BoxNotFound(_)) => {
                return Err(FrameExtractorError::box_not_found(&["stco", "co64"]))
            }
            Err(e) => return Err(e),
        },
        Err(e) => return Err(e),
    };

    let boxes = SampleTableBoxes {
        stsd,
        stss,
        stsc,
        stsz,
        chunk_offsets,
    };
    verbose!(verbose, BoxFinders, "sample table boxes: {:?}", boxes);
    Ok(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::r#box::test_boxes::{make_box, make_full_box};
    use crate::streams::MemoryByteSource;

    fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
        let mut payload = vec![0, 0, 0, 0];
        payload.extend_from_slice(handler);
        payload.extend_from_slice(&[0; 12]);
        make_full_box("hdlr", &payload)
    }

    fn trak(handler: &[u8; 4], stbl_children: &[Vec<u8>]) -> Vec<u8> {
        let stbl = make_box("stbl", &stbl_children.concat());
        let minf = make_box("minf", &stbl);
        let mdia = make_box("mdia", &[hdlr(handler), minf].concat());
        make_box("trak", &mdia)
    }

    fn all_tables(offsets_box: &str) -> Vec<Vec<u8>> {
        vec![
            make_full_box("stsd", &[0, 0, 0, 0]),
            make_full_box("stss", &[0, 0, 0, 0]),
            make_full_box("stsc", &[0, 0, 0, 0]),
            make_full_box("stsz", &[0; 8]),
            make_full_box(offsets_box, &[0, 0, 0, 0]),
        ]
    }

    fn cache_over(data: Vec<u8>) -> ChunkCache<MemoryByteSource> {
        ChunkCache::new(MemoryByteSource::new(data), 32, 1000, Verbosity::Quiet)
    }

    #[test]
    fn test_skips_audio_track() {
        let moov = make_box(
            "moov",
            &[trak(b"soun", &[]), trak(b"vide", &all_tables("stco"))].concat(),
        );
        let data = [make_box("ftyp", &[0; 8]), moov].concat();
        let mut cache = cache_over(data);

        let file_size = cache.file_size();
        let moov_ref = find_box(&mut cache, Some(BoxKind::Moov), 0, file_size)
            .unwrap()
            .box_ref;
        let track = look_for_video_trak(&mut cache, &moov_ref, Verbosity::Quiet).unwrap();
        assert_eq!(track.index, 1);

        let boxes = discover_boxes(&mut cache, Verbosity::Quiet).unwrap();
        assert!(matches!(boxes.chunk_offsets, ChunkOffsetBox::Stco(_)));
        assert_eq!(boxes.get(BoxKind::Stco), Some(boxes.chunk_offsets.box_ref()));
        assert_eq!(boxes.get(BoxKind::Co64), None);
        assert!(boxes.stsd.offset < boxes.stss.offset);
    }

    #[test]
    fn test_falls_back_to_co64() {
        let data = make_box("moov", &trak(b"vide", &all_tables("co64")));
        let mut cache = cache_over(data);
        let boxes = discover_boxes(&mut cache, Verbosity::Quiet).unwrap();
        assert!(matches!(boxes.chunk_offsets, ChunkOffsetBox::Co64(_)));
        assert_eq!(boxes.chunk_offsets.entry_size(), 8);
    }

    #[test]
    fn test_no_video_track() {
        let data = make_box("moov", &[trak(b"soun", &[]), trak(b"text", &[])].concat());
        let mut cache = cache_over(data);
        assert!(matches!(
            discover_boxes(&mut cache, Verbosity::Quiet),
            Err(FrameExtractorError::VideoTrackNotFound)
        ));
    }

    #[test]
    fn test_missing_offsets_table_names_both_boxes() {
        let mut tables = all_tables("stco");
        tables.pop();
        let data = make_box("moov", &trak(b"vide", &tables));
        let mut cache = cache_over(data);
        match discover_boxes(&mut cache, Verbosity::Quiet) {
            Err(FrameExtractorError::BoxNotFound(names)) => {
                assert_eq!(names, vec!["stco", "co64"])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_stss() {
        let mut tables = all_tables("stco");
        tables.remove(1);
        let data = make_box("moov", &trak(b"vide", &tables));
        let mut cache = cache_over(data);
        match discover_boxes(&mut cache, Verbosity::Quiet) {
            Err(FrameExtractorError::BoxNotFound(names)) => assert_eq!(names, vec!["stss"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_moov() {
        let mut cache = cache_over(make_box("ftyp", &[0; 8]));
        match discover_boxes(&mut cache, Verbosity::Quiet) {
            Err(FrameExtractorError::BoxNotFound(names)) => assert_eq!(names, vec!["moov"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
