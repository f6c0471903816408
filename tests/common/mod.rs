#![allow(dead_code)]

//! Synthetic MP4 files for the integration tests.

pub const SPS_BYTES: [u8; 28] = [
    0x67, 0x4d, 0x40, 0x1e, 0xec, 0xc0, 0x50, 0x17, 0xfc, 0xb8, 0x0b, 0x50, 0x10, 0x10, 0x14,
    0x00, 0x00, 0x03, 0x01, 0xf4, 0x00, 0x00, 0x5d, 0xa8, 0x3c, 0x58, 0xb6, 0x68,
];

pub const PPS_BYTES: [u8; 5] = [0x68, 0xe9, 0x79, 0xcb, 0x20];

/// IDR picture NAL unit (without start code) matching the parameter sets above
pub const IDR_NAL: [u8; 89] = [
    0x65, 0x88, 0x84, 0x00, 0x2b, 0xff, 0xfe, 0xf5, 0x27, 0xf8, 0x14, 0xd5, 0x08, 0x44, 0x4b,
    0xe1, 0x6b, 0x61, 0xed, 0xd4, 0xb7, 0x49, 0x30, 0xd1, 0x70, 0xb1, 0x2d, 0xb3, 0xd0, 0x00,
    0x00, 0x03, 0x00, 0x00, 0x03, 0x00, 0x00, 0x18, 0xee, 0xec, 0x61, 0x1a, 0x66, 0xb1, 0x3e,
    0x51, 0xb0, 0xa0, 0x00, 0x00, 0x03, 0x00, 0x5e, 0x40, 0x17, 0xe0, 0x9a, 0x85, 0xa4, 0x3e,
    0x43, 0xb0, 0x35, 0x43, 0xc0, 0x50, 0xc7, 0x58, 0xa7, 0x10, 0x02, 0x04, 0x00, 0x00, 0x03,
    0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x02, 0xdf,
];

pub const AUD_NAL: [u8; 2] = [0x09, 0xf0];

/// Non-IDR slice following the IDR picture
pub const P_SLICE_NAL: [u8; 17] = [
    0x41, 0x9a, 0x24, 0x6c, 0x42, 0xbf, 0xfd, 0xe1, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00,
    0x6a, 0x40,
];

/// Bytes between consecutive chunks in `mdat`
pub const CHUNK_GAP: usize = 16;

pub fn make_box(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn make_full_box(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0, 0, 0, 0];
    body.extend_from_slice(payload);
    make_box(name, &body)
}

fn u32s(values: impl IntoIterator<Item = u32>) -> Vec<u8> {
    values.into_iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// A length-prefixed sample holding one NAL unit of `size - 4` bytes.
pub fn length_prefixed_sample(sample_number: u32, size: u32) -> Vec<u8> {
    let mut out = (size - 4).to_be_bytes().to_vec();
    let header = if sample_number == 1 { 0x65 } else { 0x41 };
    out.push(header);
    out.extend(std::iter::repeat(sample_number as u8).take(size as usize - 5));
    out
}

pub fn avcc_body(sps: &[u8], pps: &[u8]) -> Vec<u8> {
    let mut out = vec![1, sps[1], sps[2], sps[3], 0xff, 0xe1];
    out.extend_from_slice(&(sps.len() as u16).to_be_bytes());
    out.extend_from_slice(sps);
    out.push(1);
    out.extend_from_slice(&(pps.len() as u16).to_be_bytes());
    out.extend_from_slice(pps);
    out
}

pub fn hvcc_body(vps: &[u8], sps: &[u8], pps: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 23];
    out[0] = 1;
    out[21] = 0xff;
    out[22] = 3;
    for (nal_type, nal) in [(32u8, vps), (33, sps), (34, pps)] {
        out.push(0x80 | nal_type);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&(nal.len() as u16).to_be_bytes());
        out.extend_from_slice(nal);
    }
    out
}

/// Everything that varies between the synthetic files
#[derive(Debug, Clone)]
pub struct Mp4Spec {
    pub samples: Vec<Vec<u8>>,
    /// Samples stored in each chunk, in order
    pub chunk_layout: Vec<u32>,
    pub sync_samples: Vec<u32>,
    pub entry_type: [u8; 4],
    pub config_box: (&'static str, Vec<u8>),
    pub co64: bool,
    pub audio_track_first: bool,
}

impl Mp4Spec {
    /// `count` H.264 samples of `size` bytes, `per_chunk` samples per chunk.
    pub fn avc(count: u32, size: u32, per_chunk: u32, sync_samples: &[u32]) -> Self {
        let samples = (1..=count).map(|n| length_prefixed_sample(n, size)).collect();
        let mut chunk_layout = vec![per_chunk; (count / per_chunk) as usize];
        if count % per_chunk != 0 {
            chunk_layout.push(count % per_chunk);
        }
        Mp4Spec {
            samples,
            chunk_layout,
            sync_samples: sync_samples.to_vec(),
            entry_type: *b"avc1",
            config_box: ("avcC", avcc_body(&SPS_BYTES, &PPS_BYTES)),
            co64: false,
            audio_track_first: false,
        }
    }
}

/// A built file and where its samples landed
pub struct Mp4File {
    pub data: Vec<u8>,
    pub sample_offsets: Vec<u64>,
    pub moov_offset: u64,
}

impl Mp4File {
    pub fn sample(&self, spec: &Mp4Spec, sample_number: u32) -> &[u8] {
        let idx = sample_number as usize - 1;
        let start = self.sample_offsets[idx] as usize;
        &self.data[start..start + spec.samples[idx].len()]
    }
}

fn stsc_body(chunk_layout: &[u32]) -> Vec<u8> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for (i, spc) in chunk_layout.iter().enumerate() {
        if runs.last().map(|(_, last)| last) != Some(spc) {
            runs.push((i as u32 + 1, *spc));
        }
    }
    let mut body = (runs.len() as u32).to_be_bytes().to_vec();
    for (first_chunk, spc) in runs {
        body.extend(u32s([first_chunk, spc, 1]));
    }
    body
}

fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
    let mut payload = vec![0, 0, 0, 0];
    payload.extend_from_slice(handler);
    payload.extend_from_slice(&[0; 12]);
    payload.push(0);
    make_full_box("hdlr", &payload)
}

fn trak(handler: &[u8; 4], stbl_children: &[u8]) -> Vec<u8> {
    let stbl = make_box("stbl", stbl_children);
    let minf = make_box("minf", &stbl);
    let mdia = make_box("mdia", &[make_full_box("mdhd", &[0; 20]), hdlr(handler), minf].concat());
    make_box("trak", &[make_full_box("tkhd", &[0; 80]), mdia].concat())
}

fn visual_sample_entry(entry_type: &[u8; 4], config_box: &(&str, Vec<u8>)) -> Vec<u8> {
    let mut payload = vec![0u8; 6];
    // data reference index, used as the description id
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 16]);
    payload.extend_from_slice(&64u16.to_be_bytes());
    payload.extend_from_slice(&48u16.to_be_bytes());
    payload.extend_from_slice(&[0u8; 50]);
    payload.extend(make_box(config_box.0, &config_box.1));
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(entry_type);
    out.extend(payload);
    out
}

/// Lay out `ftyp`, `mdat` (chunks separated by `CHUNK_GAP` bytes) and `moov`.
pub fn build_mp4(spec: &Mp4Spec) -> Mp4File {
    let ftyp = make_box("ftyp", b"isom\x00\x00\x02\x00isomavc1");
    let mdat_start = ftyp.len() + 8;

    let mut mdat = Vec::new();
    let mut chunk_offsets = Vec::new();
    let mut sample_offsets = Vec::new();
    let mut samples = spec.samples.iter();
    for spc in &spec.chunk_layout {
        mdat.extend(std::iter::repeat(0xee).take(CHUNK_GAP));
        chunk_offsets.push((mdat_start + mdat.len()) as u64);
        for sample in samples.by_ref().take(*spc as usize) {
            sample_offsets.push((mdat_start + mdat.len()) as u64);
            mdat.extend_from_slice(sample);
        }
    }
    let mdat = make_box("mdat", &mdat);

    let stsd = make_full_box(
        "stsd",
        &[
            1u32.to_be_bytes().to_vec(),
            visual_sample_entry(&spec.entry_type, &spec.config_box),
        ]
        .concat(),
    );
    let stts = make_full_box("stts", &u32s([1, spec.samples.len() as u32, 1000]));
    let stss = make_full_box(
        "stss",
        &[
            u32s([spec.sync_samples.len() as u32]),
            u32s(spec.sync_samples.iter().copied()),
        ]
        .concat(),
    );
    let stsc = make_full_box("stsc", &stsc_body(&spec.chunk_layout));
    let stsz = make_full_box(
        "stsz",
        &[
            u32s([0, spec.samples.len() as u32]),
            u32s(spec.samples.iter().map(|s| s.len() as u32)),
        ]
        .concat(),
    );
    let offsets = if spec.co64 {
        let mut body = (chunk_offsets.len() as u32).to_be_bytes().to_vec();
        for o in &chunk_offsets {
            body.extend_from_slice(&o.to_be_bytes());
        }
        make_full_box("co64", &body)
    } else {
        make_full_box(
            "stco",
            &[
                u32s([chunk_offsets.len() as u32]),
                u32s(chunk_offsets.iter().map(|o| *o as u32)),
            ]
            .concat(),
        )
    };

    let video = trak(b"vide", &[stsd, stts, stss, stsc, stsz, offsets].concat());
    let mut traks = Vec::new();
    if spec.audio_track_first {
        traks.extend(trak(b"soun", &make_full_box("stsd", &[0, 0, 0, 0])));
    }
    traks.extend(video);
    let moov = make_box("moov", &[make_full_box("mvhd", &[0; 96]), traks].concat());

    let moov_offset = (ftyp.len() + mdat.len()) as u64;
    Mp4File {
        data: [ftyp, mdat, moov].concat(),
        sample_offsets,
        moov_offset,
    }
}

/// A file whose single sample holds a decodable H.264 access unit.
pub fn decodable_mp4() -> (Mp4Spec, Mp4File) {
    let mut sample = Vec::new();
    for nal in [&IDR_NAL[..], &AUD_NAL[..], &P_SLICE_NAL[..]] {
        sample.extend_from_slice(&(nal.len() as u32).to_be_bytes());
        sample.extend_from_slice(nal);
    }
    let spec = Mp4Spec {
        samples: vec![sample],
        chunk_layout: vec![1],
        sync_samples: vec![1],
        ..Mp4Spec::avc(1, 8, 1, &[1])
    };
    let file = build_mp4(&spec);
    (spec, file)
}
