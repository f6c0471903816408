pub mod r#box;
pub use r#box::{find_box, BoxKind, BoxRef, FoundBox, FourCc};
pub mod navigator;
pub use navigator::{discover_boxes, look_for_video_trak, ChunkOffsetBox, SampleTableBoxes};
pub mod types;
pub use types::{ChunkDescriptor, SampleDescriptor, SampleInChunk, TargetSamples};
pub mod stss;
pub use stss::{get_target_key_sample, sync_sample_index};
pub mod stsc;
pub use stsc::{get_samples_chunks, resolve_sample_chunks, SampleToChunkEntry};
pub mod stsz;
pub use stsz::{expand_target_range, number_of_samples, samples_sizes_and_offsets};
pub mod stco;
pub use stco::chunks_offsets;
pub mod stsd;
pub use stsd::{find_sample_description, SampleEntry};
