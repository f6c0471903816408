pub mod reader;

pub use reader::{read_bytes, read_u16, read_u32, read_u64, read_u8};
