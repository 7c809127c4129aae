mod stream_reader;

pub use stream_reader::{read_i32_le, read_u32_le, StreamReader};
