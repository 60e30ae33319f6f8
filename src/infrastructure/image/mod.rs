//! Image transcoding infrastructure.

pub mod transcoder;

pub use transcoder::{CodecTranscoder, CodecTranscoderConfig};
