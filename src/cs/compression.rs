//! Compression algorithms implementation.
//!
//! This module provides:
//! - Adaptive Huffman coding over bytes, with streaming encoder and decoder
//!
//! # Examples
//!
//! ```rust
//! use adaptive_huffman::cs::compression::{AdaptiveHuffman, Compression};
//!
//! let codec = AdaptiveHuffman::default();
//! let packed = codec.compress(b"aaaaaaaabbbb").unwrap();
//! assert_eq!(codec.decompress(&packed).unwrap(), b"aaaaaaaabbbb".to_vec());
//! ```

use crate::cs::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Trait for streaming coders that push their output into a sink.
///
/// Implemented by both halves of a codec: an encoder takes raw bytes and writes
/// compressed ones, a decoder the reverse.
pub trait Coder {
    /// Where output goes; returned by [`Coder::finish`].
    type Sink;

    /// Process a chunk of input data
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Push all pending output to the sink
    fn flush(&mut self) -> Result<()>;

    /// End the stream and release the sink
    fn finish(self) -> Result<Self::Sink>
    where
        Self: Sized;
}

pub mod adaptive_huffman;
pub use adaptive_huffman::{
    compress, decompress, decompress_exact, AdaptiveHuffman, AdaptiveTree, Decoder,
    DecoderConfig, Encoder, EncoderConfig,
};
