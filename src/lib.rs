//! One-pass adaptive Huffman coding for byte streams.
//!
//! See [`cs::compression::adaptive_huffman`] for the algorithm and wire format.

pub mod cs;

pub use cs::compression::adaptive_huffman::{
    compress, decompress, decompress_exact, AdaptiveHuffman, Decoder, DecoderConfig, Encoder,
    EncoderConfig,
};
pub use cs::compression::{Coder, Compression};
pub use cs::error::{Error, Result};
