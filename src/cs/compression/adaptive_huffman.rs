//! Adaptive (one-pass) Huffman coding of byte streams.
//!
//! Encoder and decoder each grow their own code tree from the symbols they have
//! seen, so no frequency table is transmitted. The first occurrence of a byte is
//! sent as the code of the NYT ("not yet transmitted") leaf followed by the raw
//! byte; later occurrences use the byte's current tree code.
//!
//! # Wire format
//!
//! A headerless bit stream packed most-significant-bit first. Branch 0 of a node
//! is a `0` bit, branch 1 a `1` bit, and literals are written high bit first. The
//! last byte is padded with bits of the current NYT code (repeated as needed);
//! since a literal must follow an NYT code and fewer than 8 bits remain, the
//! padding never decodes as data. Callers that know the uncompressed length can
//! pass it to the decoder instead.
//!
//! # Examples
//!
//! ```rust
//! use adaptive_huffman::{compress, decompress, decompress_exact};
//!
//! let data = b"abracadabra abracadabra";
//! let packed = compress(data).unwrap();
//! assert!(packed.len() < data.len());
//! assert_eq!(decompress(&packed).unwrap(), data.to_vec());
//! assert_eq!(decompress_exact(&packed, data.len() as u64).unwrap(), data.to_vec());
//! ```

pub mod bit_buffer;
pub mod decoder;
pub mod encoder;
pub mod tree;


pub use bit_buffer::BitBuffer;
pub use decoder::{Decoder, DecoderConfig, DecoderConfigBuilder};
pub use encoder::{Encoder, EncoderConfig, EncoderConfigBuilder, DEFAULT_FLUSH_THRESHOLD_BITS};
pub use tree::{AdaptiveTree, Node, NodeId, NodeKind};

use crate::cs::compression::{Compression, Result};

/// Compresses `data` into a terminated stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write(data)?;
    encoder.finish()
}

/// Decompresses a stream, using the NYT padding to find the end of data.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(Vec::new());
    decoder.write(data)?;
    decoder.finish()
}

/// Decompresses exactly `len` bytes, failing if the stream holds fewer.
pub fn decompress_exact(data: &[u8], len: u64) -> Result<Vec<u8>> {
    let config = DecoderConfig::builder().with_expected_len(len).build();
    let mut decoder = Decoder::with_config(Vec::new(), config);
    decoder.write(data)?;
    decoder.finish()
}

/// [`Compression`] front end with a fixed encoder config.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveHuffman {
    config: EncoderConfig,
}

impl AdaptiveHuffman {
    /// Codec whose encoder uses `config`.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Compression for AdaptiveHuffman {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = Encoder::with_config(Vec::new(), self.config);
        encoder.write(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress(data)
    }
}
