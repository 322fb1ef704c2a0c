//! Streaming adaptive Huffman encoder.

use std::io::Write;

use super::bit_buffer::BitBuffer;
use super::tree::AdaptiveTree;
use crate::cs::compression::Coder;
use crate::cs::error::{Error, Result};

/// Buffered bit count that triggers a drain to the sink.
pub const DEFAULT_FLUSH_THRESHOLD_BITS: usize = 4096;

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    flush_threshold_bits: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            flush_threshold_bits: DEFAULT_FLUSH_THRESHOLD_BITS,
        }
    }
}

impl EncoderConfig {
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::default()
    }

    pub fn flush_threshold_bits(&self) -> usize {
        self.flush_threshold_bits
    }
}

/// Builder for [`EncoderConfig`].
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfigBuilder {
    flush_threshold_bits: usize,
}

impl Default for EncoderConfigBuilder {
    fn default() -> Self {
        Self {
            flush_threshold_bits: DEFAULT_FLUSH_THRESHOLD_BITS,
        }
    }
}

impl EncoderConfigBuilder {
    /// Sets how many buffered bits trigger a drain of complete bytes to the sink.
    pub fn with_flush_threshold_bits(mut self, bits: usize) -> Self {
        self.flush_threshold_bits = bits;
        self
    }

    /// Validates and builds the config. The threshold must be a positive multiple of 8.
    pub fn build(self) -> Result<EncoderConfig> {
        if self.flush_threshold_bits == 0 || self.flush_threshold_bits % 8 != 0 {
            return Err(Error::InvalidInput(format!(
                "flush threshold must be a positive multiple of 8 bits, got {}",
                self.flush_threshold_bits
            )));
        }
        Ok(EncoderConfig {
            flush_threshold_bits: self.flush_threshold_bits,
        })
    }
}

/// Compresses bytes into `W` one symbol at a time.
///
/// Each byte is coded with its current tree path, or with the NYT path followed by
/// the 8 literal bits on its first occurrence; the tree is updated afterwards.
/// Call [`Encoder::flush`] (or [`Encoder::finish`]) to terminate the stream: the
/// last partial byte is padded with bits of the NYT code, which a decoder cannot
/// mistake for a symbol. Once a flush has padded, the stream is closed and
/// further writes fail with [`Error::InvalidInput`]; a flush that lands on a byte
/// boundary needs no padding and the stream stays open.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    tree: AdaptiveTree,
    buffer: BitBuffer,
    sink: W,
    config: EncoderConfig,
    bits_written: u64,
    /// Set once padding has been emitted.
    terminated: bool,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder with the default config.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, EncoderConfig::default())
    }

    /// Creates an encoder with an explicit config.
    pub fn with_config(sink: W, config: EncoderConfig) -> Self {
        Self {
            tree: AdaptiveTree::new(),
            buffer: BitBuffer::new(),
            sink,
            config,
            bits_written: 0,
            terminated: false,
        }
    }

    /// Encodes `data`, draining complete bytes to the sink whenever the buffer
    /// reaches the flush threshold. Fails if the stream was already padded.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.terminated && !data.is_empty() {
            return Err(Error::invalid_input(
                "write after a padded flush: the stream is already terminated",
            ));
        }
        for &byte in data {
            let before = self.buffer.len();
            match self.tree.leaf_of(byte) {
                Some(leaf) => self.buffer.extend_from_bits(&self.tree.path_of(leaf)),
                None => {
                    self.buffer
                        .extend_from_bits(&self.tree.path_of(self.tree.nyt()));
                    self.buffer.push_byte(byte);
                }
            }
            self.bits_written += (self.buffer.len() - before) as u64;
            // The code above reflects the tree before this occurrence
            self.tree.apply_occurrence(byte);

            if self.buffer.len() >= self.config.flush_threshold_bits {
                self.drain()?;
            }
        }
        Ok(())
    }

    /// Writes every buffered bit, padding the final byte with the NYT code.
    /// A second call with nothing written in between emits nothing.
    pub fn flush(&mut self) -> Result<()> {
        self.drain()?;
        let residual = self.buffer.residual_bits();
        if residual > 0 {
            let padding = 8 - residual;
            let nyt = self.tree.path_of(self.tree.nyt());
            for i in 0..padding {
                let bit = !nyt.is_empty() && nyt[i % nyt.len()];
                self.buffer.push_bit(bit);
            }
            log::debug!("padding final byte with {} bits of the NYT code", padding);
            self.terminated = true;
            self.drain()?;
        }
        self.buffer.clear();
        self.sink.flush()?;
        Ok(())
    }

    /// Flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        log::debug!(
            "encoder finished: {} symbols, {} bits",
            self.tree.node(self.tree.root()).weight(),
            self.bits_written
        );
        Ok(self.sink)
    }

    /// Code bits produced so far, buffered bits included and padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Bits not yet handed to the sink.
    pub fn buffered_bits(&self) -> usize {
        self.buffer.len()
    }

    /// The encoder's code tree.
    pub fn tree(&self) -> &AdaptiveTree {
        &self.tree
    }

    /// The sink, e.g. to inspect a `Vec<u8>` mid-stream.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn drain(&mut self) -> Result<()> {
        let bytes = self.buffer.drain_full_bytes();
        if !bytes.is_empty() {
            self.sink.write_all(&bytes)?;
        }
        Ok(())
    }
}

impl<W: Write> Coder for Encoder<W> {
    type Sink = W;

    fn write(&mut self, data: &[u8]) -> Result<()> {
        Encoder::write(self, data)
    }

    fn flush(&mut self) -> Result<()> {
        Encoder::flush(self)
    }

    fn finish(self) -> Result<W> {
        Encoder::finish(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert_eq!(
            EncoderConfig::default().flush_threshold_bits(),
            DEFAULT_FLUSH_THRESHOLD_BITS
        );
        let config = EncoderConfig::builder()
            .with_flush_threshold_bits(64)
            .build()
            .unwrap();
        assert_eq!(config.flush_threshold_bits(), 64);
        assert!(EncoderConfig::builder()
            .with_flush_threshold_bits(0)
            .build()
            .is_err());
        assert!(matches!(
            EncoderConfig::builder().with_flush_threshold_bits(12).build(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_stream() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&[]).unwrap();
        let out = encoder.finish().unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_byte_is_a_bare_literal() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&[0xA5]).unwrap();
        assert_eq!(encoder.bits_written(), 8);
        assert_eq!(encoder.finish().unwrap(), vec![0xA5]);
    }

    #[test]
    fn test_aaba_bits() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&[0x41, 0x41, 0x42, 0x41]).unwrap();
        // literal A, "1", "0" + literal B, "1"
        assert_eq!(encoder.bits_written(), 8 + 1 + 9 + 1);
        // padding "00000" comes from cycling the NYT code "00"
        assert_eq!(encoder.finish().unwrap(), vec![0x41, 0x90, 0xA0]);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(b"hello").unwrap();
        encoder.flush().unwrap();
        let len = encoder.get_ref().len();
        assert!(len > 0);
        encoder.flush().unwrap();
        assert_eq!(encoder.get_ref().len(), len);
        assert_eq!(encoder.buffered_bits(), 0);
    }

    #[test]
    fn test_threshold_drains_during_write() {
        let config = EncoderConfig::builder()
            .with_flush_threshold_bits(16)
            .build()
            .unwrap();
        let mut encoder = Encoder::with_config(Vec::new(), config);
        encoder.write(b"abcdefgh").unwrap();
        assert!(!encoder.get_ref().is_empty());
        assert!(encoder.buffered_bits() < 16);
    }

    #[test]
    fn test_first_occurrence_cost() {
        let data: Vec<u8> = (0..=255u8).rev().collect();
        let mut shadow = AdaptiveTree::new();
        let mut expected = 0u64;
        for &byte in &data {
            expected += shadow.path_of(shadow.nyt()).len() as u64 + 8;
            shadow.apply_occurrence(byte);
        }

        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&data).unwrap();
        assert_eq!(encoder.bits_written(), expected);
        let out = encoder.finish().unwrap();
        assert_eq!(out.len() as u64, expected.div_ceil(8));
    }

    #[test]
    fn test_repetition_converges_to_one_bit() {
        let data = vec![b'x'; 10_000];
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&data).unwrap();
        // one literal, then a 1-bit code per repeat
        assert_eq!(encoder.bits_written(), 8 + 9_999);
        let out = encoder.finish().unwrap();
        assert_eq!(out.len(), (8 + 9_999usize).div_ceil(8));
    }

    #[test]
    fn test_write_after_padded_flush_is_rejected() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(b"AAB").unwrap();
        encoder.flush().unwrap();
        assert_eq!(encoder.get_ref(), &vec![0x41, 0x90, 0x80]);

        assert!(matches!(encoder.write(b"A"), Err(Error::InvalidInput(_))));
        // Empty writes and repeated flushes stay harmless
        encoder.write(&[]).unwrap();
        encoder.flush().unwrap();
        let out = encoder.finish().unwrap();
        assert_eq!(out, vec![0x41, 0x90, 0x80]);
        assert_eq!(
            crate::cs::compression::adaptive_huffman::decompress(&out).unwrap(),
            b"AAB".to_vec()
        );
    }

    #[test]
    fn test_flush_on_byte_boundary_keeps_stream_open() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.write(&[0xA5]).unwrap();
        encoder.flush().unwrap();
        encoder.write(&[0xA5, 0xA5, b'x']).unwrap();
        let out = encoder.finish().unwrap();
        assert_eq!(
            crate::cs::compression::adaptive_huffman::decompress(&out).unwrap(),
            vec![0xA5, 0xA5, 0xA5, b'x']
        );
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_errors_propagate() {
        let mut encoder = Encoder::new(FailingSink);
        encoder.write(b"abc").unwrap();
        assert!(matches!(encoder.flush(), Err(Error::Io(_))));
    }
}
