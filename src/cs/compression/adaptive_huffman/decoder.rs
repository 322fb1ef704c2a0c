//! Streaming adaptive Huffman decoder.
//!
//! Mirrors the encoder: it walks its own tree bit by bit and applies the same
//! update after every symbol, so both trees stay identical without any side
//! information. Compressed bytes may arrive in arbitrary chunks; a path or
//! literal cut by a chunk boundary is resumed on the next [`Decoder::write`].

use std::io::Write;

use bitvec::prelude::*;

use super::tree::{AdaptiveTree, NodeId, NodeKind};
use crate::cs::compression::Coder;
use crate::cs::error::{Error, Result};

/// Decoder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    expected_len: Option<u64>,
}

impl DecoderConfig {
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }

    /// Number of bytes the stream is known to hold, if the caller supplied it.
    pub fn expected_len(&self) -> Option<u64> {
        self.expected_len
    }
}

/// Builder for [`DecoderConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfigBuilder {
    expected_len: Option<u64>,
}

impl DecoderConfigBuilder {
    /// Stop after `len` bytes and treat falling short of it as an error.
    pub fn with_expected_len(mut self, len: u64) -> Self {
        self.expected_len = Some(len);
        self
    }

    pub fn build(self) -> DecoderConfig {
        DecoderConfig {
            expected_len: self.expected_len,
        }
    }
}

/// Where the decoder is within the current symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Walking down from the root; holds the internal node reached so far.
    Path(NodeId),
    /// Reading the 8-bit literal after an NYT code.
    Literal { value: u8, filled: u8 },
    /// Expected length reached; remaining input is padding.
    Done,
}

/// Decompresses a stream produced by [`super::Encoder`] into `W`.
#[derive(Debug)]
pub struct Decoder<W: Write> {
    tree: AdaptiveTree,
    state: State,
    sink: W,
    config: DecoderConfig,
    decoded: u64,
    pending: Vec<u8>,
}

impl<W: Write> Decoder<W> {
    /// Creates a decoder that relies on the NYT padding to find the end of data.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, DecoderConfig::default())
    }

    /// Creates a decoder with an explicit config.
    pub fn with_config(sink: W, config: DecoderConfig) -> Self {
        let tree = AdaptiveTree::new();
        let mut decoder = Self {
            state: State::Done,
            tree,
            sink,
            config,
            decoded: 0,
            pending: Vec::new(),
        };
        decoder.state = decoder.next_symbol_state();
        decoder
    }

    /// Decodes as many symbols as `data` completes and writes them to the sink.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            if self.state == State::Done {
                break;
            }
            for bit in byte.view_bits::<Msb0>().iter().by_vals() {
                self.push_bit(bit);
            }
        }
        if !self.pending.is_empty() {
            self.sink.write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }

    /// Flushes the sink. Decoded bytes are already handed over by `write`.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Ends the stream and hands back the sink.
    ///
    /// An unfinished path or literal is the encoder's NYT padding and is dropped.
    /// Fails with [`Error::Truncated`] if an expected length was configured and
    /// not reached.
    pub fn finish(mut self) -> Result<W> {
        let dropped = match self.state {
            State::Path(node) => self.tree.path_of(node).len(),
            State::Literal { filled, .. } => {
                self.tree.path_of(self.tree.nyt()).len() + filled as usize
            }
            State::Done => 0,
        };
        log::debug!(
            "decoder finished: {} symbols, {} trailing bits discarded",
            self.decoded,
            dropped
        );
        if let Some(expected) = self.config.expected_len {
            if self.decoded < expected {
                return Err(Error::Truncated {
                    expected,
                    decoded: self.decoded,
                });
            }
        }
        self.flush()?;
        Ok(self.sink)
    }

    /// Number of bytes decoded so far.
    pub fn decoded_len(&self) -> u64 {
        self.decoded
    }

    /// The decoder's code tree.
    pub fn tree(&self) -> &AdaptiveTree {
        &self.tree
    }

    /// The sink holding the bytes decoded so far.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn push_bit(&mut self, bit: bool) {
        match self.state {
            State::Done => {}
            State::Literal { value, filled } => {
                let value = (value << 1) | bit as u8;
                if filled + 1 == 8 {
                    self.emit(value);
                } else {
                    self.state = State::Literal {
                        value,
                        filled: filled + 1,
                    };
                }
            }
            State::Path(node) => {
                let Some(next) = self.tree.child(node, bit) else {
                    return;
                };
                match self.tree.node(next).kind() {
                    NodeKind::Internal { .. } => self.state = State::Path(next),
                    NodeKind::Leaf(symbol) => self.emit(symbol),
                    NodeKind::Nyt => self.state = State::Literal { value: 0, filled: 0 },
                }
            }
        }
    }

    fn emit(&mut self, symbol: u8) {
        self.pending.push(symbol);
        self.tree.apply_occurrence(symbol);
        self.decoded += 1;
        self.state = self.next_symbol_state();
    }

    fn next_symbol_state(&self) -> State {
        if matches!(self.config.expected_len, Some(len) if self.decoded >= len) {
            return State::Done;
        }
        let root = self.tree.root();
        if root == self.tree.nyt() {
            // Nothing seen yet: the NYT code is empty and a literal follows directly
            State::Literal { value: 0, filled: 0 }
        } else {
            State::Path(root)
        }
    }
}

impl<W: Write> Coder for Decoder<W> {
    type Sink = W;

    fn write(&mut self, data: &[u8]) -> Result<()> {
        Decoder::write(self, data)
    }

    fn flush(&mut self) -> Result<()> {
        Decoder::flush(self)
    }

    fn finish(self) -> Result<W> {
        Decoder::finish(self)
    }
}
