//! Body codecs for the legacy compressed layout.
//!
//! v0.x files store their item records as one compressed body. The codec
//! is pluggable; the built-in [`DeflateCodec`] reads and writes raw DEFLATE
//! streams (no zlib header or trailer), which is what v0.x writers produced.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::format::{JdxError, Result};

/// Trait for compressed-body codecs.
pub trait BodyCodec: Send + Sync {
    /// Unique identifier for this codec (e.g., "deflate").
    fn id(&self) -> &'static str;

    /// Compress a raw record body.
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a body, producing at most `limit` bytes.
    ///
    /// Output beyond `limit` is not produced; the caller treats a body that
    /// reaches the limit as oversized.
    fn decompress(&self, compressed: &[u8], limit: usize) -> Result<Vec<u8>>;
}

/// Raw DEFLATE codec.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    level: u32,
}

impl DeflateCodec {
    /// Create a codec with the given compression level (0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Compression level used when writing.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new(9)
    }
}

impl BodyCodec for DeflateCodec {
    fn id(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(raw)
            .map_err(|e| JdxError::codec(self.id(), e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| JdxError::codec(self.id(), e.to_string()))
    }

    fn decompress(&self, compressed: &[u8], limit: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(limit.min(compressed.len().saturating_mul(4)));
        DeflateDecoder::new(compressed)
            .take(limit as u64)
            .read_to_end(&mut out)
            .map_err(|e| JdxError::codec(self.id(), e.to_string()))?;
        log::trace!(
            "Inflated {} compressed bytes into {} bytes",
            compressed.len(),
            out.len()
        );
        Ok(out)
    }
}
