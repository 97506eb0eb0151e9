//! Raw-deflate compression for archive blocks.
//!
//! Each archive block is compressed independently with raw deflate
//! (RFC 1951, no zlib or gzip framing). The [`BlockCompressor`] trait is the
//! seam the orchestrator depends on; [`RawDeflate`] is the production
//! implementation.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use thiserror::Error;

/// Default deflate level, matching zlib's default.
pub const DEFAULT_LEVEL: u32 = 6;

/// Errors raised while compressing or decompressing a block.
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("inflate failed: {0}")]
    Inflate(#[source] std::io::Error),

    #[error("deflate failed: {0}")]
    Deflate(#[source] std::io::Error),
}

/// Compresses and decompresses individual archive blocks.
#[cfg_attr(test, mockall::automock)]
pub trait BlockCompressor {
    /// Decompresses one block.
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;
    /// Compresses one block.
    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;
}

/// Raw deflate backed by `flate2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDeflate {
    level: u32,
}

impl RawDeflate {
    /// Creates a compressor with the given level, clamped to `0..=9`.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// The deflate level used by [`BlockCompressor::deflate`].
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for RawDeflate {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl BlockCompressor for RawDeflate {
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        // Design payloads typically compress 3-5x.
        let mut out = Vec::with_capacity(data.len().saturating_mul(4).max(1024));
        DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(CompressionError::Inflate)?;
        Ok(out)
    }

    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut encoder = DeflateEncoder::new(
            Vec::with_capacity(data.len() / 2 + 64),
            Compression::new(self.level),
        );
        encoder
            .write_all(data)
            .map_err(CompressionError::Deflate)?;
        encoder.finish().map_err(CompressionError::Deflate)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_then_inflate_restores_input() {
        let codec = RawDeflate::default();
        let input = b"rectangle rectangle rectangle ellipse".repeat(20);

        let compressed = codec.deflate(&input).expect("deflate failed");
        assert!(compressed.len() < input.len());
        assert_eq!(codec.inflate(&compressed).expect("inflate failed"), input);
    }

    #[test]
    fn test_empty_input() {
        let codec = RawDeflate::default();
        let compressed = codec.deflate(&[]).unwrap();
        assert!(codec.inflate(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_output_has_no_zlib_header() {
        // A zlib stream at the default level begins with 0x78 0x9C.
        let compressed = RawDeflate::default().deflate(b"hello hello hello").unwrap();
        assert_ne!(&compressed[..2], &[0x78, 0x9C]);
    }

    #[test]
    fn test_level_zero_stores_uncompressed() {
        let codec = RawDeflate::new(0);
        let input = vec![0xAB; 256];
        let compressed = codec.deflate(&input).unwrap();
        assert!(compressed.len() >= input.len());
        assert_eq!(codec.inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(RawDeflate::new(42).level(), 9);
    }

    #[test]
    fn test_inflate_garbage_fails() {
        // 0xFF selects the reserved block type 3.
        let err = RawDeflate::default().inflate(&[0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, CompressionError::Inflate(_)));
    }
}
