//! Binary codec for the `fig-kiwi` archive container.
//!
//! Wire format:
//! ```text
//! [prelude:8 "fig-kiwi"][version:4]([block_len:4][block:N])*
//! ```
//! All integers are little-endian `u32`. Blocks are read until fewer than
//! 5 bytes remain; a dangling partial length field is ignored.

use thiserror::Error;
use tracing::{debug, trace};

/// The 8-byte ASCII tag every archive starts with.
pub const FIG_KIWI_PRELUDE: &[u8; 8] = b"fig-kiwi";

/// Archive format revision written by this crate.
pub const FIG_KIWI_VERSION: u32 = 15;

/// Size of the fixed header: prelude plus version.
pub const HEADER_SIZE: usize = FIG_KIWI_PRELUDE.len() + 4;

/// Size of each block's length prefix.
pub const BLOCK_LEN_SIZE: usize = 4;

/// Errors that can occur while parsing an archive or splitting it into roles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The first 8 bytes were not `fig-kiwi`.
    #[error("unexpected prelude: {found:?}")]
    BadPrelude { found: String },

    /// A header field or block body runs past the end of the buffer.
    #[error("read({requested}) at offset {offset} is past end of data: {available} bytes available")]
    TruncatedRead {
        offset: usize,
        requested: usize,
        available: usize,
    },

    /// The archive does not hold the number of blocks the caller needs.
    #[error("unexpected block count: expected {expected}, found {found}")]
    UnexpectedBlockCount { expected: usize, found: usize },
}

// ── Data model ────────────────────────────────────────────────────────────────

/// The fixed-size header at the start of every archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub prelude: [u8; 8],
    /// Format revision. Parsed but not enforced.
    pub version: u32,
}

impl ArchiveHeader {
    /// Creates a header with the standard prelude and the given version.
    pub fn new(version: u32) -> Self {
        Self {
            prelude: *FIG_KIWI_PRELUDE,
            version,
        }
    }

    /// Returns `true` if `version` matches [`FIG_KIWI_VERSION`].
    pub fn is_current_version(&self) -> bool {
        self.version == FIG_KIWI_VERSION
    }

    /// The prelude as text. Always `"fig-kiwi"` for a parsed header.
    pub fn prelude_str(&self) -> String {
        String::from_utf8_lossy(&self.prelude).into_owned()
    }
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self::new(FIG_KIWI_VERSION)
    }
}

/// A parsed archive: header plus the ordered list of opaque blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Archive {
    pub header: ArchiveHeader,
    pub blocks: Vec<Vec<u8>>,
}

impl Archive {
    /// Creates an archive with the standard prelude.
    pub fn new(version: u32, blocks: Vec<Vec<u8>>) -> Self {
        Self {
            header: ArchiveHeader::new(version),
            blocks,
        }
    }

    /// Serializes this archive. See [`write_archive`].
    pub fn to_bytes(&self) -> Vec<u8> {
        write_archive(self.header.version, &self.blocks)
    }

    /// Returns exactly `N` blocks or [`FormatError::UnexpectedBlockCount`].
    pub fn expect_blocks<const N: usize>(&self) -> Result<[&[u8]; N], FormatError> {
        if self.blocks.len() != N {
            return Err(FormatError::UnexpectedBlockCount {
                expected: N,
                found: self.blocks.len(),
            });
        }
        Ok(std::array::from_fn(|i| self.blocks[i].as_slice()))
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

/// A forward-only read position over a borrowed buffer.
///
/// Owned by a single parse call; nothing is shared between calls.
#[derive(Debug, Clone, Copy)]
struct ByteCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Borrows the next `n` bytes and advances past them.
    fn read(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(FormatError::TruncatedRead {
                offset: self.offset,
                requested: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn read_u32_le(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses a `fig-kiwi` archive.
///
/// # Errors
///
/// - [`FormatError::BadPrelude`] if the first 8 bytes are not `fig-kiwi`.
/// - [`FormatError::TruncatedRead`] if the header or any block is cut short.
///
/// # Examples
///
/// ```rust
/// use figclip_core::archive::{parse_archive, write_archive};
///
/// let bytes = write_archive(15, &[vec![1, 2], vec![3, 4, 5]]);
/// let archive = parse_archive(&bytes).unwrap();
/// assert_eq!(archive.header.version, 15);
/// assert_eq!(archive.blocks, vec![vec![1, 2], vec![3, 4, 5]]);
/// ```
pub fn parse_archive(buf: &[u8]) -> Result<Archive, FormatError> {
    let mut cursor = ByteCursor::new(buf);
    let header = read_header(&mut cursor)?;
    if !header.is_current_version() {
        debug!(
            version = header.version,
            expected = FIG_KIWI_VERSION,
            "archive version differs from current revision"
        );
    }

    let mut blocks = Vec::new();
    // Matches the reader's "more than a length field left" check.
    while cursor.remaining() > BLOCK_LEN_SIZE {
        let start = cursor.offset;
        let len = cursor.read_u32_le()? as usize;
        let body = cursor.read(len)?;
        trace!(index = blocks.len(), offset = start, len, "read archive block");
        blocks.push(body.to_vec());
    }

    if cursor.remaining() > 0 {
        debug!(
            trailing = cursor.remaining(),
            "ignoring trailing bytes after last archive block"
        );
    }

    Ok(Archive { header, blocks })
}

/// Serializes `blocks` into a `fig-kiwi` archive with the given version.
///
/// Infallible: the output size is computed up front and then filled.
///
/// # Panics
///
/// Panics if a single block is longer than `u32::MAX` bytes, which the
/// length prefix cannot represent.
pub fn write_archive<B: AsRef<[u8]>>(version: u32, blocks: &[B]) -> Vec<u8> {
    let total = blocks
        .iter()
        .fold(HEADER_SIZE, |size, b| size + BLOCK_LEN_SIZE + b.as_ref().len());

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(FIG_KIWI_PRELUDE);
    buf.extend_from_slice(&version.to_le_bytes());
    for block in blocks {
        let block = block.as_ref();
        let len = u32::try_from(block.len()).expect("archive block exceeds u32::MAX bytes");
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(block);
    }
    debug_assert_eq!(buf.len(), total);
    buf
}

// ── Header ────────────────────────────────────────────────────────────────────

fn read_header(cursor: &mut ByteCursor<'_>) -> Result<ArchiveHeader, FormatError> {
    let prelude = cursor.read(FIG_KIWI_PRELUDE.len())?;
    if prelude != FIG_KIWI_PRELUDE {
        return Err(FormatError::BadPrelude {
            found: String::from_utf8_lossy(prelude).into_owned(),
        });
    }
    let version = cursor.read_u32_le()?;
    Ok(ArchiveHeader::new(version))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: u32) -> Vec<u8> {
        let mut buf = FIG_KIWI_PRELUDE.to_vec();
        buf.extend_from_slice(&version.to_le_bytes());
        buf
    }

    #[test]
    fn test_write_produces_documented_layout() {
        let bytes = write_archive(15, &[vec![0x01, 0x02], vec![0x03, 0x04, 0x05]]);

        let mut expected = b"fig-kiwi".to_vec();
        expected.extend_from_slice(&[0x0F, 0x00, 0x00, 0x00]);
        expected.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x01, 0x02]);
        expected.extend_from_slice(&[0x03, 0x00, 0x00, 0x00, 0x03, 0x04, 0x05]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_write_length_prefix_spans_multiple_bytes() {
        // 70_000 = 0x0001_1170
        let block = vec![0xAA; 70_000];
        let bytes = write_archive(15, &[&block]);

        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + BLOCK_LEN_SIZE], &[0x70, 0x11, 0x01, 0x00]);
        assert_eq!(bytes.len(), HEADER_SIZE + BLOCK_LEN_SIZE + block.len());
        assert_eq!(parse_archive(&bytes).unwrap().blocks, vec![block]);
    }

    #[test]
    fn test_parse_documented_layout() {
        let bytes = write_archive(15, &[vec![0x01, 0x02], vec![0x03, 0x04, 0x05]]);
        let archive = parse_archive(&bytes).expect("parse failed");
        assert_eq!(archive.header, ArchiveHeader::new(15));
        assert_eq!(archive.blocks, vec![vec![0x01, 0x02], vec![0x03, 0x04, 0x05]]);
    }

    #[test]
    fn test_write_with_no_blocks_is_header_only() {
        let bytes = write_archive::<Vec<u8>>(15, &[]);
        assert_eq!(bytes.len(), HEADER_SIZE);
        let archive = parse_archive(&bytes).unwrap();
        assert!(archive.blocks.is_empty());
    }

    #[test]
    fn test_parse_accepts_other_versions() {
        let bytes = write_archive(99, &[b"abc".to_vec()]);
        let archive = parse_archive(&bytes).unwrap();
        assert_eq!(archive.header.version, 99);
        assert!(!archive.header.is_current_version());
        assert_eq!(archive.blocks, vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_parse_rejects_bad_prelude() {
        let mut bytes = b"abcdefgh".to_vec();
        bytes.extend_from_slice(&15u32.to_le_bytes());
        assert_eq!(
            parse_archive(&bytes),
            Err(FormatError::BadPrelude {
                found: "abcdefgh".to_string()
            })
        );
    }

    #[test]
    fn test_parse_short_prelude_is_truncated_read() {
        let err = parse_archive(b"fig").unwrap_err();
        assert_eq!(
            err,
            FormatError::TruncatedRead {
                offset: 0,
                requested: 8,
                available: 3
            }
        );
    }

    #[test]
    fn test_parse_missing_version_is_truncated_read() {
        let err = parse_archive(b"fig-kiwi\x0F\x00").unwrap_err();
        assert_eq!(
            err,
            FormatError::TruncatedRead {
                offset: 8,
                requested: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_parse_block_length_past_end_is_truncated_read() {
        let mut bytes = header_bytes(15);
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);

        let err = parse_archive(&bytes).unwrap_err();
        assert_eq!(
            err,
            FormatError::TruncatedRead {
                offset: 16,
                requested: 10,
                available: 3
            }
        );
    }

    #[test]
    fn test_parse_ignores_short_trailer() {
        for trailer_len in 1..=4 {
            let mut bytes = write_archive(15, &[vec![7u8; 5]]);
            bytes.extend(std::iter::repeat(0xEE).take(trailer_len));

            let archive = parse_archive(&bytes).expect("trailer must be tolerated");
            assert_eq!(archive.blocks, vec![vec![7u8; 5]], "trailer_len={trailer_len}");
        }
    }

    #[test]
    fn test_parse_empty_block_followed_by_data() {
        let bytes = write_archive(15, &[vec![], vec![9, 9]]);
        let archive = parse_archive(&bytes).unwrap();
        assert_eq!(archive.blocks, vec![vec![], vec![9, 9]]);
    }

    #[test]
    fn test_to_bytes_matches_write_archive() {
        let archive = Archive::new(15, vec![vec![1], vec![2, 3]]);
        assert_eq!(archive.to_bytes(), write_archive(15, &archive.blocks));
    }

    #[test]
    fn test_expect_blocks_exact_count() {
        let archive = Archive::new(15, vec![vec![1], vec![2]]);
        let [a, b] = archive.expect_blocks::<2>().unwrap();
        assert_eq!(a, &[1]);
        assert_eq!(b, &[2]);
    }

    #[test]
    fn test_expect_blocks_wrong_count() {
        let archive = Archive::new(15, vec![vec![1]]);
        assert_eq!(
            archive.expect_blocks::<2>(),
            Err(FormatError::UnexpectedBlockCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_default_header_is_current() {
        let header = ArchiveHeader::default();
        assert!(header.is_current_version());
        assert_eq!(header.prelude_str(), "fig-kiwi");
    }
}
