//! Reads and writes complete clipboard messages.
//!
//! ```text
//! read:  html ─► decode_html ─► parse_archive ─► [schema, message] blocks
//!             ─► inflate each ─► decode_schema ─► compile ─► decode_message
//! write: the same steps in reverse, always at FIG_KIWI_VERSION
//! ```
//!
//! This is the only module that knows both the framing layer and the schema
//! and compression collaborators.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::archive::{
    parse_archive, write_archive, Archive, ArchiveHeader, FormatError, FIG_KIWI_VERSION,
};
use crate::compression::{BlockCompressor, CompressionError, RawDeflate};
use crate::html::{decode_html, encode_html, FramingError};
use crate::schema::{CompiledSchema, SchemaCodec, SchemaError};

/// Index of the compressed schema block.
pub const SCHEMA_BLOCK: usize = 0;
/// Index of the compressed message block.
pub const MESSAGE_BLOCK: usize = 1;
/// Number of blocks a clipboard message archive holds.
pub const MESSAGE_BLOCK_COUNT: usize = 2;

/// Any failure while reading or writing a clipboard message.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("{block} block: {source}")]
    Compression {
        block: &'static str,
        #[source]
        source: CompressionError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A fully decoded clipboard message.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardMessage<S, M> {
    /// Header of the archive this message was read from. Ignored on write.
    pub header: ArchiveHeader,
    pub meta: Value,
    pub schema: S,
    pub message: M,
}

impl<S, M> ClipboardMessage<S, M> {
    /// Creates a message with a current-version header.
    pub fn new(meta: Value, schema: S, message: M) -> Self {
        Self {
            header: ArchiveHeader::default(),
            meta,
            schema,
            message,
        }
    }
}

/// Message type produced by a schema codec `C`.
pub type MessageOf<C> = <<C as SchemaCodec>::Compiled as CompiledSchema>::Message;

/// Clipboard message type produced by a schema codec `C`.
pub type ClipboardMessageOf<C> = ClipboardMessage<<C as SchemaCodec>::Schema, MessageOf<C>>;

/// Sequences the framing codecs around a schema codec and a block compressor.
///
/// Holds no per-call state; one instance can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct ClipboardCodec<C, Z = RawDeflate> {
    schema_codec: C,
    compressor: Z,
}

impl<C: SchemaCodec> ClipboardCodec<C, RawDeflate> {
    /// Creates a codec using raw deflate at the default level.
    pub fn new(schema_codec: C) -> Self {
        Self::with_compressor(schema_codec, RawDeflate::default())
    }
}

impl<C: SchemaCodec, Z: BlockCompressor> ClipboardCodec<C, Z> {
    /// Creates a codec with an explicit block compressor.
    pub fn with_compressor(schema_codec: C, compressor: Z) -> Self {
        Self {
            schema_codec,
            compressor,
        }
    }

    /// The schema codec used for both directions.
    pub fn schema_codec(&self) -> &C {
        &self.schema_codec
    }

    /// The compressor applied to each block.
    pub fn compressor(&self) -> &Z {
        &self.compressor
    }

    /// Decodes a clipboard message from HTML.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError`] for malformed HTML, a malformed archive, an
    /// archive without exactly two blocks, or a collaborator failure.
    pub fn read_message(&self, html: &str) -> Result<ClipboardMessageOf<C>, ClipError> {
        let (meta, archive) = read_archive_from_html(html)?;
        let [schema_block, message_block] = message_blocks(&archive)?;

        let schema_bytes = self.inflate_block("schema", schema_block)?;
        let message_bytes = self.inflate_block("message", message_block)?;

        let schema = self.schema_codec.decode_schema(&schema_bytes)?;
        let compiled = self.schema_codec.compile(&schema)?;
        let message = compiled.decode_message(&message_bytes)?;

        Ok(ClipboardMessage {
            header: archive.header,
            meta,
            schema,
            message,
        })
    }

    /// Encodes a clipboard message as HTML.
    ///
    /// The archive is always written at [`FIG_KIWI_VERSION`]; `msg.header`
    /// is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError`] if the schema codec or compressor fails.
    pub fn write_message(&self, msg: &ClipboardMessageOf<C>) -> Result<String, ClipError> {
        let schema_bytes = self.schema_codec.encode_schema(&msg.schema)?;
        let compiled = self.schema_codec.compile(&msg.schema)?;
        let message_bytes = compiled.encode_message(&msg.message)?;

        let blocks = [
            self.deflate_block("schema", &schema_bytes)?,
            self.deflate_block("message", &message_bytes)?,
        ];
        let archive = write_archive(FIG_KIWI_VERSION, &blocks);
        debug!(
            schema_len = blocks[SCHEMA_BLOCK].len(),
            message_len = blocks[MESSAGE_BLOCK].len(),
            archive_len = archive.len(),
            "wrote clipboard archive"
        );

        Ok(encode_html(&msg.meta, &archive))
    }

    fn inflate_block(&self, block: &'static str, data: &[u8]) -> Result<Vec<u8>, ClipError> {
        self.compressor
            .inflate(data)
            .map_err(|source| ClipError::Compression { block, source })
    }

    fn deflate_block(&self, block: &'static str, data: &[u8]) -> Result<Vec<u8>, ClipError> {
        self.compressor
            .deflate(data)
            .map_err(|source| ClipError::Compression { block, source })
    }
}

/// Unwraps clipboard HTML and parses the archive inside it.
///
/// # Errors
///
/// Returns [`ClipError::Framing`] or [`ClipError::Format`].
pub fn read_archive_from_html(html: &str) -> Result<(Value, Archive), ClipError> {
    let doc = decode_html(html)?;
    let archive = parse_archive(&doc.payload)?;
    debug!(
        version = archive.header.version,
        blocks = archive.blocks.len(),
        "parsed clipboard archive"
    );
    Ok((doc.meta, archive))
}

/// Splits a message archive into its schema and message blocks.
///
/// # Errors
///
/// Returns [`FormatError::UnexpectedBlockCount`] unless the archive holds
/// exactly [`MESSAGE_BLOCK_COUNT`] blocks.
pub fn message_blocks(archive: &Archive) -> Result<[&[u8]; MESSAGE_BLOCK_COUNT], FormatError> {
    archive.expect_blocks::<MESSAGE_BLOCK_COUNT>()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
