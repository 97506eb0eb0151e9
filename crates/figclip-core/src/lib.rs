//! # figclip-core
//!
//! Framing codecs for design-tool clipboard payloads.
//!
//! When content is copied in the design tool, the `text/html` clipboard
//! flavour carries a small binary archive hidden inside HTML comments. This
//! crate reads and writes that framing so other software can consume and
//! produce the same clipboard data.
//!
//! It has no dependencies on OS APIs, the filesystem, or the network.
//!
//! # Architecture overview
//!
//! - **`html`** – Finds the `(figmeta)` and `(figma)` comment markers and
//!   base64-decodes what sits between them: a JSON metadata object and the
//!   raw archive bytes.
//!
//! - **`archive`** – The `fig-kiwi` container: an 8-byte prelude, a
//!   little-endian `u32` version, then length-prefixed opaque blocks.
//!
//! - **`compression`** and **`schema`** – Seams for the two collaborators
//!   that give the blocks meaning: raw deflate (provided via `flate2`) and a
//!   caller-supplied schema codec.
//!
//! - **`message`** – Chains all of the above into a full read/write of a
//!   clipboard message (block 0 is the schema, block 1 the message).

pub mod archive;
pub mod compression;
pub mod html;
pub mod message;
pub mod schema;

pub use archive::{
    parse_archive, write_archive, Archive, ArchiveHeader, FormatError, FIG_KIWI_PRELUDE,
    FIG_KIWI_VERSION,
};
pub use compression::{BlockCompressor, CompressionError, RawDeflate};
pub use html::{decode_html, encode_html, FramingError, ParsedDocument};
pub use message::{
    read_archive_from_html, ClipError, ClipboardCodec, ClipboardMessage, MESSAGE_BLOCK,
    SCHEMA_BLOCK,
};
pub use schema::{CompiledSchema, OpaqueSchemaCodec, SchemaCodec, SchemaError};
