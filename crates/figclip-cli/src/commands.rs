//! Subcommand implementations.
//!
//! Each command works on in-memory strings and byte buffers; `main` does the
//! argument parsing and stdin/stdout handling.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use figclip_core::message::{message_blocks, MESSAGE_BLOCK_COUNT};
use figclip_core::{
    encode_html, read_archive_from_html, write_archive, Archive, BlockCompressor, ClipboardCodec,
    ClipboardMessage, OpaqueSchemaCodec, RawDeflate, FIG_KIWI_VERSION,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// File names written by `extract` and read back by `pack`.
pub const META_FILE: &str = "meta.json";
pub const SCHEMA_FILE: &str = "schema.bin";
pub const MESSAGE_FILE: &str = "message.bin";

// ── Input ─────────────────────────────────────────────────────────────────────

/// Reads UTF-8 text from `path`, or from stdin when `path` is `-`.
pub fn read_text_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read clipboard HTML from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Summary printed by `figclip inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub meta: Value,
    pub archive: ArchiveSummary,
}

#[derive(Debug, Serialize)]
pub struct ArchiveSummary {
    pub prelude: String,
    pub version: u32,
    pub current_version: bool,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub index: usize,
    pub role: &'static str,
    pub compressed_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflated_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflate_error: Option<String>,
}

fn block_role(index: usize, count: usize) -> &'static str {
    match (index, count == MESSAGE_BLOCK_COUNT) {
        (0, true) => "schema",
        (1, true) => "message",
        _ => "unknown",
    }
}

/// Decodes the framing and tries to inflate every block.
///
/// Unlike `extract`, any block count is reported and inflate failures are
/// recorded per block instead of aborting.
pub fn inspect(html: &str, compressor: &impl BlockCompressor) -> anyhow::Result<InspectReport> {
    let (meta, archive) =
        read_archive_from_html(html).context("input is not design-tool clipboard HTML")?;
    Ok(InspectReport {
        meta,
        archive: summarize(&archive, compressor),
    })
}

fn summarize(archive: &Archive, compressor: &impl BlockCompressor) -> ArchiveSummary {
    let count = archive.blocks.len();
    let blocks = archive
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let (inflated_len, inflate_error) = match compressor.inflate(block) {
                Ok(bytes) => (Some(bytes.len()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            BlockSummary {
                index,
                role: block_role(index, count),
                compressed_len: block.len(),
                inflated_len,
                inflate_error,
            }
        })
        .collect();

    ArchiveSummary {
        prelude: archive.header.prelude_str(),
        version: archive.header.version,
        current_version: archive.header.is_current_version(),
        blocks,
    }
}

// ── extract ───────────────────────────────────────────────────────────────────

/// Paths written by [`extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFiles {
    pub meta: PathBuf,
    pub schema: PathBuf,
    pub message: PathBuf,
}

/// Writes `meta.json`, `schema.bin` and `message.bin` into `out_dir`.
///
/// Blocks are inflated unless `raw` is set, in which case the compressed
/// bytes are written as stored in the archive.
pub fn extract(
    html: &str,
    out_dir: &Path,
    raw: bool,
    compressor: RawDeflate,
) -> anyhow::Result<ExtractedFiles> {
    let (meta, schema, message) = if raw {
        let (meta, archive) = read_archive_from_html(html)?;
        let [schema, message] = message_blocks(&archive)?;
        (meta, schema.to_vec(), message.to_vec())
    } else {
        let codec = ClipboardCodec::with_compressor(OpaqueSchemaCodec, compressor);
        let msg = codec.read_message(html)?;
        if !msg.header.is_current_version() {
            warn!(version = msg.header.version, "archive version is not {FIG_KIWI_VERSION}");
        }
        (msg.meta, msg.schema, msg.message)
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let files = ExtractedFiles {
        meta: out_dir.join(META_FILE),
        schema: out_dir.join(SCHEMA_FILE),
        message: out_dir.join(MESSAGE_FILE),
    };
    write_file(&files.meta, serde_json::to_string_pretty(&meta)?.as_bytes())?;
    write_file(&files.schema, &schema)?;
    write_file(&files.message, &message)?;

    info!(
        dir = %out_dir.display(),
        schema_len = schema.len(),
        message_len = message.len(),
        raw,
        "extracted clipboard payload"
    );
    Ok(files)
}

// ── pack ──────────────────────────────────────────────────────────────────────

/// Inputs for [`pack`]; the schema and message are uncompressed.
#[derive(Debug, Clone)]
pub struct PackInput {
    pub meta: Value,
    pub schema: Vec<u8>,
    pub message: Vec<u8>,
    pub version: u32,
}

impl PackInput {
    /// Reads the three input files produced by `extract`.
    pub fn from_files(
        meta: &Path,
        schema: &Path,
        message: &Path,
        version: u32,
    ) -> anyhow::Result<Self> {
        let meta_text = std::fs::read_to_string(meta)
            .with_context(|| format!("failed to read {}", meta.display()))?;
        let meta: Value = serde_json::from_str(&meta_text)
            .with_context(|| format!("{} is not valid JSON", meta.display()))?;
        Ok(Self {
            meta,
            schema: read_bytes(schema)?,
            message: read_bytes(message)?,
            version,
        })
    }
}

/// Deflates the blocks, builds the archive and wraps it in clipboard HTML.
pub fn pack(input: PackInput, compressor: RawDeflate) -> anyhow::Result<String> {
    if input.version == FIG_KIWI_VERSION {
        let codec = ClipboardCodec::with_compressor(OpaqueSchemaCodec, compressor);
        let msg = ClipboardMessage::new(input.meta, input.schema, input.message);
        return Ok(codec.write_message(&msg)?);
    }

    warn!(
        version = input.version,
        "packing with non-current archive version {}; readers may reject it",
        input.version
    );
    let blocks = [
        compressor.deflate(&input.schema)?,
        compressor.deflate(&input.message)?,
    ];
    Ok(encode_html(&input.meta, &write_archive(input.version, &blocks)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
