//! HTML wrapper codec for clipboard payloads.
//!
//! The design tool puts two base64 segments into the `text/html` clipboard
//! flavour, each hidden inside an HTML comment in a span attribute:
//!
//! ```text
//! <span data-metadata="<!--(figmeta)BASE64-JSON(/figmeta)-->"></span>
//! <span data-buffer="<!--(figma)BASE64-ARCHIVE(/figma)-->"></span>
//! ```
//!
//! Markers are located by plain substring search, so surrounding markup is
//! irrelevant to decoding.

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

/// Opens the base64 JSON metadata segment.
pub const META_START: &str = "<!--(figmeta)";
/// Closes the base64 JSON metadata segment.
pub const META_END: &str = "(/figmeta)-->";
/// Opens the base64 archive segment.
pub const BUFFER_START: &str = "<!--(figma)";
/// Closes the base64 archive segment.
pub const BUFFER_END: &str = "(/figma)-->";

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Which of the two hidden segments an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Metadata,
    Buffer,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Metadata => f.write_str("figmeta"),
            Segment::Buffer => f.write_str("figma"),
        }
    }
}

/// Errors that can occur while unwrapping clipboard HTML.
#[derive(Debug, Error)]
pub enum FramingError {
    /// A segment's opening marker does not occur in the input.
    #[error("couldn't find start marker {marker:?}")]
    MissingStartMarker { marker: &'static str },

    /// A segment's closing marker does not occur after its opening marker.
    #[error("couldn't find end marker {marker:?} after offset {after}")]
    MissingEndMarker { marker: &'static str, after: usize },

    /// The text between the markers is not valid base64.
    #[error("invalid base64 in {segment} segment: {source}")]
    Base64 {
        segment: Segment,
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded metadata is not UTF-8.
    #[error("metadata is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The decoded metadata is not JSON.
    #[error("metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of unwrapping clipboard HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Opaque metadata object.
    pub meta: Value,
    /// Still-encoded archive bytes.
    pub payload: Vec<u8>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Extracts the metadata and archive segments from clipboard HTML.
///
/// # Errors
///
/// Returns [`FramingError`] if a marker is missing, a segment is not base64,
/// or the metadata is not UTF-8 JSON.
///
/// # Examples
///
/// ```rust
/// use figclip_core::html::decode_html;
///
/// let doc = decode_html("<!--(figmeta)eyJhIjoxfQ==(/figmeta)--> <!--(figma)AQI=(/figma)-->").unwrap();
/// assert_eq!(doc.meta["a"], 1);
/// assert_eq!(doc.payload, vec![0x01, 0x02]);
/// ```
pub fn decode_html(html: &str) -> Result<ParsedDocument, FramingError> {
    let meta_b64 = segment_between(html, META_START, META_END)?;
    let buffer_b64 = segment_between(html, BUFFER_START, BUFFER_END)?;

    let meta_bytes = decode_segment(meta_b64, Segment::Metadata)?;
    let meta_text = String::from_utf8(meta_bytes)?;
    let meta: Value = serde_json::from_str(&meta_text)?;

    let payload = decode_segment(buffer_b64, Segment::Buffer)?;
    trace!(
        meta_len = meta_text.len(),
        payload_len = payload.len(),
        "decoded clipboard html"
    );

    Ok(ParsedDocument { meta, payload })
}

/// Wraps `meta` and `payload` into clipboard HTML.
///
/// The fragment layout matches what the design tool itself writes, including
/// the duplicated charset tag its clipboard reader expects.
pub fn encode_html(meta: &Value, payload: &[u8]) -> String {
    let meta_b64 = STANDARD.encode(meta.to_string());
    let buffer_b64 = STANDARD.encode(payload);
    format!(
        "<meta charset=\"utf-8\" /><meta charset=\"utf-8\" /><span\n  \
         data-metadata=\"{META_START}{meta_b64}{META_END}\"\n\
         ></span\n\
         ><span\n  \
         data-buffer=\"{BUFFER_START}{buffer_b64}{BUFFER_END}\"\n\
         ></span\n\
         ><span style=\"white-space: pre-wrap\"></span>"
    )
}

impl ParsedDocument {
    /// Re-wraps this document. See [`encode_html`].
    pub fn to_html(&self) -> String {
        encode_html(&self.meta, &self.payload)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Returns the text strictly between the first `start` and the next `end`.
fn segment_between<'a>(
    html: &'a str,
    start: &'static str,
    end: &'static str,
) -> Result<&'a str, FramingError> {
    let begin = html
        .find(start)
        .ok_or(FramingError::MissingStartMarker { marker: start })?
        + start.len();
    let len = html[begin..]
        .find(end)
        .ok_or(FramingError::MissingEndMarker { marker: end, after: begin })?;
    Ok(&html[begin..begin + len])
}

fn decode_segment(text: &str, segment: Segment) -> Result<Vec<u8>, FramingError> {
    LENIENT
        .decode(text.trim())
        .map_err(|source| FramingError::Base64 { segment, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
