//! Schema codec seam.
//!
//! The archive's first block is a binary schema definition and the second is
//! a message encoded against that schema. Interpreting either is the job of a
//! schema codec supplied by the caller through [`SchemaCodec`] and
//! [`CompiledSchema`]. This crate only moves the bytes.
//!
//! [`OpaqueSchemaCodec`] treats both as raw bytes, which is enough to extract
//! and re-pack a payload without understanding it.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error from a schema codec implementation.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The schema codec step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStage {
    DecodeSchema,
    EncodeSchema,
    Compile,
    DecodeMessage,
    EncodeMessage,
}

impl std::fmt::Display for SchemaStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchemaStage::DecodeSchema => "decode schema",
            SchemaStage::EncodeSchema => "encode schema",
            SchemaStage::Compile => "compile schema",
            SchemaStage::DecodeMessage => "decode message",
            SchemaStage::EncodeMessage => "encode message",
        };
        f.write_str(name)
    }
}

/// A failure reported by a schema codec.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct SchemaError {
    pub stage: SchemaStage,
    #[source]
    pub source: BoxError,
}

impl SchemaError {
    pub fn new(stage: SchemaStage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Decodes, encodes and compiles binary schema definitions.
pub trait SchemaCodec {
    /// A decoded schema definition.
    type Schema;
    /// A schema compiled into a message codec.
    type Compiled: CompiledSchema;

    fn decode_schema(&self, bytes: &[u8]) -> Result<Self::Schema, SchemaError>;

    fn encode_schema(&self, schema: &Self::Schema) -> Result<Vec<u8>, SchemaError>;

    fn compile(&self, schema: &Self::Schema) -> Result<Self::Compiled, SchemaError>;
}

/// Decodes and encodes messages against one compiled schema.
pub trait CompiledSchema {
    type Message;

    fn decode_message(&self, bytes: &[u8]) -> Result<Self::Message, SchemaError>;

    fn encode_message(&self, message: &Self::Message) -> Result<Vec<u8>, SchemaError>;
}

// ── Opaque codec ──────────────────────────────────────────────────────────────

/// Pass-through codec: schema and message are the inflated block bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpaqueSchemaCodec;

/// The "compiled" form of an opaque schema. Carries nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpaqueCompiled;

impl SchemaCodec for OpaqueSchemaCodec {
    type Schema = Vec<u8>;
    type Compiled = OpaqueCompiled;

    fn decode_schema(&self, bytes: &[u8]) -> Result<Vec<u8>, SchemaError> {
        Ok(bytes.to_vec())
    }

    fn encode_schema(&self, schema: &Vec<u8>) -> Result<Vec<u8>, SchemaError> {
        Ok(schema.clone())
    }

    fn compile(&self, _schema: &Vec<u8>) -> Result<OpaqueCompiled, SchemaError> {
        Ok(OpaqueCompiled)
    }
}

impl CompiledSchema for OpaqueCompiled {
    type Message = Vec<u8>;

    fn decode_message(&self, bytes: &[u8]) -> Result<Vec<u8>, SchemaError> {
        Ok(bytes.to_vec())
    }

    fn encode_message(&self, message: &Vec<u8>) -> Result<Vec<u8>, SchemaError> {
        Ok(message.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
