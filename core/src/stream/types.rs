use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{slice_flags, ENCODING_MAJOR, ENCODING_MINOR, NO_COMPACT_ID};

bitflags::bitflags! {
    /// Leading byte of every slice.
    ///
    /// The two low bits are not independent flags: together they encode the
    /// `TypeIdKind`. Bits outside this set (optional members, indirection
    /// tables) belong to the class encoding and are rejected.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SliceFlags: u8 {
        const TYPE_ID_STRING  = slice_flags::TYPE_ID_STRING;
        const TYPE_ID_INDEX   = slice_flags::TYPE_ID_INDEX;
        const TYPE_ID_COMPACT = slice_flags::TYPE_ID_COMPACT;
        const HAS_SLICE_SIZE  = slice_flags::HAS_SLICE_SIZE;
        const IS_LAST_SLICE   = slice_flags::IS_LAST_SLICE;
    }
}

impl SliceFlags {
    /// Parse a raw flags byte, rejecting bits this encoding does not define.
    pub fn parse(raw: u8) -> Result<Self, StreamError> {
        Self::from_bits(raw).ok_or(StreamError::InvalidSliceFlags { raw })
    }

    pub fn type_id_kind(self) -> TypeIdKind {
        match TypeIdKind::try_from(self.bits() & slice_flags::TYPE_ID_MASK) {
            Ok(kind) => kind,
            // two bits, four variants
            Err(_) => unreachable!("type id kind is a two-bit field"),
        }
    }

    pub fn is_last(self) -> bool {
        self.contains(SliceFlags::IS_LAST_SLICE)
    }
}

/// How a slice names its type.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum TypeIdKind {
    None    = 0x00,
    String  = slice_flags::TYPE_ID_STRING,
    Index   = slice_flags::TYPE_ID_INDEX,
    Compact = slice_flags::TYPE_ID_COMPACT,
}

/// Encoding version carried by an encapsulation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingVersion {
    pub major: u8,
    pub minor: u8,
}

impl EncodingVersion {
    pub const V1_1: EncodingVersion = EncodingVersion {
        major: ENCODING_MAJOR,
        minor: ENCODING_MINOR,
    };

    pub fn is_supported(&self) -> bool {
        *self == Self::V1_1
    }
}

impl Default for EncodingVersion {
    fn default() -> Self {
        Self::V1_1
    }
}

impl fmt::Display for EncodingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Metadata of one slice, as returned by `InputStream::start_slice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceHeader {
    pub flags: SliceFlags,
    /// String type id; `None` when the slice used a compact id.
    pub type_id: Option<String>,
    /// Compact alias, or `NO_COMPACT_ID`.
    pub compact_id: i32,
    /// Payload length in bytes (size prefix excluded).
    pub payload_len: usize,
    /// Offset of the first payload byte.
    pub payload_start: usize,
}

impl SliceHeader {
    pub fn is_last(&self) -> bool {
        self.flags.is_last()
    }

    pub fn payload_end(&self) -> usize {
        self.payload_start + self.payload_len
    }

    pub fn has_compact_id(&self) -> bool {
        self.compact_id != NO_COMPACT_ID
    }

    /// Human-readable name of the slice type, for logs and errors.
    pub fn type_label(&self) -> String {
        match &self.type_id {
            Some(id) => id.clone(),
            None => format!("compact#{}", self.compact_id),
        }
    }

    /// Does this slice name the given level?
    pub fn matches(&self, type_id: &str, compact_id: i32) -> bool {
        match &self.type_id {
            Some(id) => id == type_id,
            None => compact_id != NO_COMPACT_ID && self.compact_id == compact_id,
        }
    }
}

/// Byte-level stream failures. Any of these is fatal to the current
/// marshaling operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("truncated stream: need {need} bytes at offset {offset}, have {have}")]
    Truncated { offset: usize, need: usize, have: usize },

    #[error("negative size on the wire: {raw}")]
    NegativeSize { raw: i32 },

    #[error("size {size} does not fit the wire encoding")]
    SizeOverflow { size: usize },

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid bool byte: 0x{raw:02x}")]
    InvalidBool { raw: u8 },

    #[error("invalid slice flags: 0x{raw:02x}")]
    InvalidSliceFlags { raw: u8 },

    #[error("unsupported type id kind: {kind:?}")]
    UnsupportedTypeIdKind { kind: TypeIdKind },

    #[error("exception slice is missing its size")]
    MissingSliceSize,

    #[error("invalid slice size: {raw}")]
    InvalidSliceSize { raw: i32 },

    #[error("slice already open")]
    SliceAlreadyOpen,

    #[error("no open slice")]
    NoOpenSlice,

    #[error("slice size mismatch: declared {expected} payload bytes, consumed {actual}")]
    SliceSizeMismatch { expected: usize, actual: usize },

    #[error("unsupported encoding {version}")]
    UnsupportedEncoding { version: EncodingVersion },

    #[error("encapsulation size mismatch: declared {expected}, available {actual}")]
    EncapsulationSizeMismatch { expected: usize, actual: usize },

    #[error("no open encapsulation")]
    NoOpenEncapsulation,

    #[error("{count} trailing bytes after {context}")]
    TrailingBytes { count: usize, context: &'static str },
}
