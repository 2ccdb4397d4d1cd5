//! Stream primitives for the sliced exception encoding.
//!
//! Responsibilities:
//! - Encode and decode primitive field values (little-endian)
//! - Frame encapsulations (size + encoding version)
//! - Bracket slices with `start_slice` / `end_slice` and back-patch sizes
//! - Skip or capture slices whose type the reader does not know
//!
//! Non-responsibilities:
//! - Knowing which exception types exist (see `registry`)
//! - Walking an exception chain (see `exception`)

pub mod types;
pub mod output;
pub mod input;
pub mod field;

pub use types::{
    EncodingVersion,
    SliceFlags,
    SliceHeader,
    StreamError,
    TypeIdKind,
};
pub use output::{OutputStream, StreamMark};
pub use input::InputStream;
pub use field::StreamField;
