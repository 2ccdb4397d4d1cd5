//! Entry points used by the dispatch / transport layer, once per outgoing or
//! incoming exception.
//!
//! - `write_exception` / `read_exception` work on an open stream
//! - `encode_exception` / `decode_exception` add the encapsulation envelope

pub mod write;
pub mod read;
pub mod core;

pub use write::write_exception;
pub use read::read_exception;
pub use self::core::{
    decode_exception,
    decode_exception_with_telemetry,
    encode_exception,
    encode_exception_with_telemetry,
};
