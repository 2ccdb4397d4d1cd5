//! slice-core
//!
//! Slice-chain marshaling for polymorphic RPC exceptions.
//! Pure Rust, no transport and no IDL compiler.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;

// Wire and type model
pub mod stream;
pub mod exception;
pub mod registry;
pub mod telemetry;

// Entry points
pub mod marshal;

pub use config::{MarshalConfig, SliceMode};
pub use types::MarshalError;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{MarshalConfig, SliceMode};
    pub use crate::exception::{
        identify, resignal, AncestorRef, AsRemoteException, Category, ExceptionLevel,
        RemoteException, SliceInfo, SlicedData, SystemRoot, UserRoot,
    };
    pub use crate::marshal::{
        decode_exception, decode_exception_with_telemetry, encode_exception,
        encode_exception_with_telemetry, read_exception, write_exception,
    };
    pub use crate::registry::{ExceptionFactoryRegistry, RegistryError};
    pub use crate::stream::{InputStream, OutputStream, StreamError, StreamField};
    pub use crate::telemetry::{MarshalCounters, TelemetrySnapshot};
    pub use crate::types::MarshalError;
}
