//! telemetry/counters.rs
//! Mutable counters collected while marshaling exceptions.
//!
//! Summary: streams count slices as they are bracketed; the marshal entry
//! points count whole exceptions. Converted into an immutable
//! `TelemetrySnapshot` at the end of an operation.
use bincode::{Decode, Encode};
use std::ops::AddAssign;

/// Deterministic counters collected during marshaling.
#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq)]
pub struct MarshalCounters {
    pub exceptions_written: u64,
    pub exceptions_read: u64,
    /// Exceptions decoded as a known ancestor of an unknown leaf.
    pub exceptions_sliced: u64,
    pub slices_written: u64,
    pub slices_read: u64,
    pub slices_skipped: u64,
    pub slices_preserved: u64,
    pub bytes_payload_written: u64,
    pub bytes_payload_read: u64,
    pub bytes_payload_skipped: u64,
    /// Encapsulation bytes, header included.
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
}

impl MarshalCounters {
    /// Record one slice closed by `OutputStream::end_slice`.
    pub fn add_slice_written(&mut self, payload_len: usize) {
        self.slices_written += 1;
        self.bytes_payload_written += payload_len as u64;
    }

    /// Record one slice closed by `InputStream::end_slice`.
    pub fn add_slice_read(&mut self, payload_len: usize) {
        self.slices_read += 1;
        self.bytes_payload_read += payload_len as u64;
    }

    /// Record one slice skipped because its type is unknown.
    pub fn add_slice_skipped(&mut self, payload_len: usize) {
        self.slices_skipped += 1;
        self.bytes_payload_skipped += payload_len as u64;
    }

    /// Record slices kept for re-emission.
    pub fn add_slices_preserved(&mut self, count: usize) {
        self.slices_preserved += count as u64;
    }

    pub fn add_exception_written(&mut self, encoded_len: usize) {
        self.exceptions_written += 1;
        self.bytes_encoded += encoded_len as u64;
    }

    /// - `sliced`: the decoded type is an ancestor of the sender's type
    pub fn add_exception_read(&mut self, encoded_len: usize, sliced: bool) {
        self.exceptions_read += 1;
        self.bytes_decoded += encoded_len as u64;
        if sliced {
            self.exceptions_sliced += 1;
        }
    }

    /// Fold counters from another operation into these.
    pub fn merge(&mut self, other: &MarshalCounters) {
        self.exceptions_written += other.exceptions_written;
        self.exceptions_read += other.exceptions_read;
        self.exceptions_sliced += other.exceptions_sliced;

        self.slices_written += other.slices_written;
        self.slices_read += other.slices_read;
        self.slices_skipped += other.slices_skipped;
        self.slices_preserved += other.slices_preserved;

        self.bytes_payload_written += other.bytes_payload_written;
        self.bytes_payload_read += other.bytes_payload_read;
        self.bytes_payload_skipped += other.bytes_payload_skipped;
        self.bytes_encoded += other.bytes_encoded;
        self.bytes_decoded += other.bytes_decoded;
    }

    /// Compact binary form, for shipping counters between processes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self, bincode::config::standard())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let (counters, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(counters)
    }
}

impl AddAssign for MarshalCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
