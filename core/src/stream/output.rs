//! stream/output.rs
//!
//! Write side of the stream primitives.
//!
//! Layout of one exception slice:
//!
//! ```text
//! [ flags (1) ]
//! [ type id: string (size + utf8) | compact id (size) ]
//! [ slice size (4, LE, counts itself) ]
//! [ payload (N) ]
//! ```

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::constants::{SIZE_MARKER, SLICE_SIZE_LEN};
use crate::stream::types::{EncodingVersion, SliceFlags, StreamError};
use crate::telemetry::MarshalCounters;

/// Stream state captured by `OutputStream::mark`.
#[derive(Debug, Clone)]
pub struct StreamMark {
    len: usize,
    encaps: usize,
    slice: Option<usize>,
    counters: MarshalCounters,
}

/// Growable output buffer with slice and encapsulation bracketing.
#[derive(Debug, Default)]
pub struct OutputStream {
    buf: Vec<u8>,
    /// Start offsets of open encapsulations (innermost last).
    encaps: Vec<usize>,
    /// Offset of the size prefix of the open slice.
    slice: Option<usize>,
    /// Use compact ids when a level declares one.
    compact_ids: bool,
    counters: MarshalCounters,
}

impl OutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compact_ids(compact_ids: bool) -> Self {
        Self { compact_ids, ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn counters(&self) -> &MarshalCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut MarshalCounters {
        &mut self.counters
    }

    pub fn in_slice(&self) -> bool {
        self.slice.is_some()
    }

    pub fn mark(&self) -> StreamMark {
        StreamMark {
            len: self.buf.len(),
            encaps: self.encaps.len(),
            slice: self.slice,
            counters: self.counters.clone(),
        }
    }

    /// Drop everything written since `mark`, including slices and
    /// encapsulations opened after it and their counters.
    pub fn rollback(&mut self, mark: StreamMark) {
        self.buf.truncate(mark.len);
        self.encaps.truncate(mark.encaps);
        self.slice = mark.slice;
        self.counters = mark.counters;
    }

    // --- Primitives -------------------------------------------------------

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_i16(&mut self, v: i16) {
        let mut b = [0u8; 2];
        LittleEndian::write_i16(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i32(&mut self, v: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_i64(&mut self, v: i64) {
        let mut b = [0u8; 8];
        LittleEndian::write_i64(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_f32(&mut self, v: f32) {
        let mut b = [0u8; 4];
        LittleEndian::write_f32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub fn write_f64(&mut self, v: f64) {
        let mut b = [0u8; 8];
        LittleEndian::write_f64(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    /// Variable-length size: one byte below 255, else 0xFF + i32.
    pub fn write_size(&mut self, size: usize) -> Result<(), StreamError> {
        if size < SIZE_MARKER as usize {
            self.buf.push(size as u8);
            return Ok(());
        }
        let v = i32::try_from(size).map_err(|_| StreamError::SizeOverflow { size })?;
        self.buf.push(SIZE_MARKER);
        self.write_i32(v);
        Ok(())
    }

    pub fn write_string(&mut self, s: &str) -> Result<(), StreamError> {
        self.write_size(s.len())?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Append bytes verbatim (no length prefix).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn patch_i32(&mut self, pos: usize, len: usize) -> Result<(), StreamError> {
        let v = i32::try_from(len).map_err(|_| StreamError::SizeOverflow { size: len })?;
        LittleEndian::write_i32(&mut self.buf[pos..pos + 4], v);
        Ok(())
    }

    // --- Encapsulation ----------------------------------------------------

    /// Open an encapsulation; the size is back-patched by `end_encapsulation`.
    pub fn start_encapsulation(&mut self, version: EncodingVersion) {
        self.encaps.push(self.buf.len());
        self.write_i32(0);
        self.write_u8(version.major);
        self.write_u8(version.minor);
    }

    pub fn end_encapsulation(&mut self) -> Result<(), StreamError> {
        let start = self.encaps.pop().ok_or(StreamError::NoOpenEncapsulation)?;
        let len = self.buf.len() - start;
        self.patch_i32(start, len)
    }

    // --- Slices -----------------------------------------------------------

    /// Open a slice for one chain level.
    ///
    /// `compact_id` is only used when compact ids are enabled on this stream
    /// and the level declares one; otherwise the string id is written.
    pub fn start_slice(
        &mut self,
        type_id: &str,
        compact_id: i32,
        is_last: bool,
    ) -> Result<(), StreamError> {
        if self.compact_ids && compact_id >= 0 {
            return self.start_compact_slice(compact_id, is_last);
        }
        if self.slice.is_some() {
            return Err(StreamError::SliceAlreadyOpen);
        }

        trace!(type_id, is_last, "start slice");
        self.write_u8(Self::slice_flags(SliceFlags::TYPE_ID_STRING, is_last));
        self.write_string(type_id)?;
        self.open_slice();
        Ok(())
    }

    /// Open a slice named only by its compact id, whatever the stream setting.
    ///
    /// Used to re-emit preserved slices that arrived without a string id.
    pub fn start_compact_slice(&mut self, compact_id: i32, is_last: bool) -> Result<(), StreamError> {
        if self.slice.is_some() {
            return Err(StreamError::SliceAlreadyOpen);
        }
        let id = usize::try_from(compact_id)
            .map_err(|_| StreamError::NegativeSize { raw: compact_id })?;

        trace!(compact_id, is_last, "start compact slice");
        self.write_u8(Self::slice_flags(SliceFlags::TYPE_ID_COMPACT, is_last));
        self.write_size(id)?;
        self.open_slice();
        Ok(())
    }

    fn slice_flags(kind: SliceFlags, is_last: bool) -> u8 {
        let mut flags = kind | SliceFlags::HAS_SLICE_SIZE;
        if is_last {
            flags |= SliceFlags::IS_LAST_SLICE;
        }
        flags.bits()
    }

    fn open_slice(&mut self) {
        self.slice = Some(self.buf.len());
        self.write_i32(0);
    }

    /// Close the open slice and back-patch its size.
    pub fn end_slice(&mut self) -> Result<(), StreamError> {
        let pos = self.slice.take().ok_or(StreamError::NoOpenSlice)?;
        let len = self.buf.len() - pos;
        self.patch_i32(pos, len)?;
        self.counters.add_slice_written(len - SLICE_SIZE_LEN);
        Ok(())
    }
}
