//! stream/input.rs
//!
//! Read side of the stream primitives.
//!
//! Reads are bounded by the innermost open frame: the open slice if any,
//! else the open encapsulation, else the buffer. A field codec that reads
//! past its slice fails with `Truncated` instead of consuming the next slice.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::constants::{ENCAPS_HEADER_LEN, NO_COMPACT_ID, SIZE_MARKER, SLICE_SIZE_LEN};
use crate::stream::types::{EncodingVersion, SliceFlags, SliceHeader, StreamError, TypeIdKind};
use crate::telemetry::MarshalCounters;

/// Zero-copy cursor over an encoded buffer.
#[derive(Debug)]
pub struct InputStream<'a> {
    buf: &'a [u8],
    pos: usize,
    /// End offsets of open encapsulations (innermost last).
    encaps: Vec<usize>,
    /// Slice currently open for field decoding.
    slice: Option<SliceHeader>,
    /// Header read by `peek_slice` and not yet started.
    pending: Option<SliceHeader>,
    counters: MarshalCounters,
}

impl<'a> InputStream<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            encaps: Vec::new(),
            slice: None,
            pending: None,
            counters: MarshalCounters::default(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the innermost frame boundary.
    pub fn remaining(&self) -> usize {
        self.limit() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn counters(&self) -> &MarshalCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut MarshalCounters {
        &mut self.counters
    }

    fn limit(&self) -> usize {
        if let Some(slice) = &self.slice {
            slice.payload_end()
        } else if let Some(end) = self.encaps.last() {
            *end
        } else {
            self.buf.len()
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], StreamError> {
        let limit = self.limit();
        if self.pos + n > limit {
            return Err(StreamError::Truncated {
                offset: self.pos,
                need: n,
                have: limit - self.pos,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    // --- Primitives -------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, StreamError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            raw => Err(StreamError::InvalidBool { raw }),
        }
    }

    pub fn read_i16(&mut self) -> Result<i16, StreamError> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, StreamError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, StreamError> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, StreamError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, StreamError> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn read_size(&mut self) -> Result<usize, StreamError> {
        let b = self.read_u8()?;
        if b != SIZE_MARKER {
            return Ok(b as usize);
        }
        let raw = self.read_i32()?;
        if raw < 0 {
            return Err(StreamError::NegativeSize { raw });
        }
        Ok(raw as usize)
    }

    pub fn read_string(&mut self) -> Result<String, StreamError> {
        let len = self.read_size()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| StreamError::InvalidUtf8)
    }

    /// Borrow `n` raw bytes.
    pub fn read_raw(&mut self, n: usize) -> Result<&'a [u8], StreamError> {
        self.take(n)
    }

    // --- Encapsulation ----------------------------------------------------

    /// Open an encapsulation and return its encoding version.
    pub fn start_encapsulation(&mut self) -> Result<EncodingVersion, StreamError> {
        let start = self.pos;
        let raw = self.read_i32()?;
        if raw < 0 {
            return Err(StreamError::NegativeSize { raw });
        }
        let size = raw as usize;
        let available = self.limit() - start;
        if size < ENCAPS_HEADER_LEN || size > available {
            return Err(StreamError::EncapsulationSizeMismatch {
                expected: size,
                actual: available,
            });
        }

        let version = EncodingVersion {
            major: self.read_u8()?,
            minor: self.read_u8()?,
        };
        if !version.is_supported() {
            return Err(StreamError::UnsupportedEncoding { version });
        }

        self.encaps.push(start + size);
        Ok(version)
    }

    /// Close the innermost encapsulation; every byte in it must be consumed.
    pub fn end_encapsulation(&mut self) -> Result<(), StreamError> {
        let end = *self.encaps.last().ok_or(StreamError::NoOpenEncapsulation)?;
        if self.pos != end {
            return Err(StreamError::TrailingBytes {
                count: end - self.pos,
                context: "encapsulation",
            });
        }
        self.encaps.pop();
        Ok(())
    }

    // --- Slices -----------------------------------------------------------

    fn read_slice_header(&mut self) -> Result<SliceHeader, StreamError> {
        let flags = SliceFlags::parse(self.read_u8()?)?;

        let (type_id, compact_id) = match flags.type_id_kind() {
            TypeIdKind::String => (Some(self.read_string()?), NO_COMPACT_ID),
            TypeIdKind::Compact => {
                let id = self.read_size()?;
                let id = i32::try_from(id).map_err(|_| StreamError::SizeOverflow { size: id })?;
                (None, id)
            }
            kind => return Err(StreamError::UnsupportedTypeIdKind { kind }),
        };

        if !flags.contains(SliceFlags::HAS_SLICE_SIZE) {
            return Err(StreamError::MissingSliceSize);
        }
        let raw = self.read_i32()?;
        if raw < SLICE_SIZE_LEN as i32 {
            return Err(StreamError::InvalidSliceSize { raw });
        }

        let payload_len = raw as usize - SLICE_SIZE_LEN;
        let payload_start = self.pos;
        let limit = self.limit();
        if payload_start + payload_len > limit {
            return Err(StreamError::Truncated {
                offset: payload_start,
                need: payload_len,
                have: limit - payload_start,
            });
        }

        Ok(SliceHeader {
            flags,
            type_id,
            compact_id,
            payload_len,
            payload_start,
        })
    }

    /// Read the next slice header without opening the slice.
    ///
    /// The following `start_slice` or `skip_slice` reuses this header.
    pub fn peek_slice(&mut self) -> Result<SliceHeader, StreamError> {
        if self.slice.is_some() {
            return Err(StreamError::SliceAlreadyOpen);
        }
        let header = match self.pending.take() {
            Some(header) => header,
            None => self.read_slice_header()?,
        };
        self.pending = Some(header.clone());
        Ok(header)
    }

    /// Open the next slice for field decoding.
    pub fn start_slice(&mut self) -> Result<SliceHeader, StreamError> {
        if self.slice.is_some() {
            return Err(StreamError::SliceAlreadyOpen);
        }
        let header = match self.pending.take() {
            Some(header) => header,
            None => self.read_slice_header()?,
        };
        trace!(type_id = %header.type_label(), is_last = header.is_last(), "start slice");
        self.slice = Some(header.clone());
        Ok(header)
    }

    /// Close the open slice; the field codec must have consumed exactly its payload.
    pub fn end_slice(&mut self) -> Result<(), StreamError> {
        let header = self.slice.take().ok_or(StreamError::NoOpenSlice)?;
        let consumed = self.pos - header.payload_start;
        if consumed != header.payload_len {
            return Err(StreamError::SliceSizeMismatch {
                expected: header.payload_len,
                actual: consumed,
            });
        }
        self.counters.add_slice_read(header.payload_len);
        Ok(())
    }

    /// Skip the next slice, returning its header and raw payload.
    pub fn skip_slice(&mut self) -> Result<(SliceHeader, &'a [u8]), StreamError> {
        if self.slice.is_some() {
            return Err(StreamError::SliceAlreadyOpen);
        }
        let header = match self.pending.take() {
            Some(header) => header,
            None => self.read_slice_header()?,
        };
        let payload = &self.buf[header.payload_start..header.payload_end()];
        self.pos = header.payload_end();
        self.counters.add_slice_skipped(header.payload_len);
        trace!(type_id = %header.type_label(), len = header.payload_len, "skip slice");
        Ok((header, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::OutputStream;

    fn one_slice(payload: &[u8], is_last: bool) -> Vec<u8> {
        let mut os = OutputStream::new();
        os.start_slice("::Test::A", -1, is_last).unwrap();
        os.write_raw(payload);
        os.end_slice().unwrap();
        os.into_bytes()
    }

    #[test]
    fn large_size_roundtrip() {
        let mut os = OutputStream::new();
        os.write_size(70_000).unwrap();
        let bytes = os.into_bytes();
        assert_eq!(InputStream::new(&bytes).read_size().unwrap(), 70_000);
    }

    #[test]
    fn negative_size_is_rejected() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            InputStream::new(&bytes).read_size(),
            Err(StreamError::NegativeSize { raw: -1 })
        );
    }

    #[test]
    fn invalid_bool_is_rejected() {
        assert_eq!(
            InputStream::new(&[2]).read_bool(),
            Err(StreamError::InvalidBool { raw: 2 })
        );
    }

    #[test]
    fn peek_then_start_reuses_header() {
        let bytes = one_slice(&[1, 0, 0, 0], true);
        let mut is = InputStream::new(&bytes);

        let peeked = is.peek_slice().unwrap();
        let started = is.start_slice().unwrap();
        assert_eq!(peeked, started);
        assert_eq!(started.type_id.as_deref(), Some("::Test::A"));
        assert!(started.is_last());
        assert_eq!(is.read_i32().unwrap(), 1);
        is.end_slice().unwrap();
        assert!(is.is_at_end());
    }

    #[test]
    fn field_reads_stop_at_slice_boundary() {
        let mut bytes = one_slice(&[1, 2], false);
        bytes.extend_from_slice(&one_slice(&[3, 4, 5, 6], true));

        let mut is = InputStream::new(&bytes);
        is.start_slice().unwrap();
        assert!(matches!(is.read_i32(), Err(StreamError::Truncated { have: 2, .. })));
    }

    #[test]
    fn under_read_slice_is_rejected() {
        let bytes = one_slice(&[1, 2, 3, 4], true);
        let mut is = InputStream::new(&bytes);
        is.start_slice().unwrap();
        is.read_u8().unwrap();
        assert_eq!(
            is.end_slice(),
            Err(StreamError::SliceSizeMismatch { expected: 4, actual: 1 })
        );
    }

    #[test]
    fn skip_returns_payload() {
        let mut bytes = one_slice(&[9, 9], false);
        bytes.extend_from_slice(&one_slice(&[], true));

        let mut is = InputStream::new(&bytes);
        let (header, payload) = is.skip_slice().unwrap();
        assert!(!header.is_last());
        assert_eq!(payload, &[9, 9]);

        let next = is.start_slice().unwrap();
        assert!(next.is_last());
        is.end_slice().unwrap();
        assert_eq!(is.counters().slices_skipped, 1);
        assert_eq!(is.counters().slices_read, 1);
    }

    #[test]
    fn unknown_flag_bits_are_rejected() {
        let bytes = [0x01 | 0x04, 0];
        assert_eq!(
            InputStream::new(&bytes).start_slice(),
            Err(StreamError::InvalidSliceFlags { raw: 0x05 })
        );
    }

    #[test]
    fn index_type_ids_are_rejected() {
        let bytes = [0x02 | 0x10, 1];
        assert_eq!(
            InputStream::new(&bytes).start_slice(),
            Err(StreamError::UnsupportedTypeIdKind { kind: TypeIdKind::Index })
        );
    }

    #[test]
    fn slice_size_past_end_is_truncated() {
        let mut bytes = one_slice(&[1, 2, 3, 4], true);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            InputStream::new(&bytes).start_slice(),
            Err(StreamError::Truncated { need: 4, have: 2, .. })
        ));
    }

    #[test]
    fn encapsulation_version_is_checked() {
        let bytes = [6, 0, 0, 0, 1, 0];
        assert_eq!(
            InputStream::new(&bytes).start_encapsulation(),
            Err(StreamError::UnsupportedEncoding {
                version: EncodingVersion { major: 1, minor: 0 }
            })
        );
    }

    #[test]
    fn encapsulation_trailing_bytes() {
        let bytes = [8, 0, 0, 0, 1, 1, 0xAA, 0xBB];
        let mut is = InputStream::new(&bytes);
        is.start_encapsulation().unwrap();
        is.read_u8().unwrap();
        assert_eq!(
            is.end_encapsulation(),
            Err(StreamError::TrailingBytes { count: 1, context: "encapsulation" })
        );
    }
}
