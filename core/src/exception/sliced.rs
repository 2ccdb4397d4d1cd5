//! Preserved slices.
//!
//! When the reader does not know the sender's leaf type it skips slices until
//! it reaches a known ancestor. In `SliceMode::Preserve` the skipped slices are
//! kept verbatim and attached to the decoded instance, so relaying that
//! instance re-emits them ahead of the known slices and the next hop still
//! sees the original concrete type.

use bytes::Bytes;

use crate::constants::NO_COMPACT_ID;
use crate::stream::{OutputStream, SliceHeader, StreamError};

/// One undecoded slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceInfo {
    pub type_id: Option<String>,
    pub compact_id: i32,
    pub payload: Bytes,
    /// Flag as received; re-emitted slices are never last.
    pub is_last: bool,
}

impl SliceInfo {
    pub fn from_skipped(header: &SliceHeader, payload: &[u8]) -> Self {
        Self {
            type_id: header.type_id.clone(),
            compact_id: header.compact_id,
            payload: Bytes::copy_from_slice(payload),
            is_last: header.is_last(),
        }
    }

    pub fn type_label(&self) -> String {
        match &self.type_id {
            Some(id) => id.clone(),
            None => format!("compact#{}", self.compact_id),
        }
    }

    /// Concise debug summary; payload shown as hex, capped at 16 bytes.
    pub fn summary(&self) -> String {
        let shown = &self.payload[..self.payload.len().min(16)];
        let ellipsis = if self.payload.len() > shown.len() { "…" } else { "" };
        format!(
            "SliceInfo {{ type: {}, len: {}, last: {}, payload: 0x{}{} }}",
            self.type_label(),
            self.payload.len(),
            self.is_last,
            hex::encode(shown),
            ellipsis,
        )
    }

    fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        match &self.type_id {
            Some(id) => os.start_slice(id, self.compact_id, false)?,
            None => os.start_compact_slice(self.compact_id, false)?,
        }
        os.write_raw(&self.payload);
        os.end_slice()
    }
}

/// Slices of a more-derived type than the one decoded, most derived first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlicedData {
    slices: Vec<SliceInfo>,
}

impl SlicedData {
    pub fn new(slices: Vec<SliceInfo>) -> Self {
        Self { slices }
    }

    pub fn slices(&self) -> &[SliceInfo] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Type of the sender's concrete exception.
    pub fn most_derived(&self) -> Option<String> {
        self.slices.first().map(SliceInfo::type_label)
    }

    /// Re-emit every preserved slice, none of them flagged last.
    pub fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        for slice in &self.slices {
            slice.write_to(os)?;
        }
        Ok(())
    }
}

impl From<Vec<SliceInfo>> for SlicedData {
    fn from(slices: Vec<SliceInfo>) -> Self {
        Self::new(slices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::InputStream;

    fn info(type_id: Option<&str>, compact_id: i32, payload: &[u8]) -> SliceInfo {
        SliceInfo {
            type_id: type_id.map(str::to_owned),
            compact_id,
            payload: Bytes::copy_from_slice(payload),
            is_last: true,
        }
    }

    #[test]
    fn reemitted_slices_are_never_last() {
        let data = SlicedData::new(vec![
            info(Some("::X::Leaf"), NO_COMPACT_ID, &[1, 2]),
            info(None, 7, &[3]),
        ]);

        let mut os = OutputStream::new();
        data.write_to(&mut os).unwrap();
        let bytes = os.into_bytes();

        let mut is = InputStream::new(&bytes);
        let (first, payload) = is.skip_slice().unwrap();
        assert_eq!(first.type_id.as_deref(), Some("::X::Leaf"));
        assert!(!first.is_last());
        assert_eq!(payload, &[1, 2]);

        let (second, payload) = is.skip_slice().unwrap();
        assert_eq!(second.type_id, None);
        assert_eq!(second.compact_id, 7);
        assert!(!second.is_last());
        assert_eq!(payload, &[3]);
    }

    #[test]
    fn summary_truncates_payload() {
        let s = info(Some("::X"), NO_COMPACT_ID, &[0xAB; 20]).summary();
        assert!(s.contains("len: 20"));
        assert!(s.contains(&"ab".repeat(16)));
        assert!(s.ends_with("… }"));
    }

    #[test]
    fn most_derived_is_first() {
        let data: SlicedData = vec![info(None, 3, &[]), info(Some("::Y"), -1, &[])].into();
        assert_eq!(data.most_derived().as_deref(), Some("compact#3"));
        assert_eq!(data.len(), 2);
    }
}
