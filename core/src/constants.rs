/// Encoding version written into every encapsulation header.
/// "1.1" = sliced exception encoding with sized slices.
pub const ENCODING_MAJOR: u8 = 1;
pub const ENCODING_MINOR: u8 = 1;

/// Compact id value meaning "no compact alias, use the string type id".
pub const NO_COMPACT_ID: i32 = -1;

/// Sizes below this marker fit in a single byte; the marker itself announces an i32.
pub const SIZE_MARKER: u8 = 0xFF;

/// Encapsulation header: i32 size (self-inclusive) + major + minor.
pub const ENCAPS_HEADER_LEN: usize = 4 + 1 + 1;

/// Slice size prefix, counted as part of the slice size.
pub const SLICE_SIZE_LEN: usize = 4;

/// Defaults when Option<T> is None
pub const DEFAULT_MAX_SLICES: usize = 64;
/// Hard ceiling for `max_slices`, whatever the configuration says.
pub const MAX_SLICES_LIMIT: usize = 4096;

/// Static ids of the two root terminators.
pub mod root_ids {
    pub const SYSTEM_EXCEPTION: &str = "::Slice::SystemException";
    pub const USER_EXCEPTION: &str = "::Slice::UserException";
}

/// Slice flag bits (mirrored in `stream::types::SliceFlags`).
pub mod slice_flags {
    pub const TYPE_ID_STRING: u8  = 0x01;
    pub const TYPE_ID_INDEX: u8   = 0x02;
    pub const TYPE_ID_COMPACT: u8 = 0x03;
    pub const TYPE_ID_MASK: u8    = 0x03;
    pub const HAS_SLICE_SIZE: u8  = 0x10;
    pub const IS_LAST_SLICE: u8   = 0x20;
}
