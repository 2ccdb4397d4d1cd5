use std::any::{Any, TypeId};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NO_COMPACT_ID;
use crate::exception::sliced::SlicedData;
use crate::stream::{InputStream, OutputStream, StreamError};
use crate::types::MarshalError;

/// Which root an exception chain ends at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Runtime / system-level exceptions.
    System,
    /// Application-defined exceptions.
    User,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::System => f.write_str("system"),
            Category::User => f.write_str("user"),
        }
    }
}

/// One level of an exception chain: the `(T, Base)` pair.
///
/// Implementors provide the identity constants, access to the embedded base
/// value and the field codec for the fields declared at this level. The
/// default `write_impl` / `read_impl` bracket exactly one slice and then hand
/// over to `Base`; the root terminators override them with no-ops.
///
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
/// #[error("overflow (code {code})")]
/// pub struct Overflow {
///     pub base: ArithmeticError,
///     pub code: i32,
/// }
///
/// impl ExceptionLevel for Overflow {
///     type Base = ArithmeticError;
///     const TYPE_ID: &'static str = "::Demo::Overflow";
///
///     fn base(&self) -> &ArithmeticError { &self.base }
///     fn base_mut(&mut self) -> &mut ArithmeticError { &mut self.base }
///
///     fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
///         os.write(&self.code)
///     }
///
///     fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError> {
///         self.code = is.read()?;
///         Ok(())
///     }
/// }
/// ```
pub trait ExceptionLevel: Sized + Send + Sync + 'static {
    /// Immediate base: another level, or a root terminator.
    type Base: ExceptionLevel;

    /// Static, globally unique type id of this level.
    const TYPE_ID: &'static str;

    /// Compact alias for `TYPE_ID`, or `NO_COMPACT_ID`.
    const COMPACT_ID: i32 = NO_COMPACT_ID;

    /// Inherited from the root, so a chain can never mix categories.
    const CATEGORY: Category = <Self::Base as ExceptionLevel>::CATEGORY;

    const IS_ROOT: bool = false;

    /// Number of slices this level and its ancestors write.
    const DEPTH: usize = <Self::Base as ExceptionLevel>::DEPTH + 1;

    fn base(&self) -> &Self::Base;
    fn base_mut(&mut self) -> &mut Self::Base;

    /// Encode the fields declared at this level only.
    fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError>;

    /// Decode the fields declared at this level only.
    fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError>;

    /// Emit this level's slice, then the base's.
    fn write_impl(&self, os: &mut OutputStream) -> Result<(), MarshalError> {
        // last iff the base terminates the chain
        let is_last = <Self::Base as ExceptionLevel>::IS_ROOT;
        os.start_slice(Self::TYPE_ID, Self::COMPACT_ID, is_last)?;
        self.write_fields(os)?;
        os.end_slice()?;
        self.base().write_impl(os)
    }

    /// Consume this level's slice, then the base's.
    fn read_impl(&mut self, is: &mut InputStream<'_>) -> Result<(), MarshalError> {
        let header = is.start_slice()?;
        if !header.matches(Self::TYPE_ID, Self::COMPACT_ID) {
            return Err(MarshalError::UnexpectedSlice {
                expected: Self::TYPE_ID,
                found: header.type_label(),
            });
        }

        let expected_last = <Self::Base as ExceptionLevel>::IS_ROOT;
        if header.is_last() != expected_last {
            return Err(MarshalError::ChainMismatch {
                type_id: Self::TYPE_ID,
                expected_last,
                found_last: header.is_last(),
            });
        }

        self.read_fields(is)?;
        is.end_slice()?;
        self.base_mut().read_impl(is)
    }

    /// Push this level's id and every ancestor's, leaf first, root last.
    fn collect_type_ids(out: &mut Vec<&'static str>) {
        out.push(Self::TYPE_ID);
        <Self::Base as ExceptionLevel>::collect_type_ids(out);
    }

    /// This level or the ancestor of type `level`, as stored in the chain.
    fn find_level(&self, level: TypeId) -> Option<&dyn Any> {
        if TypeId::of::<Self>() == level {
            return Some(self);
        }
        self.base().find_level(level)
    }

    /// Preserved slices live in the root; levels forward to it.
    fn preserved(&self) -> Option<&SlicedData> {
        self.base().preserved()
    }

    fn set_preserved(&mut self, data: Option<SlicedData>) {
        self.base_mut().set_preserved(data);
    }
}
