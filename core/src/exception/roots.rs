//! Root terminators: the base case of the chain recursion, one per category.
//!
//! A root writes and reads nothing. It is the type the last-slice flag is
//! evaluated against, and it carries the preserved slices of the instance.

use std::any::{Any, TypeId};

use crate::constants::root_ids;
use crate::exception::level::{Category, ExceptionLevel};
use crate::exception::sliced::SlicedData;
use crate::stream::{InputStream, OutputStream, StreamError};
use crate::types::MarshalError;

macro_rules! root_terminator {
    ($(#[$meta:meta])* $name:ident, $type_id:expr, $category:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            preserved: Option<SlicedData>,
        }

        impl ExceptionLevel for $name {
            type Base = $name;

            const TYPE_ID: &'static str = $type_id;
            const CATEGORY: Category = $category;
            const IS_ROOT: bool = true;
            const DEPTH: usize = 0;

            fn base(&self) -> &Self {
                self
            }

            fn base_mut(&mut self) -> &mut Self {
                self
            }

            fn write_fields(&self, _os: &mut OutputStream) -> Result<(), StreamError> {
                Ok(())
            }

            fn read_fields(&mut self, _is: &mut InputStream<'_>) -> Result<(), StreamError> {
                Ok(())
            }

            fn write_impl(&self, _os: &mut OutputStream) -> Result<(), MarshalError> {
                Ok(())
            }

            fn read_impl(&mut self, _is: &mut InputStream<'_>) -> Result<(), MarshalError> {
                Ok(())
            }

            fn collect_type_ids(out: &mut Vec<&'static str>) {
                out.push(Self::TYPE_ID);
            }

            fn find_level(&self, level: TypeId) -> Option<&dyn Any> {
                (TypeId::of::<Self>() == level).then_some(self as &dyn Any)
            }

            fn preserved(&self) -> Option<&SlicedData> {
                self.preserved.as_ref()
            }

            fn set_preserved(&mut self, data: Option<SlicedData>) {
                self.preserved = data;
            }
        }
    };
}

root_terminator!(
    /// Root of runtime / system-level exceptions.
    SystemRoot,
    root_ids::SYSTEM_EXCEPTION,
    Category::System
);

root_terminator!(
    /// Root of application-defined exceptions.
    UserRoot,
    root_ids::USER_EXCEPTION,
    Category::User
);
