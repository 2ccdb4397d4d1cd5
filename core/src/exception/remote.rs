//! Identity and re-signal for exceptions held through a type-erased reference.
//!
//! Two handles stand for a reference typed at an ancestor level:
//! `dyn RemoteException`, and `AncestorRef<L>`, which also exposes the
//! fields of level `L`. Through either, `identify` answers the leaf id and
//! `resignal` propagates a copy of the leaf value.
//!
//! A plain borrow of a `base` field is a reference to that subobject only.
//! Use `as_level` to view an ancestor without losing the leaf.

use std::any::{Any, TypeId};
use std::error::Error;
use std::fmt;
use std::ops::Deref;

use crate::exception::level::{Category, ExceptionLevel};
use crate::exception::sliced::SlicedData;
use crate::stream::{InputStream, OutputStream};
use crate::types::MarshalError;

/// Object-safe view of a concrete exception.
///
/// Implemented for every `ExceptionLevel + Clone + Error` type; never
/// implemented by hand, so identity always resolves to the concrete type.
pub trait RemoteException: Error + Any + Send + Sync {
    /// Static id of the most-derived type.
    fn identify(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Compact alias of the most-derived type, or `NO_COMPACT_ID`.
    fn compact_id(&self) -> i32;

    /// Chain ids, leaf first, root last.
    fn type_ids(&self) -> Vec<&'static str>;

    fn is_a(&self, type_id: &str) -> bool {
        self.type_ids().iter().any(|id| *id == type_id)
    }

    /// Number of slices the chain writes.
    fn chain_depth(&self) -> usize;

    /// Independent value copy of the concrete type.
    fn clone_exception(&self) -> Box<dyn RemoteException>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Write every known level, leaf first.
    fn write_chain(&self, os: &mut OutputStream) -> Result<(), MarshalError>;

    /// Read every known level, leaf first, into this instance.
    fn read_chain(&mut self, is: &mut InputStream<'_>) -> Result<(), MarshalError>;

    fn sliced_data(&self) -> Option<&SlicedData>;
    fn set_sliced_data(&mut self, data: Option<SlicedData>);

    /// The chain level of type `level`, if this exception has one.
    fn level_any(&self, level: TypeId) -> Option<&dyn Any>;

    /// View this exception at ancestor level `L`, keeping the leaf.
    fn as_level<L: ExceptionLevel>(&self) -> Option<AncestorRef<'_, L>>
    where
        Self: Sized,
    {
        AncestorRef::new(self)
    }
}

impl<T> RemoteException for T
where
    T: ExceptionLevel + Clone + Error,
{
    fn identify(&self) -> &'static str {
        T::TYPE_ID
    }

    fn category(&self) -> Category {
        T::CATEGORY
    }

    fn compact_id(&self) -> i32 {
        T::COMPACT_ID
    }

    fn type_ids(&self) -> Vec<&'static str> {
        let mut ids = Vec::with_capacity(T::DEPTH + 1);
        T::collect_type_ids(&mut ids);
        ids
    }

    fn chain_depth(&self) -> usize {
        T::DEPTH
    }

    fn clone_exception(&self) -> Box<dyn RemoteException> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn write_chain(&self, os: &mut OutputStream) -> Result<(), MarshalError> {
        self.write_impl(os)
    }

    fn read_chain(&mut self, is: &mut InputStream<'_>) -> Result<(), MarshalError> {
        self.read_impl(is)
    }

    fn sliced_data(&self) -> Option<&SlicedData> {
        self.preserved()
    }

    fn set_sliced_data(&mut self, data: Option<SlicedData>) {
        self.set_preserved(data);
    }

    fn level_any(&self, level: TypeId) -> Option<&dyn Any> {
        self.find_level(level)
    }
}

impl dyn RemoteException {
    pub fn is<T: RemoteException>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: RemoteException>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: RemoteException>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Recover the concrete box, or hand the original back.
    pub fn downcast<T: RemoteException>(
        self: Box<Self>,
    ) -> Result<Box<T>, Box<dyn RemoteException>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(concrete) => Ok(concrete),
            Err(_) => unreachable!("type checked above"),
        }
    }

    /// Propagate a copy of the concrete exception through `Err`.
    ///
    /// Never returns `Ok`; the copy is independent of `self`.
    pub fn resignal<R>(&self) -> Result<R, Box<dyn RemoteException>> {
        Err(self.clone_exception())
    }

    pub fn as_level<L: ExceptionLevel>(&self) -> Option<AncestorRef<'_, L>> {
        AncestorRef::new(self)
    }
}

/// Reference typed at ancestor level `L` of some concrete exception.
///
/// Derefs to `L` for field access; `identify` and `resignal` go to the leaf.
pub struct AncestorRef<'a, L> {
    leaf: &'a dyn RemoteException,
    level: &'a L,
}

impl<'a, L: ExceptionLevel> AncestorRef<'a, L> {
    fn new(leaf: &'a dyn RemoteException) -> Option<Self> {
        let level = leaf.level_any(TypeId::of::<L>())?.downcast_ref::<L>()?;
        Some(Self { leaf, level })
    }

    pub fn identify(&self) -> &'static str {
        self.leaf.identify()
    }

    pub fn resignal<R>(&self) -> Result<R, Box<dyn RemoteException>> {
        self.leaf.resignal()
    }

    /// The concrete exception this view was taken from.
    pub fn leaf(&self) -> &'a dyn RemoteException {
        self.leaf
    }

    pub fn level(&self) -> &'a L {
        self.level
    }
}

impl<L> Clone for AncestorRef<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for AncestorRef<'_, L> {}

impl<L> Deref for AncestorRef<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        self.level
    }
}

impl<L> fmt::Debug for AncestorRef<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AncestorRef")
            .field("leaf", &self.leaf.identify())
            .field("level", &std::any::type_name::<L>())
            .finish()
    }
}

impl Clone for Box<dyn RemoteException> {
    fn clone(&self) -> Self {
        self.clone_exception()
    }
}

/// Any handle that leads to a concrete exception.
pub trait AsRemoteException {
    fn as_remote(&self) -> &dyn RemoteException;
}

impl<T: RemoteException> AsRemoteException for T {
    fn as_remote(&self) -> &dyn RemoteException {
        self
    }
}

impl AsRemoteException for dyn RemoteException {
    fn as_remote(&self) -> &dyn RemoteException {
        self
    }
}

impl<L> AsRemoteException for AncestorRef<'_, L> {
    fn as_remote(&self) -> &dyn RemoteException {
        self.leaf
    }
}

/// Id of the most-derived type of `ex`.
pub fn identify(ex: &(impl AsRemoteException + ?Sized)) -> &'static str {
    ex.as_remote().identify()
}

/// Re-raise `ex` as its concrete type.
pub fn resignal<R>(ex: &(impl AsRemoteException + ?Sized)) -> Result<R, Box<dyn RemoteException>> {
    ex.as_remote().resignal()
}
