//! Slice protocol core.
//!
//! An exception type is a chain of levels, most derived first, ending at one
//! of two root terminators. Each level is a struct holding its immediate base
//! by value plus its own declared fields, and implements `ExceptionLevel`
//! naming that base. Writing walks the chain leaf to root emitting one slice
//! per level; reading walks it in the same order.
//!
//! Concrete types also get `RemoteException` (identity, re-signal,
//! downcasting) through a blanket impl, so a `&dyn RemoteException` always
//! answers for the leaf type.

pub mod level;
pub mod roots;
pub mod remote;
pub mod sliced;

pub use level::{Category, ExceptionLevel};
pub use roots::{SystemRoot, UserRoot};
pub use remote::{identify, resignal, AncestorRef, AsRemoteException, RemoteException};
pub use sliced::{SliceInfo, SlicedData};
