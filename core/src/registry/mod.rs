//! registry/mod.rs
//! Exception factory registry: wire type id (or compact id) → constructor.
//!
//! The reader consults it for each slice header, most derived first, and
//! decodes with the first type it recognizes. Built once, then shared
//! read-only (typically behind an `Arc`).

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::exception::{Category, ExceptionLevel, RemoteException};
use crate::stream::SliceHeader;

/// Creates a default-initialized instance ready for `read_chain`.
pub type ExceptionFactory = fn() -> Box<dyn RemoteException>;

fn create_default<T>() -> Box<dyn RemoteException>
where
    T: RemoteException + Default,
{
    Box::new(T::default())
}

#[derive(Clone)]
pub struct FactoryEntry {
    pub type_id: &'static str,
    pub compact_id: i32,
    pub category: Category,
    /// Slices the registered type reads.
    pub depth: usize,
    factory: ExceptionFactory,
}

impl FactoryEntry {
    pub fn create(&self) -> Box<dyn RemoteException> {
        (self.factory)()
    }
}

impl fmt::Debug for FactoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryEntry")
            .field("type_id", &self.type_id)
            .field("compact_id", &self.compact_id)
            .field("category", &self.category)
            .field("depth", &self.depth)
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type id {type_id} already registered")]
    DuplicateTypeId { type_id: &'static str },

    #[error("compact id {compact_id} already bound to {existing}")]
    DuplicateCompactId { compact_id: i32, existing: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct ExceptionFactoryRegistry {
    by_id: HashMap<&'static str, FactoryEntry>,
    by_compact: HashMap<i32, &'static str>,
}

impl ExceptionFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concrete exception type under its static id and, when it
    /// declares one, its compact id.
    pub fn register<T>(&mut self) -> Result<(), RegistryError>
    where
        T: ExceptionLevel + RemoteException + Default,
    {
        if self.by_id.contains_key(T::TYPE_ID) {
            return Err(RegistryError::DuplicateTypeId { type_id: T::TYPE_ID });
        }
        if T::COMPACT_ID >= 0 {
            if let Some(existing) = self.by_compact.get(&T::COMPACT_ID) {
                return Err(RegistryError::DuplicateCompactId {
                    compact_id: T::COMPACT_ID,
                    existing: *existing,
                });
            }
            self.by_compact.insert(T::COMPACT_ID, T::TYPE_ID);
        }

        debug!(type_id = T::TYPE_ID, compact_id = T::COMPACT_ID, category = %T::CATEGORY, "register exception factory");

        self.by_id.insert(
            T::TYPE_ID,
            FactoryEntry {
                type_id: T::TYPE_ID,
                compact_id: T::COMPACT_ID,
                category: T::CATEGORY,
                depth: T::DEPTH,
                factory: create_default::<T>,
            },
        );
        Ok(())
    }

    /// Builder form of `register`.
    pub fn with<T>(mut self) -> Result<Self, RegistryError>
    where
        T: ExceptionLevel + RemoteException + Default,
    {
        self.register::<T>()?;
        Ok(self)
    }

    pub fn find(&self, type_id: &str) -> Option<&FactoryEntry> {
        self.by_id.get(type_id)
    }

    pub fn resolve_compact(&self, compact_id: i32) -> Option<&'static str> {
        self.by_compact.get(&compact_id).copied()
    }

    /// Factory for the type named by a slice header, if known.
    pub fn lookup(&self, header: &SliceHeader) -> Option<&FactoryEntry> {
        match &header.type_id {
            Some(id) => self.find(id),
            None => self
                .resolve_compact(header.compact_id)
                .and_then(|id| self.find(id)),
        }
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.by_id.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
