#![allow(dead_code)]

//! Exception hierarchies shared by the integration tests.
//!
//! System chain: `SystemError` -> `ArithmeticError` -> `Overflow`.
//!
//! User chain (relative to `Base`):
//! - known to both peers: `KnownDerived`, `KnownIntermediate`, `KnownMostDerived`
//! - sender only: `UnknownDerived`, `UnknownIntermediate`, `UnknownMostDerived1`
//!   (under `KnownIntermediate`) and `UnknownMostDerived2` (under `UnknownIntermediate`)
//! - chain length one: `Standalone`
//! - compact ids: `CompactDerived` (known), `UnknownCompact` (sender only)

use slice_core::prelude::*;
use thiserror::Error;

// -----------------------------------------------------------------------------
// System chain, written out by hand
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("system error: {reason}")]
pub struct SystemError {
    pub base: SystemRoot,
    pub reason: String,
}

impl ExceptionLevel for SystemError {
    type Base = SystemRoot;
    const TYPE_ID: &'static str = "::Demo::SystemError";

    fn base(&self) -> &SystemRoot {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SystemRoot {
        &mut self.base
    }

    fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write(&self.reason)
    }

    fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError> {
        self.reason = is.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("arithmetic error in {op}")]
pub struct ArithmeticError {
    pub base: SystemError,
    pub op: String,
}

impl ExceptionLevel for ArithmeticError {
    type Base = SystemError;
    const TYPE_ID: &'static str = "::Demo::ArithmeticError";

    fn base(&self) -> &SystemError {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SystemError {
        &mut self.base
    }

    fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write(&self.op)
    }

    fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError> {
        self.op = is.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("overflow (code {code})")]
pub struct Overflow {
    pub base: ArithmeticError,
    pub code: i32,
    pub operands: Vec<i64>,
}

impl ExceptionLevel for Overflow {
    type Base = ArithmeticError;
    const TYPE_ID: &'static str = "::Demo::Overflow";

    fn base(&self) -> &ArithmeticError {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ArithmeticError {
        &mut self.base
    }

    fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write(&self.code)?;
        os.write(&self.operands)
    }

    fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError> {
        self.code = is.read()?;
        self.operands = is.read()?;
        Ok(())
    }
}

pub fn overflow(code: i32) -> Overflow {
    Overflow {
        base: ArithmeticError {
            base: SystemError {
                base: SystemRoot::default(),
                reason: "integer overflow".into(),
            },
            op: "add".into(),
        },
        code,
        operands: vec![i64::MAX, 1],
    }
}

// -----------------------------------------------------------------------------
// User chain
// -----------------------------------------------------------------------------

/// One level with a single field. Display prints the type id.
macro_rules! exception_level {
    ($name:ident : $base:ty, $type_id:expr, $field:ident : $fty:ty) => {
        exception_level!($name : $base, $type_id, -1, $field : $fty);
    };
    ($name:ident : $base:ty, $type_id:expr, $compact_id:expr, $field:ident : $fty:ty) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub base: $base,
            pub $field: $fty,
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($type_id)
            }
        }

        impl std::error::Error for $name {}

        impl ExceptionLevel for $name {
            type Base = $base;
            const TYPE_ID: &'static str = $type_id;
            const COMPACT_ID: i32 = $compact_id;

            fn base(&self) -> &$base {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $base {
                &mut self.base
            }

            fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
                os.write(&self.$field)
            }

            fn read_fields(&mut self, is: &mut InputStream<'_>) -> Result<(), StreamError> {
                self.$field = is.read()?;
                Ok(())
            }
        }
    };
}

exception_level!(Base: UserRoot, "::Test::Base", b: String);
exception_level!(KnownDerived: Base, "::Test::KnownDerived", kd: String);
exception_level!(KnownIntermediate: Base, "::Test::KnownIntermediate", ki: String);
exception_level!(KnownMostDerived: KnownIntermediate, "::Test::KnownMostDerived", kmd: String);

exception_level!(UnknownDerived: Base, "::Test::UnknownDerived", ud: String);
exception_level!(UnknownIntermediate: Base, "::Test::UnknownIntermediate", ui: String);
exception_level!(UnknownMostDerived1: KnownIntermediate, "::Test::UnknownMostDerived1", umd1: String);
exception_level!(UnknownMostDerived2: UnknownIntermediate, "::Test::UnknownMostDerived2", umd2: String);

exception_level!(Standalone: UserRoot, "::Test::Standalone", reason: String);

exception_level!(CompactDerived: Base, "::Test::CompactDerived", 7, value: i64);
exception_level!(UnknownCompact: Base, "::Test::UnknownCompact", 9, blob: Vec<u8>);

/// Writes one byte of its own slice, then fails.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("unwritable")]
pub struct Unwritable {
    pub base: Base,
}

impl ExceptionLevel for Unwritable {
    type Base = Base;
    const TYPE_ID: &'static str = "::Test::Unwritable";

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    fn write_fields(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write_u8(1);
        Err(StreamError::SizeOverflow { size: usize::MAX })
    }

    fn read_fields(&mut self, _is: &mut InputStream<'_>) -> Result<(), StreamError> {
        Ok(())
    }
}

pub fn base(b: &str) -> Base {
    Base {
        base: UserRoot::default(),
        b: b.into(),
    }
}

pub fn known_intermediate(b: &str, ki: &str) -> KnownIntermediate {
    KnownIntermediate {
        base: base(b),
        ki: ki.into(),
    }
}

pub fn known_most_derived() -> KnownMostDerived {
    KnownMostDerived {
        base: known_intermediate("base", "intermediate"),
        kmd: "most derived".into(),
    }
}

pub fn unknown_most_derived2() -> UnknownMostDerived2 {
    UnknownMostDerived2 {
        base: UnknownIntermediate {
            base: base("base"),
            ui: "unknown intermediate".into(),
        },
        umd2: "unknown most derived".into(),
    }
}

/// Registry of a peer that knows every "Known" type.
pub fn receiver_registry() -> ExceptionFactoryRegistry {
    let mut registry = ExceptionFactoryRegistry::new();
    registry.register::<SystemError>().expect("register");
    registry.register::<ArithmeticError>().expect("register");
    registry.register::<Overflow>().expect("register");
    registry.register::<Base>().expect("register");
    registry.register::<KnownDerived>().expect("register");
    registry.register::<KnownIntermediate>().expect("register");
    registry.register::<KnownMostDerived>().expect("register");
    registry.register::<Standalone>().expect("register");
    registry.register::<CompactDerived>().expect("register");
    registry
}

/// Registry of a peer that knows everything, including the sender-only types.
pub fn sender_registry() -> ExceptionFactoryRegistry {
    let mut registry = receiver_registry();
    registry.register::<UnknownDerived>().expect("register");
    registry.register::<UnknownIntermediate>().expect("register");
    registry.register::<UnknownMostDerived1>().expect("register");
    registry.register::<UnknownMostDerived2>().expect("register");
    registry.register::<UnknownCompact>().expect("register");
    registry
}
