//! Typed field codecs used by `ExceptionLevel::write_fields` / `read_fields`.

use crate::stream::{InputStream, OutputStream, StreamError};

/// A value that can be written to and read back from a slice payload.
pub trait StreamField: Sized {
    fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError>;
    fn read_from(is: &mut InputStream<'_>) -> Result<Self, StreamError>;
}

macro_rules! fixed_field {
    ($ty:ty, $write:ident, $read:ident) => {
        impl StreamField for $ty {
            fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
                os.$write(*self);
                Ok(())
            }

            fn read_from(is: &mut InputStream<'_>) -> Result<Self, StreamError> {
                is.$read()
            }
        }
    };
}

fixed_field!(bool, write_bool, read_bool);
fixed_field!(u8, write_u8, read_u8);
fixed_field!(i16, write_i16, read_i16);
fixed_field!(i32, write_i32, read_i32);
fixed_field!(i64, write_i64, read_i64);
fixed_field!(f32, write_f32, read_f32);
fixed_field!(f64, write_f64, read_f64);

impl StreamField for String {
    fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write_string(self)
    }

    fn read_from(is: &mut InputStream<'_>) -> Result<Self, StreamError> {
        is.read_string()
    }
}

/// Sequences: size prefix, then each element.
impl<T: StreamField> StreamField for Vec<T> {
    fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        os.write_size(self.len())?;
        for item in self {
            item.write_to(os)?;
        }
        Ok(())
    }

    fn read_from(is: &mut InputStream<'_>) -> Result<Self, StreamError> {
        let len = is.read_size()?;
        // every element takes at least one byte
        if len > is.remaining() {
            return Err(StreamError::Truncated {
                offset: is.position(),
                need: len,
                have: is.remaining(),
            });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(T::read_from(is)?);
        }
        Ok(out)
    }
}

/// Optional values: bool presence marker, then the value.
impl<T: StreamField> StreamField for Option<T> {
    fn write_to(&self, os: &mut OutputStream) -> Result<(), StreamError> {
        match self {
            Some(v) => {
                os.write_bool(true);
                v.write_to(os)
            }
            None => {
                os.write_bool(false);
                Ok(())
            }
        }
    }

    fn read_from(is: &mut InputStream<'_>) -> Result<Self, StreamError> {
        if is.read_bool()? {
            Ok(Some(T::read_from(is)?))
        } else {
            Ok(None)
        }
    }
}

impl OutputStream {
    /// Write any `StreamField`.
    pub fn write<T: StreamField>(&mut self, value: &T) -> Result<(), StreamError> {
        value.write_to(self)
    }
}

impl<'a> InputStream<'a> {
    /// Read any `StreamField`.
    pub fn read<T: StreamField>(&mut self) -> Result<T, StreamError> {
        T::read_from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_fields_roundtrip() {
        let names = vec!["a".to_string(), "bc".to_string()];
        let maybe: Option<i64> = Some(-3);
        let none: Option<String> = None;

        let mut os = OutputStream::new();
        os.write(&names).unwrap();
        os.write(&maybe).unwrap();
        os.write(&none).unwrap();
        os.write(&1.5f64).unwrap();
        let bytes = os.into_bytes();

        let mut is = InputStream::new(&bytes);
        assert_eq!(is.read::<Vec<String>>().unwrap(), names);
        assert_eq!(is.read::<Option<i64>>().unwrap(), maybe);
        assert_eq!(is.read::<Option<String>>().unwrap(), none);
        assert_eq!(is.read::<f64>().unwrap(), 1.5);
        assert!(is.is_at_end());
    }

    #[test]
    fn oversized_sequence_is_truncated() {
        let bytes = [200u8, 1, 2];
        let mut is = InputStream::new(&bytes);
        assert!(matches!(
            is.read::<Vec<u8>>(),
            Err(StreamError::Truncated { need: 200, have: 2, .. })
        ));
    }
}
