//! Field values exchanged between the layout engine and typed messages

use super::CodecError;
use serde::Serialize;

/// A single decoded field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Unsigned integer, enumeration or flag set
    Unsigned(u64),
    /// Two's complement integer
    Signed(i64),
    /// IEEE-754 single
    F32(f32),
    /// IEEE-754 double
    F64(f64),
    /// Opaque fixed-length bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Unsigned(_) => "unsigned",
            Self::Signed(_) => "signed",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Bytes(_) => "bytes",
        }
    }
}

macro_rules! value_from {
    ($variant:ident => $($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        })+
    };
}

value_from!(Unsigned => u8, u16, u32, u64);
value_from!(Signed => i8, i16, i32, i64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Conversion from a decoded field into a Rust type
pub trait FromValue: Sized {
    /// Convert, naming `field` in any error
    fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError>;
}

fn mismatch(field: &'static str, expected: &'static str, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        field,
        expected,
        found: value.kind_name(),
    }
}

macro_rules! from_unsigned {
    ($($ty:ty),+) => {
        $(impl FromValue for $ty {
            fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError> {
                match value {
                    Value::Unsigned(v) => <$ty>::try_from(*v).map_err(|_| CodecError::OutOfRange {
                        field,
                        value: v.to_string(),
                        bits: <$ty>::BITS as usize,
                    }),
                    other => Err(mismatch(field, "unsigned", other)),
                }
            }
        })+
    };
}

macro_rules! from_signed {
    ($($ty:ty),+) => {
        $(impl FromValue for $ty {
            fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError> {
                match value {
                    Value::Signed(v) => <$ty>::try_from(*v).map_err(|_| CodecError::OutOfRange {
                        field,
                        value: v.to_string(),
                        bits: <$ty>::BITS as usize,
                    }),
                    other => Err(mismatch(field, "signed", other)),
                }
            }
        })+
    };
}

from_unsigned!(u8, u16, u32, u64);
from_signed!(i8, i16, i32, i64);

impl FromValue for f32 {
    fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::F32(v) => Ok(*v),
            other => Err(mismatch(field, "f32", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::F64(v) => Ok(*v),
            other => Err(mismatch(field, "f64", other)),
        }
    }
}

impl<const N: usize> FromValue for [u8; N] {
    fn from_value(field: &'static str, value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Bytes(v) => <[u8; N]>::try_from(v.as_slice()).map_err(|_| CodecError::OutOfRange {
                field,
                value: format!("{} bytes", v.len()),
                bits: N * 8,
            }),
            other => Err(mismatch(field, "bytes", other)),
        }
    }
}

/// Closed enumeration carried in an unsigned field
pub trait WireEnum: Sized + Copy {
    /// Enumeration name, for error messages
    const NAME: &'static str;

    /// Map a raw wire value, `None` when unrecognized
    fn from_raw(raw: u64) -> Option<Self>;

    /// Raw wire value
    fn raw(self) -> u64;
}

/// Open bit-flag set carried in an unsigned field
pub trait WireFlags: Sized + Copy {
    /// Wrap any bit pattern
    fn from_bits(bits: u64) -> Self;

    /// Raw bit pattern
    fn bits(self) -> u64;
}

/// Ordered named field values of one message or sub-record.
///
/// Array messages additionally carry their decoded sub-records in `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldSet {
    values: Vec<(&'static str, Value)>,
    items: Vec<FieldSet>,
}

impl FieldSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Builder-style insert of an enumeration
    #[must_use]
    pub fn with_enum<E: WireEnum>(self, name: &'static str, value: E) -> Self {
        self.with(name, value.raw())
    }

    /// Builder-style insert of a flag set
    #[must_use]
    pub fn with_flags<F: WireFlags>(self, name: &'static str, value: F) -> Self {
        self.with(name, value.bits())
    }

    /// Builder-style sub-records
    #[must_use]
    pub fn with_items(mut self, items: Vec<FieldSet>) -> Self {
        self.items = items;
        self
    }

    /// Append a value, replacing an earlier one of the same name
    pub fn push(&mut self, name: &'static str, value: Value) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Raw value by name
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Number of named values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No named values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Decoded sub-records of an array message
    pub fn items(&self) -> &[FieldSet] {
        &self.items
    }

    /// Typed field
    pub fn get<T: FromValue>(&self, name: &'static str) -> Result<T, CodecError> {
        let value = self.value(name).ok_or(CodecError::MissingField(name))?;
        T::from_value(name, value)
    }

    /// Closed enumeration field; unknown raw values are an error
    pub fn enumeration<E: WireEnum>(&self, name: &'static str) -> Result<E, CodecError> {
        let raw: u64 = self.get(name)?;
        E::from_raw(raw).ok_or(CodecError::UnknownEnumValue {
            field: name,
            enumeration: E::NAME,
            value: raw,
        })
    }

    /// Closed enumeration field that may be absent in this direction
    pub fn enumeration_or<E: WireEnum>(&self, name: &'static str, default: E) -> Result<E, CodecError> {
        if self.value(name).is_none() {
            return Ok(default);
        }
        self.enumeration(name)
    }

    /// Flag set field; any bit pattern is accepted
    pub fn flags<F: WireFlags>(&self, name: &'static str) -> Result<F, CodecError> {
        let raw: u64 = self.get(name)?;
        Ok(F::from_bits(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Off,
        On,
    }

    impl WireEnum for Mode {
        const NAME: &'static str = "Mode";

        fn from_raw(raw: u64) -> Option<Self> {
            match raw {
                0 => Some(Self::Off),
                1 => Some(Self::On),
                _ => None,
            }
        }

        fn raw(self) -> u64 {
            self as u64
        }
    }

    #[test]
    fn test_typed_access() {
        let fields = FieldSet::new()
            .with("iod", 0x3Du8)
            .with("cn0", -5i8)
            .with("tow", 1.5f64)
            .with("words", [1u8, 2, 3]);

        assert_eq!(fields.get::<u8>("iod").unwrap(), 0x3D);
        assert_eq!(fields.get::<u16>("iod").unwrap(), 0x3D);
        assert_eq!(fields.get::<i8>("cn0").unwrap(), -5);
        assert_eq!(fields.get::<f64>("tow").unwrap(), 1.5);
        assert_eq!(fields.get::<[u8; 3]>("words").unwrap(), [1, 2, 3]);
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn test_access_errors() {
        let fields = FieldSet::new().with("wn", 0x1234u16).with("mode", 7u8);

        assert!(matches!(fields.get::<u8>("wn"), Err(CodecError::OutOfRange { .. })));
        assert!(matches!(fields.get::<i16>("wn"), Err(CodecError::TypeMismatch { .. })));
        assert!(matches!(fields.get::<u8>("nope"), Err(CodecError::MissingField("nope"))));
        assert!(matches!(fields.get::<[u8; 2]>("wn"), Err(CodecError::TypeMismatch { .. })));
        assert!(matches!(
            fields.enumeration::<Mode>("mode"),
            Err(CodecError::UnknownEnumValue { value: 7, .. })
        ));
    }

    #[test]
    fn test_defaults_for_absent_fields() {
        let fields = FieldSet::new().with_enum("mode", Mode::On);
        assert_eq!(fields.enumeration::<Mode>("mode").unwrap(), Mode::On);
        assert_eq!(fields.enumeration_or("persist", Mode::Off).unwrap(), Mode::Off);
    }

    #[test]
    fn test_push_replaces() {
        let mut fields = FieldSet::new().with("iod", 1u8);
        fields.push("iod", Value::Unsigned(2));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get::<u8>("iod").unwrap(), 2);
    }
}
