//! Runtime property values.
//!
//! [`Value`] is the borrowed view of a property the encoder works with.
//! [`XmlValue`] connects Rust field types to it: every field type used with
//! `#[derive(XmlSerializable)]` implements it, which gives the derive both the
//! declared type of the field and a way to read it.

use std::any::Any;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use crate::metadata::{DeclaredType, TypeTag, XmlSerializable};

/// A property value borrowed from an instance.
#[derive(Clone)]
pub enum Value<'a> {
    /// Absent value. Properties holding it are never written.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Cow<'a, str>),
    /// A nested encodable object.
    Object(&'a dyn XmlSerializable),
    /// An ordered collection.
    Collection(Vec<Value<'a>>),
    /// A typed value that needs a coercion rule before it can be written.
    Opaque(&'a (dyn Any + Send + Sync)),
}

impl<'a> Value<'a> {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Collection(_) => "collection",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Renders a scalar value as XML text.
    ///
    /// Booleans are written as `1` and `0`, non-finite floats as `NAN`, `INF`
    /// and `-INF`. Returns `None` for values that
    /// have no text form (null, objects, collections, opaque values).
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Bool(b) => Some(Cow::Borrowed(bool_to_string(*b))),
            Value::Integer(i) => Some(Cow::Owned(i.to_string())),
            Value::Float(f) => Some(float_to_string(*f)),
            Value::String(s) => Some(Cow::Borrowed(s.as_ref())),
            Value::Null | Value::Object(_) | Value::Collection(_) | Value::Opaque(_) => None,
        }
    }

    /// Downcasts an opaque value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            Value::Opaque(any) => {
                let any: &'a (dyn Any + Send + Sync) = *any;
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    /// Creates an owned string value.
    pub fn string(s: impl Into<String>) -> Value<'static> {
        Value::String(Cow::Owned(s.into()))
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Object(o) => f.debug_tuple("Object").field(&o.metadata().name).finish(),
            Value::Collection(items) => f.debug_tuple("Collection").field(items).finish(),
            Value::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

/// Converts a Rust boolean to its XML form: `1` or `0`.
pub fn bool_to_string(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

/// Converts a float to its XML form. Non-finite values have fixed spellings.
pub fn float_to_string(f: f64) -> Cow<'static, str> {
    if f.is_nan() {
        Cow::Borrowed("NAN")
    } else if f.is_infinite() {
        Cow::Borrowed(if f > 0.0 { "INF" } else { "-INF" })
    } else {
        Cow::Owned(f.to_string())
    }
}

/// A field type the encoder can read.
pub trait XmlValue {
    /// Declared type reported for fields of this type.
    const DECLARED_TYPE: DeclaredType;

    fn to_xml_value(&self) -> Value<'_>;
}

impl XmlValue for String {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::String);

    fn to_xml_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self.as_str()))
    }
}

impl XmlValue for str {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::String);

    fn to_xml_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self))
    }
}

impl XmlValue for &str {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::String);

    fn to_xml_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(*self))
    }
}

impl XmlValue for Cow<'_, str> {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::String);

    fn to_xml_value(&self) -> Value<'_> {
        Value::String(Cow::Borrowed(self.as_ref()))
    }
}

impl XmlValue for char {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::String);

    fn to_xml_value(&self) -> Value<'_> {
        Value::String(Cow::Owned(self.to_string()))
    }
}

impl XmlValue for bool {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::Boolean);

    fn to_xml_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! impl_xml_value_int {
    ($($t:ty),*) => {
        $(
            impl XmlValue for $t {
                const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::Integer);

                fn to_xml_value(&self) -> Value<'_> {
                    Value::Integer(i64::from(*self))
                }
            }
        )*
    };
}

impl_xml_value_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider integers do not fit i64 losslessly and are written as text.
macro_rules! impl_xml_value_wide_int {
    ($($t:ty),*) => {
        $(
            impl XmlValue for $t {
                const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::Integer);

                fn to_xml_value(&self) -> Value<'_> {
                    match i64::try_from(*self) {
                        Ok(v) => Value::Integer(v),
                        Err(_) => Value::String(Cow::Owned(self.to_string())),
                    }
                }
            }
        )*
    };
}

impl_xml_value_wide_int!(u64, i128, u128, isize, usize);

impl XmlValue for f32 {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::Float);

    fn to_xml_value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl XmlValue for f64 {
    const DECLARED_TYPE: DeclaredType = DeclaredType::Single(TypeTag::Float);

    fn to_xml_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl<T: XmlValue> XmlValue for Option<T> {
    const DECLARED_TYPE: DeclaredType = T::DECLARED_TYPE;

    fn to_xml_value(&self) -> Value<'_> {
        match self {
            Some(v) => v.to_xml_value(),
            None => Value::Null,
        }
    }
}

impl<T: XmlValue + ?Sized> XmlValue for Box<T> {
    const DECLARED_TYPE: DeclaredType = T::DECLARED_TYPE;

    fn to_xml_value(&self) -> Value<'_> {
        (**self).to_xml_value()
    }
}

impl<T: XmlValue> XmlValue for Vec<T> {
    const DECLARED_TYPE: DeclaredType = T::DECLARED_TYPE.into_collection();

    fn to_xml_value(&self) -> Value<'_> {
        Value::Collection(self.iter().map(XmlValue::to_xml_value).collect())
    }
}

impl<T: XmlValue> XmlValue for [T] {
    const DECLARED_TYPE: DeclaredType = T::DECLARED_TYPE.into_collection();

    fn to_xml_value(&self) -> Value<'_> {
        Value::Collection(self.iter().map(XmlValue::to_xml_value).collect())
    }
}

impl<T: XmlValue> XmlValue for VecDeque<T> {
    const DECLARED_TYPE: DeclaredType = T::DECLARED_TYPE.into_collection();

    fn to_xml_value(&self) -> Value<'_> {
        Value::Collection(self.iter().map(XmlValue::to_xml_value).collect())
    }
}

#[cfg(feature = "chrono")]
mod chrono_impls {
    use super::*;

    macro_rules! impl_xml_value_opaque {
        ($($t:ty => $tag:literal),* $(,)?) => {
            $(
                impl XmlValue for $t {
                    const DECLARED_TYPE: DeclaredType =
                        DeclaredType::Single(TypeTag::Named($tag));

                    fn to_xml_value(&self) -> Value<'_> {
                        Value::Opaque(self)
                    }
                }
            )*
        };
    }

    impl_xml_value_opaque!(
        chrono::NaiveDate => "NaiveDate",
        chrono::NaiveDateTime => "NaiveDateTime",
        chrono::NaiveTime => "NaiveTime",
        chrono::DateTime<chrono::Utc> => "DateTime",
        chrono::DateTime<chrono::FixedOffset> => "DateTime",
    );
}
