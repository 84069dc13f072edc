//! Typed getters over a validated value.
use crate::error::{Error, Violation};
use crate::value::{Map, Object, Value};

/// Borrowed view of one bound argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cast<'a> {
    value: &'a Value,
}

macro_rules! nullable {
    ($($name:ident => $get:ident: $ty:ty),* $(,)?) => {
        $(
            /// `None` for `null`, otherwise the same as the non-null getter.
            pub fn $name(&self) -> Result<Option<$ty>, Error> {
                match self.value {
                    Value::Null => Ok(None),
                    _ => self.$get().map(Some),
                }
            }
        )*
    };
}

impl<'a> Cast<'a> {
    pub fn new(value: &'a Value) -> Self { Self { value } }

    pub fn mixed(&self) -> &'a Value { self.value }

    pub fn int(&self) -> Result<i64, Error> {
        match self.value {
            Value::Int(n) => Ok(*n),
            other => Err(mismatch("int", other)),
        }
    }

    /// Ints widen to floats.
    pub fn float(&self) -> Result<f64, Error> {
        match self.value {
            Value::Float(x) => Ok(*x),
            Value::Int(n) => Ok(*n as f64),
            other => Err(mismatch("float", other)),
        }
    }

    pub fn bool(&self) -> Result<bool, Error> {
        match self.value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn string(&self) -> Result<&'a str, Error> {
        match self.value {
            Value::String(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn array(&self) -> Result<&'a Map, Error> {
        match self.value {
            Value::Array(m) => Ok(m),
            other => Err(mismatch("array", other)),
        }
    }

    pub fn iterable(&self) -> Result<&'a Map, Error> {
        match self.value {
            Value::Array(m) => Ok(m),
            other => Err(mismatch("iterable", other)),
        }
    }

    pub fn object(&self) -> Result<&'a Object, Error> {
        match self.value {
            Value::Object(o) => Ok(o),
            other => Err(mismatch("object", other)),
        }
    }

    nullable! {
        null_int => int: i64,
        null_float => float: f64,
        null_bool => bool: bool,
        null_string => string: &'a str,
        null_array => array: &'a Map,
        null_iterable => iterable: &'a Map,
        null_object => object: &'a Object,
    }
}

fn mismatch(expected: &str, given: &Value) -> Error {
    Violation::mismatch(expected, given).into()
}
