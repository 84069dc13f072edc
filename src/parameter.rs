//! Parameter variants and the closed sum that dispatches over them.
mod arr;
mod iter;
mod num;
mod obj;
mod scalar;
mod str;
mod union;

pub use arr::{ArrayParameter, ArrayStringParameter};
pub use iter::IterableParameter;
pub use num::{FloatParameter, IntParameter, Number, Numeric, NumericRules};
pub use obj::ObjectParameter;
pub use scalar::{BoolParameter, MixedParameter, NullParameter};
pub use str::{StringParameter, StringRules};
pub use union::UnionParameter;

use ordered_float::OrderedFloat;

use crate::error::{Error, Incompatible};
use crate::types::Type;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Parameter {
    Null(NullParameter),
    Mixed(MixedParameter),
    Bool(BoolParameter),
    Int(IntParameter),
    Float(FloatParameter),
    String(StringParameter),
    Object(ObjectParameter),
    Array(ArrayParameter),
    Iterable(IterableParameter),
    Union(UnionParameter),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Parameter::Null($p) => $body,
            Parameter::Mixed($p) => $body,
            Parameter::Bool($p) => $body,
            Parameter::Int($p) => $body,
            Parameter::Float($p) => $body,
            Parameter::String($p) => $body,
            Parameter::Object($p) => $body,
            Parameter::Array($p) => $body,
            Parameter::Iterable($p) => $body,
            Parameter::Union($p) => $body,
        }
    };
}

impl Parameter {
    pub fn ty(&self) -> Type {
        dispatch!(self, p => p.ty())
    }

    pub fn description(&self) -> &str {
        dispatch!(self, p => p.description())
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        let description = description.into();
        dispatch!(self, p => p.with_description(description).into())
    }

    /// Validates `value` and returns it, possibly normalized (int widened to
    /// float, array defaults filled in).
    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        dispatch!(self, p => p.invoke(value))
    }

    /// The default used by the binder for an absent key. `None` when unset.
    pub fn default(&self) -> Option<Value> {
        match self {
            Parameter::Null(_) => None,
            Parameter::Mixed(p) => p.default_value().cloned(),
            Parameter::Bool(p) => p.default_value().map(Value::Bool),
            Parameter::Int(p) => p.default_value().map(Value::Int),
            Parameter::Float(p) => p.default_value().map(|x| Value::Float(x.0)),
            Parameter::String(p) => p.default_value().map(Value::from),
            Parameter::Object(p) => p.default_value().cloned().map(Value::Object),
            Parameter::Array(p) => p.default_value().cloned().map(Value::Array),
            Parameter::Iterable(p) => p.default_value().cloned().map(Value::Array),
            Parameter::Union(p) => p.default_value().cloned(),
        }
    }

    /// Sets the default from a dynamic value, validating it first.
    ///
    /// A `null` parameter takes no default, so only `null` is accepted there.
    pub fn with_default(&self, value: Value) -> Result<Self, Error> {
        Ok(match (self, value) {
            (Parameter::Null(p), Value::Null) => p.clone().into(),
            (Parameter::Mixed(p), v) => p.with_default(v).into(),
            (Parameter::Bool(p), Value::Bool(b)) => p.with_default(b).into(),
            (Parameter::Int(p), Value::Int(n)) => p.with_default(n)?.into(),
            (Parameter::Float(p), Value::Float(x)) => p.with_default(OrderedFloat(x))?.into(),
            (Parameter::Float(p), Value::Int(n)) => p.with_default(OrderedFloat(n as f64))?.into(),
            (Parameter::String(p), Value::String(s)) => p.with_default(s)?.into(),
            (Parameter::Object(p), Value::Object(o)) => p.with_default(o)?.into(),
            (Parameter::Array(p), v @ (Value::Array(_) | Value::Object(_))) => {
                let map = v.to_map().unwrap_or_default();
                p.with_default(map)?.into()
            }
            (Parameter::Iterable(p), Value::Array(m)) => p.with_default(m)?.into(),
            (Parameter::Union(p), v) => p.with_default(v)?.into(),
            (p, v) => return Err(p.ty().mismatch(&v).into()),
        })
    }

    /// `other` can stand in for `self`: same variant and identical rules.
    pub fn assert_compatible(&self, other: &Parameter) -> Result<(), Error> {
        match (self, other) {
            (Parameter::Null(_), Parameter::Null(_))
            | (Parameter::Mixed(_), Parameter::Mixed(_))
            | (Parameter::Bool(_), Parameter::Bool(_)) => Ok(()),
            (Parameter::Int(a), Parameter::Int(b)) => a.assert_compatible(b),
            (Parameter::Float(a), Parameter::Float(b)) => a.assert_compatible(b),
            (Parameter::String(a), Parameter::String(b)) => a.assert_compatible(b),
            (Parameter::Object(a), Parameter::Object(b)) => a.assert_compatible(b),
            (Parameter::Array(a), Parameter::Array(b)) => a.assert_compatible(b),
            (Parameter::Iterable(a), Parameter::Iterable(b)) => a.assert_compatible(b),
            (Parameter::Union(a), Parameter::Union(b)) => a.assert_compatible(b),
            (a, b) => Err(Incompatible::Type {
                expected: a.ty().primitive().to_string(),
                provided: b.ty().primitive().to_string(),
            }.into()),
        }
    }

    pub fn schema(&self) -> serde_json::Value {
        dispatch!(self, p => p.schema())
    }
}

macro_rules! from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Parameter {
                fn from(p: $ty) -> Self { Parameter::$variant(p) }
            }
        )*
    };
}

from_variant! {
    Null(NullParameter),
    Mixed(MixedParameter),
    Bool(BoolParameter),
    Int(IntParameter),
    Float(FloatParameter),
    String(StringParameter),
    Object(ObjectParameter),
    Array(ArrayParameter),
    Iterable(IterableParameter),
    Union(UnionParameter),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn dynamic_defaults_are_type_checked() {
        let p = Parameter::from(IntParameter::new("").with_min(1).unwrap());
        assert_eq!(p.with_default(Value::Int(3)).unwrap().default(), Some(Value::Int(3)));
        assert_eq!(p.with_default(Value::Int(0)).unwrap_err().kind(), ErrorKind::ConstraintViolation);
        assert_eq!(
            p.with_default(Value::from("3")).unwrap_err().to_string(),
            "Argument value provided must be of type int, string given"
        );
        let f = Parameter::from(FloatParameter::new(""));
        assert_eq!(f.with_default(Value::Int(2)).unwrap().default(), Some(Value::Float(2.0)));
        let n = Parameter::from(NullParameter::new(""));
        assert!(n.with_default(Value::Null).is_ok());
        assert!(n.with_default(Value::Int(1)).is_err());
    }

    #[test]
    fn different_variants_are_incompatible() {
        let a = Parameter::from(IntParameter::new(""));
        let b = Parameter::from(FloatParameter::new(""));
        assert_eq!(
            a.assert_compatible(&b).unwrap_err().to_string(),
            "Expected parameter of type `int`, provided `float`"
        );
        assert!(Parameter::from(BoolParameter::new("x")).assert_compatible(&BoolParameter::new("y").into()).is_ok());
    }

    #[test]
    fn with_description_keeps_variant_and_rules() {
        let p = Parameter::from(StringParameter::new("").with_length(2).unwrap()).with_description("code");
        assert_eq!(p.description(), "code");
        assert_eq!(p.schema()["length"], json!(2));
    }
}
