//! Rule-free parameters: `null`, `mixed` and `bool`.
use serde_json::json;

use crate::error::Error;
use crate::types::{Primitive, Type};
use crate::value::Value;

/// Accepts exactly `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NullParameter {
    description: String,
}

impl NullParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into() }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Null) }
    pub fn description(&self) -> &str { &self.description }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into() }
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.ty().assert(value)?;
        Ok(Value::Null)
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::Null.as_str(),
            "description": self.description,
            "default": null,
        })
    }
}

/// Accepts any value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MixedParameter {
    description: String,
    default: Option<Value>,
}

impl MixedParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), default: None }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Mixed) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&Value> { self.default.as_ref() }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    /// A `null` default means "no default".
    pub fn with_default(&self, value: Value) -> Self {
        let default = (!value.is_null()).then_some(value);
        Self { default, ..self.clone() }
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.ty().assert(value)?;
        Ok(value.clone())
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::Mixed.as_str(),
            "description": self.description,
            "default": self.default.as_ref().map(Value::to_json),
        })
    }
}

/// Accepts `true` or `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoolParameter {
    description: String,
    default: Option<bool>,
}

impl BoolParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), default: None }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Bool) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<bool> { self.default }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: bool) -> Self {
        Self { default: Some(value), ..self.clone() }
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.ty().assert(value)?;
        Ok(value.clone())
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::Bool.as_str(),
            "description": self.description,
            "default": self.default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_accepts_only_null() {
        let p = NullParameter::new("");
        assert_eq!(p.invoke(&Value::Null).unwrap(), Value::Null);
        assert_eq!(
            p.invoke(&Value::from("")).unwrap_err().to_string(),
            "Argument value provided is not of type null"
        );
    }

    #[test]
    fn mixed_passes_everything_through() {
        let p = MixedParameter::new("any");
        for v in [Value::Null, Value::Int(1), Value::list([1, 2]), Value::from("x")] {
            assert_eq!(p.invoke(&v).unwrap(), v);
        }
        assert_eq!(p.with_default(Value::Null).default_value(), None);
        assert_eq!(p.with_default(Value::Int(3)).default_value(), Some(&Value::Int(3)));
    }

    #[test]
    fn bool_rejects_truthy_values() {
        let p = BoolParameter::new("").with_default(true);
        assert_eq!(p.invoke(&Value::Bool(false)).unwrap(), Value::Bool(false));
        assert!(p.invoke(&Value::Int(1)).is_err());
        assert_eq!(p.schema()["default"], json!(true));
    }
}
