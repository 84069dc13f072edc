use serde_json::json;

use crate::error::{Error, Incompatible};
use crate::types::Type;
use crate::value::{Object, Value};

/// A record that must be an instance of a class or interface.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectParameter {
    ty: Type,
    description: String,
    default: Option<Object>,
}

impl ObjectParameter {
    pub fn new(class_name: &str) -> Result<Self, Error> {
        Ok(Self { ty: Type::object(class_name)?, description: String::new(), default: None })
    }

    pub fn ty(&self) -> Type { self.ty.clone() }
    pub fn class_name(&self) -> &str { self.ty.hint() }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&Object> { self.default.as_ref() }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: Object) -> Result<Self, Error> {
        self.ty.assert(&Value::Object(value.clone()))?;
        Ok(Self { default: Some(value), ..self.clone() })
    }

    /// Instance-of check against the class and its interfaces.
    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.ty.assert(value)?;
        Ok(value.clone())
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        if self.class_name() != other.class_name() {
            return Err(Incompatible::Rule {
                topic: "className",
                expected: self.class_name().to_string(),
                provided: other.class_name().to_string(),
            }.into());
        }
        Ok(())
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "description": self.description,
            "default": self.default.as_ref().map(|o| Value::Object(o.clone()).to_json()),
            "className": self.class_name(),
        })
    }
}
