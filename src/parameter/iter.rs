use serde_json::json;

use crate::arguments::Arguments;
use crate::error::{Error, Violation};
use crate::parameter::Parameter;
use crate::parameters::Parameters;
use crate::types::{Primitive, Type};
use crate::value::{Map, Value};

const KEY_NAME: &str = "K *iterable";
const VALUE_NAME: &str = "V *iterable";

/// A non-empty array whose every key matches `key` and every value matches `value`.
#[derive(Clone, Debug, PartialEq)]
pub struct IterableParameter {
    key: Box<Parameter>,
    value: Box<Parameter>,
    description: String,
    default: Option<Map>,
}

impl IterableParameter {
    pub fn new(key: impl Into<Parameter>, value: impl Into<Parameter>) -> Self {
        Self {
            key: Box::new(key.into()),
            value: Box::new(value.into()),
            description: String::new(),
            default: None,
        }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Iterable) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&Map> { self.default.as_ref() }
    pub fn key(&self) -> &Parameter { &self.key }
    pub fn value(&self) -> &Parameter { &self.value }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: Map) -> Result<Self, Error> {
        self.check(&value)?;
        Ok(Self { default: Some(value), ..self.clone() })
    }

    /// Stops at the first failing pair.
    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.check(self.pairs(value)?)?;
        Ok(value.clone())
    }

    fn pairs<'v>(&self, value: &'v Value) -> Result<&'v Map, Error> {
        let ty = self.ty();
        ty.assert(value)?;
        match value {
            Value::Array(map) => Ok(map),
            _ => Err(ty.mismatch(value).into()),
        }
    }

    fn check(&self, map: &Map) -> Result<(), Error> {
        if map.is_empty() {
            return Err(Violation::Empty.into());
        }
        for (k, v) in map {
            self.key.invoke(&k.to_value()).map_err(|e| Error::keyed(KEY_NAME, e))?;
            self.value.invoke(v).map_err(|e| Error::keyed(VALUE_NAME, e))?;
        }
        Ok(())
    }

    /// Binds `value` as a collection with one required entry per supplied key.
    pub fn arguments(&self, value: &Value) -> Result<Arguments, Error> {
        let map = self.pairs(value)?;
        self.check(map)?;
        let parameters = map.keys().fold(Parameters::new(), |acc, k| {
            acc.with_required(k.to_string(), (*self.value).clone())
        });
        parameters.bind(value)
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        self.key.assert_compatible(&other.key)?;
        self.value.assert_compatible(&other.value)
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::Iterable.as_str(),
            "description": self.description,
            "default": self.default.as_ref().map(|m| Value::Array(m.clone()).to_json()),
            "parameters": {
                "K": self.key.schema(),
                "V": self.value.schema(),
            },
        })
    }
}
