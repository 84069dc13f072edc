use serde_json::json;

use crate::error::Error;
use crate::parameter::{Parameter, StringParameter};
use crate::parameters::Parameters;
use crate::types::{Primitive, Type};
use crate::value::{Key, Map, Value};

/// A keyed array (or record) checked against a nested [`Parameters`] schema.
///
/// With no declared keys the parameter is schemaless and any array passes
/// through untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayParameter {
    parameters: Parameters,
    description: String,
    default: Option<Map>,
}

impl ArrayParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    pub fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters, ..Self::default() }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Array) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&Map> { self.default.as_ref() }
    pub fn parameters(&self) -> &Parameters { &self.parameters }

    /// Declared keys are exactly `0, 1, .., n-1`.
    pub fn is_list(&self) -> bool {
        !self.parameters.is_empty()
            && self.parameters.keys().enumerate().all(|(i, k)| Key::parse(k) == Key::Int(i as i64))
    }

    pub fn is_map(&self) -> bool { !self.is_list() }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    /// Stores the bound form of `value`, so declared defaults are filled in.
    pub fn with_default(&self, value: Map) -> Result<Self, Error> {
        let bound = self.bind_map(&Value::Array(value))?;
        Ok(Self { default: Some(bound), ..self.clone() })
    }

    pub fn with_required(&self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
        self.with_parameters(self.parameters.with_required(name, parameter))
    }

    pub fn with_optional(&self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
        self.with_parameters(self.parameters.with_optional(name, parameter))
    }

    /// Replaces an existing entry, keeping its required/optional status.
    pub fn with_modify(&self, name: &str, parameter: impl Into<Parameter>) -> Result<Self, Error> {
        Ok(self.with_parameters(self.parameters.with_modify(name, parameter)?))
    }

    pub fn without(&self, names: &[&str]) -> Result<Self, Error> {
        Ok(self.with_parameters(self.parameters.without(names)?))
    }

    /// No names means every key.
    pub fn with_make_optional(&self, names: &[&str]) -> Result<Self, Error> {
        Ok(self.with_parameters(self.parameters.with_make_optional(names)?))
    }

    /// No names means every key.
    pub fn with_make_required(&self, names: &[&str]) -> Result<Self, Error> {
        Ok(self.with_parameters(self.parameters.with_make_required(names)?))
    }

    pub fn with_optional_minimum(&self, minimum: usize) -> Result<Self, Error> {
        Ok(self.with_parameters(self.parameters.with_optional_minimum(minimum)?))
    }

    fn with_parameters(&self, parameters: Parameters) -> Self {
        Self { parameters, ..self.clone() }
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.bind_map(value).map(Value::Array)
    }

    fn bind_map(&self, value: &Value) -> Result<Map, Error> {
        let ty = self.ty();
        ty.assert(value)?;
        let Some(map) = value.to_map() else {
            return Err(ty.mismatch(value).into());
        };
        if self.parameters.is_empty() {
            return Ok(map);
        }
        Ok(self.parameters.bind(&Value::Array(map))?.into_map())
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        self.parameters.assert_compatible(&other.parameters)
    }

    pub fn schema(&self) -> serde_json::Value {
        let subtype = if self.is_list() { "list" } else { "map" };
        json!({
            "type": format!("{}#{subtype}", Primitive::Array.as_str()),
            "description": self.description,
            "default": self.default.as_ref().map(|m| Value::Array(m.clone()).to_json()),
            "parameters": self.parameters.schema(),
            "optionalMinimum": self.parameters.optional_minimum(),
        })
    }
}

/// An [`ArrayParameter`] whose every entry is a [`StringParameter`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayStringParameter(ArrayParameter);

impl ArrayStringParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self(ArrayParameter::new(description))
    }

    pub fn as_array(&self) -> &ArrayParameter { &self.0 }
    pub fn parameters(&self) -> &Parameters { self.0.parameters() }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self(self.0.with_description(description))
    }

    pub fn with_required(&self, name: impl Into<String>, parameter: StringParameter) -> Self {
        Self(self.0.with_required(name, parameter))
    }

    pub fn with_optional(&self, name: impl Into<String>, parameter: StringParameter) -> Self {
        Self(self.0.with_optional(name, parameter))
    }

    pub fn with_modify(&self, name: &str, parameter: StringParameter) -> Result<Self, Error> {
        Ok(Self(self.0.with_modify(name, parameter)?))
    }

    pub fn without(&self, names: &[&str]) -> Result<Self, Error> {
        Ok(Self(self.0.without(names)?))
    }

    pub fn with_default(&self, value: Map) -> Result<Self, Error> {
        Ok(Self(self.0.with_default(value)?))
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        self.0.invoke(value)
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        self.0.assert_compatible(&other.0)
    }

    pub fn schema(&self) -> serde_json::Value {
        self.0.schema()
    }
}

impl From<ArrayStringParameter> for Parameter {
    fn from(p: ArrayStringParameter) -> Self {
        Parameter::Array(p.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parameter::IntParameter;
    use crate::value::Object;
    use serde_json::json;

    fn id_schema() -> ArrayParameter {
        ArrayParameter::new("").with_required("id", IntParameter::new("").with_min(1).unwrap())
    }

    #[test]
    fn schemaless_arrays_pass_through() {
        let p = ArrayParameter::new("");
        let v = Value::from(json!({"anything": [1, 2]}));
        assert_eq!(p.invoke(&v).unwrap(), v);
        assert!(p.invoke(&Value::from("x")).is_err());
    }

    #[test]
    fn nested_errors_carry_key_paths() {
        let outer = ArrayParameter::new("").with_required("inner", id_schema());
        let err = outer.invoke(&Value::from(json!({"inner": {"id": 0}}))).unwrap_err();
        assert_eq!(err.to_string(), "[inner]: [id]: Argument value provided `0` is less than `1`");
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn records_are_flattened_before_binding() {
        let record = Object::new("Row").with_field("id", 3).with_dynamic("id", 0);
        let out = id_schema().invoke(&Value::Object(record)).unwrap();
        assert_eq!(out, Value::map([("id", 3)]));
    }

    #[test]
    fn list_and_map_shapes() {
        let list = ArrayParameter::new("")
            .with_required("0", StringParameter::new(""))
            .with_required("1", StringParameter::new(""));
        assert!(list.is_list());
        assert_eq!(list.schema()["type"], json!("array#list"));
        assert!(id_schema().is_map());
        assert_eq!(id_schema().schema()["type"], json!("array#map"));
        assert_eq!(list.invoke(&Value::list(["a", "b"])).unwrap(), Value::list(["a", "b"]));
    }

    #[test]
    fn modify_keeps_optional_status() {
        let p = ArrayParameter::new("")
            .with_optional("n", IntParameter::new(""))
            .with_modify("n", IntParameter::new("").with_max(5).unwrap())
            .unwrap();
        assert!(p.parameters().is_optional("n"));
        assert!(p.invoke(&Value::map([("n", 6)])).is_err());
        assert!(p.with_modify("missing", IntParameter::new("")).is_err());
    }

    #[test]
    fn string_arrays_hold_only_strings() {
        let p = ArrayStringParameter::new("")
            .with_required("foo", StringParameter::new(""))
            .with_optional("bar", StringParameter::new("").with_starts_with("b").unwrap());
        let v = Value::map([("foo", "x"), ("bar", "baz")]);
        assert_eq!(p.invoke(&v).unwrap(), v);
        assert_eq!(
            p.invoke(&Value::map([("foo", Value::Int(1))])).unwrap_err().to_string(),
            "[foo]: Argument value provided must be of type string, int given"
        );
        let as_parameter = Parameter::from(p.clone());
        assert_eq!(as_parameter.schema(), p.as_array().schema());
        assert!(p.without(&["bar"]).unwrap().parameters().is_required("foo"));
    }

    #[test]
    fn default_is_stored_bound() {
        let p = ArrayParameter::new("")
            .with_required("id", IntParameter::new(""))
            .with_optional("page", IntParameter::new("").with_default(1).unwrap());
        let p = p.with_default(Map::from_iter([(Key::from("id"), Value::Int(9))])).unwrap();
        assert_eq!(
            Value::Array(p.default_value().unwrap().clone()),
            Value::map([("id", 9), ("page", 1)])
        );
    }
}
