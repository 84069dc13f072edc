//! Explicit function signatures: named inputs plus a return parameter.
use tracing::debug;

use crate::arguments::Arguments;
use crate::error::{Error, Stage};
use crate::parameter::{MixedParameter, Parameter};
use crate::parameters::Parameters;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    name: String,
    parameters: Parameters,
    returns: Parameter,
}

impl Signature {
    /// A signature with no inputs that may return anything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
            returns: MixedParameter::new("").into(),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn parameters(&self) -> &Parameters { &self.parameters }
    pub fn returns(&self) -> &Parameter { &self.returns }

    pub fn with_returns(&self, parameter: impl Into<Parameter>) -> Self {
        Self { returns: parameter.into(), ..self.clone() }
    }

    /// Adds a required input.
    pub fn with_input(&self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
        Self { parameters: self.parameters.with_required(name, parameter), ..self.clone() }
    }

    /// Adds an optional input. A non-null `default` replaces any default the
    /// parameter already carries and is validated against its rules.
    pub fn with_input_default(
        &self,
        name: impl Into<String>,
        parameter: impl Into<Parameter>,
        default: Value,
    ) -> Result<Self, Error> {
        let name = name.into();
        let mut parameter = parameter.into();
        if !default.is_null() {
            parameter = parameter.with_default(default).map_err(|source| Error::Default {
                key: name.clone(),
                function: self.name.clone(),
                source: Box::new(source),
            })?;
        }
        Ok(Self { parameters: self.parameters.with_optional(name, parameter), ..self.clone() })
    }

    pub fn assert_arguments(&self, value: &Value) -> Result<Arguments, Error> {
        self.parameters.bind(value).map_err(|e| self.wrap(Stage::Arguments, e))
    }

    pub fn assert_return(&self, value: &Value) -> Result<Value, Error> {
        self.returns.invoke(value).map_err(|e| self.wrap(Stage::Return, e))
    }

    /// Validates the arguments, runs `body`, then validates what it returned.
    pub fn call<F>(&self, value: &Value, body: F) -> Result<Value, Error>
    where
        F: FnOnce(&Arguments) -> Value,
    {
        let arguments = self.assert_arguments(value)?;
        debug!(function = self.name.as_str(), "arguments bound");
        let result = body(&arguments);
        self.assert_return(&result)
    }

    fn wrap(&self, stage: Stage, source: Error) -> Error {
        Error::Call { function: self.name.clone(), stage, source: Box::new(source) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parameter::{IntParameter, StringParameter};

    fn add() -> Signature {
        Signature::new("add")
            .with_input("a", IntParameter::new(""))
            .with_input_default("b", IntParameter::new("").with_max(100).unwrap(), Value::Int(1))
            .unwrap()
            .with_returns(IntParameter::new("").with_min(0).unwrap())
    }

    fn sum(args: &Arguments) -> Value {
        let a = args.required("a").and_then(|c| c.int()).unwrap_or_default();
        let b = args.optional("b").ok().flatten().and_then(|c| c.int().ok()).unwrap_or_default();
        Value::Int(a + b)
    }

    #[test]
    fn call_validates_both_ends() {
        let out = add().call(&Value::map([("a", 2)]), sum).unwrap();
        assert_eq!(out, Value::Int(3));
        let err = add().call(&Value::map([("a", -5)]), sum).unwrap_err();
        assert_eq!(err.to_string(), "`add` return → Argument value provided `-4` is less than `0`");
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn argument_failures_name_the_function() {
        let err = add().assert_arguments(&Value::map([("b", 2)])).unwrap_err();
        assert_eq!(err.to_string(), "`add` arguments → Missing required argument(s): `a`");
    }

    #[test]
    fn bad_defaults_are_reported_with_context() {
        let err = Signature::new("greet")
            .with_input_default("name", StringParameter::new("").with_min_length(3).unwrap(), Value::from("x"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to use default value for parameter `name` in `greet`: Argument `x` length (1) is less than 3"
        );
    }

    #[test]
    fn declared_defaults_override_parameter_defaults() {
        let s = Signature::new("page")
            .with_input_default("b", IntParameter::new("").with_default(5).unwrap(), Value::Int(1))
            .unwrap();
        let args = s.assert_arguments(&Value::map(Vec::<(&str, Value)>::new())).unwrap();
        assert_eq!(args.get("b").unwrap(), &Value::Int(1));
        let err = Signature::new("page")
            .with_input_default(
                "b",
                IntParameter::new("").with_default(5).unwrap().with_max(10).unwrap(),
                Value::Int(99),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to use default value for parameter `b` in `page`: Argument value provided `99` is greater than `10`"
        );
    }

    #[test]
    fn null_default_only_marks_optional() {
        let s = Signature::new("f").with_input_default("x", IntParameter::new(""), Value::Null).unwrap();
        assert!(s.parameters().is_optional("x"));
        assert_eq!(s.parameters().get("x").unwrap().default(), None);
    }
}
