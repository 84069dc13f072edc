use serde_json::json;

use crate::error::{Conflict, Error, UnionFailure};
use crate::parameter::Parameter;
use crate::parameters::Parameters;
use crate::types::{Primitive, Type};
use crate::value::Value;

/// Ordered alternatives; the first one that accepts a value wins.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionParameter {
    parameters: Parameters,
    description: String,
    default: Option<Value>,
}

impl UnionParameter {
    /// Needs at least two alternatives.
    pub fn new(parameters: Parameters) -> Result<Self, Error> {
        if parameters.len() < 2 {
            return Err(Conflict::UnionArity { given: parameters.len() }.into());
        }
        Ok(Self { parameters, description: String::new(), default: None })
    }

    pub(crate) fn from_pair(parameters: Parameters) -> Self {
        debug_assert_eq!(parameters.len(), 2);
        Self { parameters, description: String::new(), default: None }
    }

    /// Alternatives are named by position: `0`, `1`, ...
    pub fn of<I, P>(alternatives: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<Parameter>,
    {
        let parameters = alternatives
            .into_iter()
            .enumerate()
            .fold(Parameters::new(), |acc, (i, p)| acc.with_required(i.to_string(), p));
        Self::new(parameters)
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::Union) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&Value> { self.default.as_ref() }
    pub fn parameters(&self) -> &Parameters { &self.parameters }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: Value) -> Result<Self, Error> {
        let value = self.invoke(&value)?;
        Ok(Self { default: (!value.is_null()).then_some(value), ..self.clone() })
    }

    /// Appends an alternative under the lowest positional name not yet taken.
    pub fn with_added(&self, parameter: impl Into<Parameter>) -> Self {
        let name = (0..)
            .map(|i: usize| i.to_string())
            .find(|name| !self.parameters.has(&[name.as_str()]))
            .unwrap_or_default();
        Self { parameters: self.parameters.with_required(name, parameter), ..self.clone() }
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        let mut failures = Vec::new();
        for (name, parameter) in self.parameters.iter() {
            match parameter.invoke(value) {
                Ok(out) => return Ok(out),
                Err(error) => failures.push(UnionFailure {
                    name: name.to_string(),
                    hint: parameter.ty().hint().to_string(),
                    error,
                }),
            }
        }
        Err(Error::UnionExhausted { failures })
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        self.parameters.assert_compatible(&other.parameters)
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::Union.as_str(),
            "description": self.description,
            "default": self.default.as_ref().map(Value::to_json),
            "parameters": self.parameters.schema(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parameter::{IntParameter, NullParameter, StringParameter};

    fn string_or_int() -> UnionParameter {
        UnionParameter::of([Parameter::from(StringParameter::new("")), IntParameter::new("").into()]).unwrap()
    }

    #[test]
    fn needs_two_alternatives() {
        let err = UnionParameter::of([StringParameter::new("")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuleConflict);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(string_or_int().invoke(&Value::Int(10)).unwrap(), Value::Int(10));
        assert_eq!(string_or_int().invoke(&Value::from("x")).unwrap(), Value::from("x"));
    }

    #[test]
    fn exhausted_union_lists_every_failure_in_order() {
        let err = string_or_int().invoke(&Value::Float(1.5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnionExhausted);
        assert_eq!(
            err.to_string(),
            "Argument provided doesn't match union: \
             Parameter `0` <string>: Argument value provided must be of type string, float given; \
             Parameter `1` <int>: Argument value provided must be of type int, float given"
        );
    }

    #[test]
    fn added_alternatives_extend_the_union() {
        let p = string_or_int().with_added(NullParameter::new(""));
        assert_eq!(p.parameters().len(), 3);
        assert!(p.invoke(&Value::Null).is_ok());
        assert!(string_or_int().assert_compatible(&p).is_err());
    }

    #[test]
    fn added_alternatives_never_replace_existing_ones() {
        let gapped = Parameters::new()
            .with_required("0", StringParameter::new(""))
            .with_required("2", IntParameter::new(""));
        let p = UnionParameter::new(gapped).unwrap().with_added(NullParameter::new(""));
        assert_eq!(p.parameters().keys().collect::<Vec<_>>(), vec!["0", "2", "1"]);
        assert!(p.invoke(&Value::Int(4)).is_ok());
        assert!(p.invoke(&Value::Null).is_ok());
    }
}
