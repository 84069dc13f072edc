//! Binding a [`Parameters`] schema against a bag of values.
//!
//! Binding runs in a fixed order:
//!
//! 1. normalize the bag (positional lists are re-keyed, records flattened)
//! 2. reject undeclared keys
//! 3. fill defaults for absent keys
//! 4. require every required key
//! 5. enforce the optional minimum
//! 6. validate each present key, collecting every failure
//!
//! Steps 2, 4 and 5 abort on the first problem. Step 6 reports all failing
//! keys at once, each prefixed with `[key]: `.
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::cast::Cast;
use crate::error::{Error, Violation};
use crate::parameters::Parameters;
use crate::types::Primitive;
use crate::value::{Key, Map, Value, is_list};

static NULL: Value = Value::Null;

/// A successfully bound value bag. Holds exactly the declared keys that were
/// supplied or defaulted.
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments {
    parameters: Parameters,
    values: IndexMap<String, Value>,
    unfilled: Vec<String>,
}

impl Arguments {
    pub fn new(parameters: Parameters, value: &Value) -> Result<Self, Error> {
        let values = normalize(&parameters, value)?;
        let mut arguments = Self { parameters, values, unfilled: Vec::new() };
        arguments.assert_no_overflow()?;
        arguments.fill_defaults();
        arguments.assert_required()?;
        arguments.assert_optional_minimum()?;
        arguments.validate()?;
        Ok(arguments)
    }

    pub fn parameters(&self) -> &Parameters { &self.parameters }

    fn assert_no_overflow(&self) -> Result<(), Error> {
        let overflow: Vec<String> = self.values
            .keys()
            .filter(|k| self.parameters.get(k).is_err())
            .cloned()
            .collect();
        if !overflow.is_empty() {
            debug!(keys = ?overflow, "undeclared arguments");
            return Err(Error::Overflow { keys: overflow });
        }
        Ok(())
    }

    fn fill_defaults(&mut self) {
        for (name, parameter) in self.parameters.iter() {
            if self.values.contains_key(name) {
                continue;
            }
            match parameter.default() {
                Some(default) => {
                    trace!(name, "filled default");
                    self.values.insert(name.to_string(), default);
                }
                None => self.unfilled.push(name.to_string()),
            }
        }
    }

    fn assert_required(&self) -> Result<(), Error> {
        let missing: Vec<String> = self.parameters
            .required_keys()
            .into_iter()
            .filter(|k| !self.values.contains_key(*k))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            debug!(keys = ?missing, "missing required arguments");
            return Err(Error::MissingRequired { keys: missing });
        }
        Ok(())
    }

    fn assert_optional_minimum(&self) -> Result<(), Error> {
        let minimum = self.parameters.optional_minimum();
        let provided = self.parameters
            .optional_keys()
            .into_iter()
            .filter(|k| self.values.contains_key(*k))
            .count();
        if provided < minimum {
            debug!(minimum, provided, "too few optional arguments");
            return Err(Error::InsufficientOptional { minimum, provided });
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), Error> {
        let mut errors = Vec::new();
        let names: Vec<String> = self.parameters.keys().map(String::from).collect();
        for name in names {
            if self.parameters.is_optional(&name) && !self.values.contains_key(&name) {
                continue;
            }
            let value = self.values.get(&name).cloned().unwrap_or_default();
            match self.put(&name, &value) {
                Ok(()) => trace!(name = name.as_str(), "argument ok"),
                Err(error) => {
                    trace!(name = name.as_str(), %error, "argument rejected");
                    errors.push(error);
                }
            }
        }
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Aggregate { errors }),
        }
    }

    // Validates one key and stores the (possibly normalized) result.
    fn put(&mut self, name: &str, value: &Value) -> Result<(), Error> {
        let parameter = self.parameters.get(name)?;
        let bound = parameter.invoke(value).map_err(|e| Error::keyed(name, e))?;
        self.values.insert(name.to_string(), bound);
        self.unfilled.retain(|k| k != name);
        Ok(())
    }

    /// Revalidates a single key; the rest of the bag is left as bound.
    pub fn with_put(&self, name: &str, value: impl Into<Value>) -> Result<Self, Error> {
        let mut new = self.clone();
        new.put(name, &value.into())?;
        Ok(new)
    }

    /// Every name was supplied or defaulted. A supplied `null` counts.
    pub fn has(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.values.contains_key(*n))
    }

    /// The bound value, or `null` for a declared optional key that was not supplied.
    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        self.parameters.assert_has(&[name])?;
        Ok(self.values.get(name).unwrap_or(&NULL))
    }

    pub fn required(&self, name: &str) -> Result<Cast<'_>, Error> {
        self.parameters.required(name)?;
        Ok(Cast::new(self.values.get(name).unwrap_or(&NULL)))
    }

    /// `None` when the optional key was not supplied.
    pub fn optional(&self, name: &str) -> Result<Option<Cast<'_>>, Error> {
        self.parameters.optional(name)?;
        Ok(self.values.get(name).map(Cast::new))
    }

    pub fn to_array(&self) -> Map {
        self.values.iter().map(|(k, v)| (Key::parse(k), v.clone())).collect()
    }

    /// Like [`Arguments::to_array`], with unfilled optional keys set to `fill`
    /// and placed first.
    pub fn to_array_fill(&self, fill: Value) -> Map {
        let mut out: Map = self.unfilled.iter().map(|k| (Key::parse(k), fill.clone())).collect();
        out.extend(self.to_array());
        out
    }

    pub fn into_map(self) -> Map {
        self.values.into_iter().map(|(k, v)| (Key::parse(&k), v)).collect()
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.into_map())
    }
}

fn normalize(parameters: &Parameters, value: &Value) -> Result<IndexMap<String, Value>, Error> {
    let Some(map) = value.to_map() else {
        return Err(Violation::mismatch(Primitive::Array.as_str(), value).into());
    };
    if is_list(&map) && map.len() == parameters.len() {
        return Ok(parameters.keys().map(String::from).zip(map.into_values()).collect());
    }
    Ok(map.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parameter::{IntParameter, StringParameter};
    use serde_json::json;

    fn bind(parameters: &Parameters, value: serde_json::Value) -> Result<Arguments, Error> {
        parameters.bind(&Value::from(value))
    }

    fn xy() -> Parameters {
        Parameters::new()
            .with_required("x", IntParameter::new("").with_min(10).unwrap())
            .with_required("y", IntParameter::new("").with_min(10).unwrap())
    }

    #[test]
    fn positional_lists_are_rekeyed() {
        let args = bind(&xy(), json!([10, 11])).unwrap();
        assert_eq!(args.get("y").unwrap(), &Value::Int(11));
    }

    #[test]
    fn overflow_wins_over_value_errors() {
        let err = bind(&xy(), json!({"x": 1, "y": 1, "z": 99})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaOverflow);
        assert_eq!(err.to_string(), "Invalid argument(s) provided: `z`");
    }

    #[test]
    fn value_errors_are_aggregated() {
        let err = bind(&xy(), json!({"x": 1, "y": 1})).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("[x]:") && text.contains("[y]:"), "{text}");
        assert!(text.contains("; "));
    }

    #[test]
    fn missing_and_optional_minimum_abort() {
        let p = Parameters::new()
            .with_required("id", IntParameter::new(""))
            .with_optional("a", StringParameter::new(""))
            .with_optional("b", StringParameter::new(""))
            .with_optional_minimum(1)
            .unwrap();
        assert_eq!(
            bind(&p, json!({})).unwrap_err().to_string(),
            "Missing required argument(s): `id`"
        );
        assert_eq!(
            bind(&p, json!({"id": 1})).unwrap_err().to_string(),
            "Requires minimum 1 optional argument(s), 0 provided"
        );
        assert!(bind(&p, json!({"id": 1, "b": "x"})).is_ok());
    }

    #[test]
    fn defaults_fill_and_unfilled_keys_are_tracked() {
        let p = Parameters::new()
            .with_required("id", IntParameter::new(""))
            .with_optional("page", IntParameter::new("").with_default(1).unwrap())
            .with_optional("q", StringParameter::new(""));
        let args = bind(&p, json!({"id": 5})).unwrap();
        assert_eq!(args.get("page").unwrap(), &Value::Int(1));
        assert_eq!(args.get("q").unwrap(), &Value::Null);
        assert!(!args.has(&["q"]));
        assert!(args.optional("q").unwrap().is_none());
        let filled = Value::Array(args.to_array_fill(Value::from("")));
        assert_eq!(filled.to_json(), json!({"q": "", "id": 5, "page": 1}));
        assert_eq!(args.get("nope").unwrap_err().kind(), ErrorKind::UnknownKey);
    }

    #[test]
    fn accessors_respect_declared_kind() {
        let p = Parameters::new()
            .with_required("id", IntParameter::new(""))
            .with_optional("q", StringParameter::new(""));
        let args = bind(&p, json!({"id": 5, "q": "x"})).unwrap();
        assert_eq!(args.required("id").unwrap().int().unwrap(), 5);
        assert_eq!(args.optional("q").unwrap().unwrap().string().unwrap(), "x");
        assert_eq!(args.required("q").unwrap_err().to_string(), "Argument `q` is optional");
        assert_eq!(args.optional("id").unwrap_err().to_string(), "Argument `id` is required");
    }

    #[test]
    fn with_put_revalidates_one_key() {
        let args = bind(&xy(), json!({"x": 10, "y": 10})).unwrap();
        let updated = args.with_put("x", 20).unwrap();
        assert_eq!(updated.get("x").unwrap(), &Value::Int(20));
        assert_eq!(args.get("x").unwrap(), &Value::Int(10));
        assert_eq!(
            args.with_put("y", 1).unwrap_err().to_string(),
            "[y]: Argument value provided `1` is less than `10`"
        );
        assert_eq!(args.with_put("w", 1).unwrap_err().kind(), ErrorKind::UnknownKey);
    }

    #[test]
    fn non_arrays_are_rejected() {
        let err = bind(&xy(), json!("x")).unwrap_err();
        assert_eq!(err.to_string(), "Argument value provided must be of type array, string given");
    }
}
