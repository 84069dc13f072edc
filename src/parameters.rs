//! Ordered, named parameter collections with a required/optional split.
use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use crate::arguments::Arguments;
use crate::error::{Conflict, Error, Incompatible};
use crate::parameter::Parameter;
use crate::value::Value;

/// Every key is either required or optional, never both, and
/// `optional_minimum` never exceeds the optional count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: IndexMap<String, Parameter>,
    required: IndexSet<String>,
    optional: IndexSet<String>,
    optional_minimum: usize,
}

impl Parameters {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn optional_minimum(&self) -> usize { self.optional_minimum }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Required keys in declaration order.
    pub fn required_keys(&self) -> Vec<&str> {
        self.keys().filter(|k| self.required.contains(*k)).collect()
    }

    /// Optional keys in declaration order.
    pub fn optional_keys(&self) -> Vec<&str> {
        self.keys().filter(|k| self.optional.contains(*k)).collect()
    }

    pub fn is_required(&self, name: &str) -> bool { self.required.contains(name) }
    pub fn is_optional(&self, name: &str) -> bool { self.optional.contains(name) }

    pub fn has(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.entries.contains_key(*n))
    }

    pub fn assert_has(&self, names: &[&str]) -> Result<(), Error> {
        match names.iter().find(|n| !self.entries.contains_key(**n)) {
            Some(missing) => Err(Error::unknown(*missing)),
            None => Ok(()),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Parameter, Error> {
        self.entries.get(name).ok_or_else(|| Error::unknown(name))
    }

    /// The parameter for `name`, which must be declared required.
    pub fn required(&self, name: &str) -> Result<&Parameter, Error> {
        let parameter = self.get(name)?;
        if self.is_optional(name) {
            return Err(Error::Access { key: name.to_string(), declared: "optional" });
        }
        Ok(parameter)
    }

    /// The parameter for `name`, which must be declared optional.
    pub fn optional(&self, name: &str) -> Result<&Parameter, Error> {
        let parameter = self.get(name)?;
        if self.is_required(name) {
            return Err(Error::Access { key: name.to_string(), declared: "required" });
        }
        Ok(parameter)
    }

    /// Adds or replaces `name` as required. A replaced entry moves to the end.
    pub fn with_required(&self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
        self.with_entry(name.into(), parameter.into(), true)
    }

    /// Adds or replaces `name` as optional. A replaced entry moves to the end.
    pub fn with_optional(&self, name: impl Into<String>, parameter: impl Into<Parameter>) -> Self {
        self.with_entry(name.into(), parameter.into(), false)
    }

    fn with_entry(&self, name: String, parameter: Parameter, required: bool) -> Self {
        let mut new = self.clone();
        new.entries.shift_remove(&name);
        new.required.shift_remove(&name);
        new.optional.shift_remove(&name);
        new.entries.insert(name.clone(), parameter);
        if required {
            new.required.insert(name);
        } else {
            new.optional.insert(name);
        }
        new.clamp_optional_minimum();
        new
    }

    /// Swaps the parameter of an existing key in place.
    pub fn with_modify(&self, name: &str, parameter: impl Into<Parameter>) -> Result<Self, Error> {
        let mut new = self.clone();
        let slot = new.entries.get_mut(name).ok_or_else(|| Error::unknown(name))?;
        *slot = parameter.into();
        Ok(new)
    }

    /// Only `names`, in that order, all required.
    pub fn take(&self, names: &[&str]) -> Result<Self, Error> {
        names.iter().try_fold(Self::new(), |acc, name| {
            Ok(acc.with_required(*name, self.get(name)?.clone()))
        })
    }

    pub fn without(&self, names: &[&str]) -> Result<Self, Error> {
        self.assert_has(names)?;
        let mut new = self.clone();
        for name in names {
            new.entries.shift_remove(*name);
            new.required.shift_remove(*name);
            new.optional.shift_remove(*name);
        }
        new.clamp_optional_minimum();
        Ok(new)
    }

    /// Moves `names` (every key when empty) to the optional set.
    pub fn with_make_optional(&self, names: &[&str]) -> Result<Self, Error> {
        self.with_moved(names, false)
    }

    /// Moves `names` (every key when empty) to the required set.
    pub fn with_make_required(&self, names: &[&str]) -> Result<Self, Error> {
        self.with_moved(names, true)
    }

    fn with_moved(&self, names: &[&str], required: bool) -> Result<Self, Error> {
        self.assert_has(names)?;
        let names: Vec<String> = if names.is_empty() {
            self.entries.keys().cloned().collect()
        } else {
            names.iter().map(|n| n.to_string()).collect()
        };
        let mut new = self.clone();
        let (from, to) = if required {
            (&mut new.optional, &mut new.required)
        } else {
            (&mut new.required, &mut new.optional)
        };
        for name in names {
            from.shift_remove(&name);
            to.insert(name);
        }
        new.clamp_optional_minimum();
        Ok(new)
    }

    pub fn with_optional_minimum(&self, minimum: usize) -> Result<Self, Error> {
        if minimum > self.optional.len() {
            return Err(Conflict::OptionalMinimum { minimum, optional: self.optional.len() }.into());
        }
        Ok(Self { optional_minimum: minimum, ..self.clone() })
    }

    fn clamp_optional_minimum(&mut self) {
        self.optional_minimum = self.optional_minimum.min(self.optional.len());
    }

    pub fn bind(&self, value: &Value) -> Result<Arguments, Error> {
        Arguments::new(self.clone(), value)
    }

    /// Same keys, same required/optional split, pairwise compatible parameters.
    pub fn assert_compatible(&self, other: &Parameters) -> Result<(), Error> {
        let mine: Vec<String> = self.entries.keys().cloned().collect();
        let theirs: Vec<String> = other.entries.keys().cloned().collect();
        let same_keys = mine.len() == theirs.len() && mine.iter().all(|k| other.entries.contains_key(k));
        if !same_keys {
            return Err(Incompatible::Keys { expected: mine, provided: theirs }.into());
        }
        for (name, parameter) in &self.entries {
            if self.is_required(name) != other.is_required(name) {
                let expected = if self.is_required(name) { "required" } else { "optional" };
                return Err(Incompatible::Requirement { key: name.clone(), expected }.into());
            }
            let counterpart = other.get(name)?;
            parameter
                .assert_compatible(counterpart)
                .map_err(|e| Error::keyed(name.as_str(), e))?;
        }
        Ok(())
    }

    pub fn schema(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for (name, parameter) in &self.entries {
            let mut entry = serde_json::Map::new();
            entry.insert("required".into(), json!(self.is_required(name)));
            if let serde_json::Value::Object(fields) = parameter.schema() {
                entry.extend(fields);
            }
            out.insert(name.clone(), serde_json::Value::Object(entry));
        }
        serde_json::Value::Object(out)
    }
}
