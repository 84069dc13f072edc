use serde_json::json;

use crate::error::{Conflict, Error, Incompatible, Violation};
use crate::types::{Primitive, Type};
use crate::value::Value;

/// String shape rules: affixes, required/rejected substrings, and a length
/// family where an exact `length` excludes `min_length`/`max_length`.
///
/// Lengths count `char`s, not bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringParameter {
    description: String,
    default: Option<String>,
    starts_with: Option<String>,
    ends_with: Option<String>,
    contains: Vec<String>,
    reject: Vec<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    length: Option<usize>,
}

fn strlen(s: &str) -> usize { s.chars().count() }

impl StringParameter {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    pub fn ty(&self) -> Type { Type::new(Primitive::String) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<&str> { self.default.as_deref() }
    pub fn starts_with(&self) -> Option<&str> { self.starts_with.as_deref() }
    pub fn ends_with(&self) -> Option<&str> { self.ends_with.as_deref() }
    pub fn contains(&self) -> &[String] { &self.contains }
    pub fn reject(&self) -> &[String] { &self.reject }
    pub fn min_length(&self) -> Option<usize> { self.min_length }
    pub fn max_length(&self) -> Option<usize> { self.max_length }
    pub fn length(&self) -> Option<usize> { self.length }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        self.check(&value)?;
        Ok(Self { default: Some(value), ..self.clone() })
    }

    pub fn with_starts_with(&self, prefix: impl Into<String>) -> Result<Self, Error> {
        let prefix = prefix.into();
        self.assert_fits_limits(&prefix)?;
        Self { starts_with: Some(prefix), ..self.clone() }.keeping_default("startsWith")
    }

    pub fn with_ends_with(&self, suffix: impl Into<String>) -> Result<Self, Error> {
        let suffix = suffix.into();
        self.assert_fits_limits(&suffix)?;
        Self { ends_with: Some(suffix), ..self.clone() }.keeping_default("endsWith")
    }

    /// Replaces the list of substrings that must all be present.
    pub fn with_contains<I, S>(&self, needles: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let contains: Vec<String> = needles.into_iter().map(Into::into).collect();
        for s in &contains {
            self.assert_fits_limits(s)?;
        }
        Self { contains, ..self.clone() }.keeping_default("contains")
    }

    /// Replaces the list of substrings that must all be absent.
    pub fn with_reject<I, S>(&self, needles: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reject: Vec<String> = needles.into_iter().map(Into::into).collect();
        for s in &reject {
            self.assert_fits_limits(s)?;
        }
        Self { reject, ..self.clone() }.keeping_default("reject")
    }

    pub fn with_min_length(&self, n: usize) -> Result<Self, Error> {
        if self.length.is_some() {
            return Err(Conflict::RuleSet { rule: "minLength", existing: "length" }.into());
        }
        if let Some(max) = self.max_length {
            if n > max {
                return Err(Conflict::RuleLength { rule: "maxLength", length: max }.into());
            }
        }
        Self { min_length: Some(n), ..self.clone() }.keeping_default("minLength")
    }

    pub fn with_max_length(&self, n: usize) -> Result<Self, Error> {
        if self.length.is_some() {
            return Err(Conflict::RuleSet { rule: "maxLength", existing: "length" }.into());
        }
        if let Some(min) = self.min_length {
            if n < min {
                return Err(Conflict::RuleLength { rule: "minLength", length: min }.into());
            }
        }
        self.assert_rules_fit(n)?;
        Self { max_length: Some(n), ..self.clone() }.keeping_default("maxLength")
    }

    pub fn with_length(&self, n: usize) -> Result<Self, Error> {
        if self.min_length.is_some() || self.max_length.is_some() {
            return Err(Conflict::RuleSet { rule: "length", existing: "minLength|maxLength" }.into());
        }
        self.assert_rules_fit(n)?;
        Self { length: Some(n), ..self.clone() }.keeping_default("length")
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        let ty = self.ty();
        ty.assert(value)?;
        let Value::String(s) = value else {
            return Err(ty.mismatch(value).into());
        };
        self.check(s)?;
        Ok(value.clone())
    }

    /// startsWith → endsWith → minLength → maxLength → length → contains → reject
    pub fn check(&self, s: &str) -> Result<(), Violation> {
        if let Some(prefix) = &self.starts_with {
            if !s.starts_with(prefix.as_str()) {
                return Err(Violation::StartsWith { value: s.to_string(), prefix: prefix.clone() });
            }
        }
        if let Some(suffix) = &self.ends_with {
            if !s.ends_with(suffix.as_str()) {
                return Err(Violation::EndsWith { value: s.to_string(), suffix: suffix.clone() });
            }
        }
        let length = strlen(s);
        if let Some(min) = self.min_length {
            if length < min {
                return Err(Violation::TooShort { value: s.to_string(), length, min });
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(Violation::TooLong { value: s.to_string(), length, max });
            }
        }
        if let Some(expected) = self.length {
            if length != expected {
                return Err(Violation::LengthMismatch { value: s.to_string(), length, expected });
            }
        }
        if let Some(needle) = self.contains.iter().find(|n| !s.contains(n.as_str())) {
            return Err(Violation::MissingSubstring { value: s.to_string(), needle: needle.clone() });
        }
        if let Some(needle) = self.reject.iter().find(|n| s.contains(n.as_str())) {
            return Err(Violation::RejectedSubstring { value: s.to_string(), needle: needle.clone() });
        }
        Ok(())
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        let rules: [(&'static str, String, String); 7] = [
            ("startsWith", render_opt(&self.starts_with), render_opt(&other.starts_with)),
            ("endsWith", render_opt(&self.ends_with), render_opt(&other.ends_with)),
            ("contains", render_list(&self.contains), render_list(&other.contains)),
            ("reject", render_list(&self.reject), render_list(&other.reject)),
            ("minLength", render_len(self.min_length), render_len(other.min_length)),
            ("maxLength", render_len(self.max_length), render_len(other.max_length)),
            ("length", render_len(self.length), render_len(other.length)),
        ];
        for (topic, expected, provided) in rules {
            if expected != provided {
                return Err(Incompatible::Rule { topic, expected, provided }.into());
            }
        }
        Ok(())
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": Primitive::String.as_str(),
            "description": self.description,
            "default": self.default,
            "startsWith": self.starts_with,
            "endsWith": self.ends_with,
            "contains": self.contains,
            "reject": self.reject,
            "minLength": self.min_length,
            "maxLength": self.max_length,
            "length": self.length,
        })
    }

    fn keeping_default(self, rule: &'static str) -> Result<Self, Error> {
        if let Some(default) = &self.default {
            self.check(default).map_err(|violation| Conflict::DefaultBroken { rule, violation })?;
        }
        Ok(self)
    }

    // A new affix or substring rule must fit inside `length`/`maxLength`.
    fn assert_fits_limits(&self, rule: &str) -> Result<(), Error> {
        let n = strlen(rule);
        for (name, limit) in [("length", self.length), ("maxLength", self.max_length)] {
            if let Some(limit) = limit {
                if n > limit {
                    return Err(Conflict::RuleLength { rule: name, length: limit }.into());
                }
            }
        }
        Ok(())
    }

    // A new `length`/`maxLength` must fit every existing affix or substring rule.
    fn assert_rules_fit(&self, limit: usize) -> Result<(), Error> {
        let singles = [("startsWith", &self.starts_with), ("endsWith", &self.ends_with)];
        for (name, rule) in singles {
            if let Some(rule) = rule {
                let len = strlen(rule);
                if limit < len {
                    return Err(Conflict::RuleLength { rule: name, length: len }.into());
                }
            }
        }
        for (name, rules) in [("contains", &self.contains), ("reject", &self.reject)] {
            for rule in rules {
                let len = strlen(rule);
                if limit < len {
                    return Err(Conflict::RuleLength { rule: name, length: len }.into());
                }
            }
        }
        Ok(())
    }
}

fn render_opt(x: &Option<String>) -> String {
    x.clone().unwrap_or_else(|| "null".to_string())
}

fn render_list(xs: &[String]) -> String {
    format!("[{}]", xs.join(", "))
}

fn render_len(x: Option<usize>) -> String {
    x.map_or_else(|| "null".to_string(), |n| n.to_string())
}

// ------------------------------ Options ----------------------------------- //

/// Constructor options, applied in order: startsWith, endsWith, contains,
/// reject, length, minLength, maxLength, default.
#[derive(Clone, Debug, Default)]
pub struct StringRules {
    pub description: String,
    pub default: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub contains: Vec<String>,
    pub reject: Vec<String>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl StringRules {
    pub fn build(self) -> Result<StringParameter, Error> {
        let mut p = StringParameter::new(self.description);
        if let Some(s) = self.starts_with { p = p.with_starts_with(s)?; }
        if let Some(s) = self.ends_with { p = p.with_ends_with(s)?; }
        if !self.contains.is_empty() { p = p.with_contains(self.contains)?; }
        if !self.reject.is_empty() { p = p.with_reject(self.reject)?; }
        if let Some(n) = self.length { p = p.with_length(n)?; }
        if let Some(n) = self.min_length { p = p.with_min_length(n)?; }
        if let Some(n) = self.max_length { p = p.with_max_length(n)?; }
        if let Some(d) = self.default { p = p.with_default(d)?; }
        Ok(p)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn s(x: &str) -> Value { Value::from(x) }

    #[test]
    fn min_length_counts_chars() {
        let p = StringParameter::new("").with_min_length(2).unwrap();
        let err = p.invoke(&s("a")).unwrap_err();
        assert_eq!(err.to_string(), "Argument `a` length (1) is less than 2");
        assert_eq!(p.invoke(&s("ab")).unwrap(), s("ab"));
        // two chars, four bytes
        assert!(p.invoke(&s("ñö")).is_ok());
        let p = StringParameter::new("").with_max_length(2).unwrap();
        assert!(p.invoke(&s("ñö")).is_ok());
    }

    #[test]
    fn rules_run_in_fixed_order() {
        let p = StringParameter::new("")
            .with_starts_with("ab").unwrap()
            .with_ends_with("yz").unwrap()
            .with_min_length(6).unwrap()
            .with_contains(["mm"]).unwrap()
            .with_reject(["q"]).unwrap();
        // fails the prefix before the length
        assert!(matches!(
            p.invoke(&s("x")).unwrap_err(),
            Error::Violation(Violation::StartsWith { .. })
        ));
        assert!(matches!(
            p.invoke(&s("abyz")).unwrap_err(),
            Error::Violation(Violation::TooShort { .. })
        ));
        assert_eq!(
            p.invoke(&s("ab-cd-yz")).unwrap_err().to_string(),
            "Argument `ab-cd-yz` doesn't contain `mm`"
        );
        assert_eq!(
            p.invoke(&s("abmmqyz")).unwrap_err().to_string(),
            "Argument `abmmqyz` contains rejected value `q`"
        );
        assert!(p.invoke(&s("abmm-yz")).is_ok());
    }

    #[test]
    fn substring_lists_fail_on_the_first_entry() {
        let p = StringParameter::new("").with_contains(["a", "b"]).unwrap();
        assert_eq!(p.invoke(&s("xyz")).unwrap_err().to_string(), "Argument `xyz` doesn't contain `a`");
        assert_eq!(p.invoke(&s("xaz")).unwrap_err().to_string(), "Argument `xaz` doesn't contain `b`");
        let p = StringParameter::new("").with_reject(["a", "b"]).unwrap();
        assert_eq!(p.invoke(&s("bba")).unwrap_err().to_string(), "Argument `bba` contains rejected value `a`");
        assert_eq!(p.invoke(&s("xbx")).unwrap_err().to_string(), "Argument `xbx` contains rejected value `b`");
        assert!(p.invoke(&s("xyz")).is_ok());
    }

    #[test]
    fn exact_length_excludes_min_max() {
        let p = StringParameter::new("").with_length(3).unwrap();
        assert_eq!(p.with_min_length(1).unwrap_err().kind(), ErrorKind::RuleConflict);
        assert!(p.with_max_length(5).is_err());
        let p = StringParameter::new("").with_max_length(5).unwrap();
        assert_eq!(
            p.with_length(5).unwrap_err().to_string(),
            "Unable to set `length` rule when `minLength|maxLength` rule is already set"
        );
        let err = StringParameter::new("").with_length(3).unwrap().invoke(&s("ab")).unwrap_err();
        assert_eq!(err.to_string(), "Argument `ab` length (2) is different from 3");
    }

    #[test]
    fn length_rules_check_both_directions() {
        // new rule against existing limit
        let p = StringParameter::new("").with_max_length(3).unwrap();
        assert_eq!(
            p.with_starts_with("abcd").unwrap_err().to_string(),
            "Argument value provided conflicts with `maxLength` rule length `3`"
        );
        assert!(p.with_contains(["abc"]).is_ok());
        assert!(p.with_reject(["abcd"]).is_err());
        // new limit against existing rules
        let p = StringParameter::new("").with_ends_with("abcd").unwrap();
        assert!(p.with_max_length(3).is_err());
        assert!(p.with_length(3).is_err());
        assert!(p.with_length(4).is_ok());
        // min/max against each other
        let p = StringParameter::new("").with_min_length(4).unwrap();
        assert!(p.with_max_length(3).is_err());
        let p = StringParameter::new("").with_max_length(4).unwrap();
        assert!(p.with_min_length(5).is_err());
    }

    #[test]
    fn default_must_satisfy_rules() {
        let p = StringParameter::new("").with_starts_with("id-").unwrap();
        assert!(p.with_default("x").is_err());
        assert_eq!(p.with_default("id-1").unwrap().default_value(), Some("id-1"));
    }

    #[test]
    fn later_rules_must_keep_the_default() {
        let p = StringParameter::new("").with_default("abcd").unwrap();
        let err = p.with_max_length(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuleConflict);
        assert_eq!(
            err.to_string(),
            "Cannot set `maxLength` rule, the default value breaks it: Argument `abcd` length (4) is greater than 2"
        );
        assert!(p.with_min_length(5).is_err());
        assert!(p.with_length(3).is_err());
        assert!(p.with_starts_with("x").is_err());
        assert!(p.with_ends_with("cd").is_ok());
        assert!(p.with_contains(["bc", "z"]).is_err());
        assert!(p.with_reject(["d"]).is_err());
        assert!(p.with_reject(["e"]).is_ok());
    }

    #[test]
    fn non_strings_are_type_errors() {
        let err = StringParameter::new("").invoke(&Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Argument value provided must be of type string, int given");
    }

    #[test]
    fn compatibility_compares_rules_not_descriptions() {
        let a = StringParameter::new("a").with_min_length(1).unwrap();
        let b = StringParameter::new("b").with_min_length(1).unwrap();
        assert!(a.assert_compatible(&b).is_ok());
        let c = StringParameter::new("").with_min_length(2).unwrap();
        assert_eq!(
            a.assert_compatible(&c).unwrap_err().to_string(),
            "Expected minLength `1`, provided `2`"
        );
    }

    #[test]
    fn rules_struct_builds_through_validated_setters() {
        let p = StringRules {
            starts_with: Some("a".into()),
            max_length: Some(4),
            default: Some("abc".into()),
            ..StringRules::default()
        }
        .build()
        .unwrap();
        assert_eq!(p.max_length(), Some(4));
        assert!(StringRules { length: Some(1), min_length: Some(1), ..StringRules::default() }.build().is_err());
    }
}
