//! Structured errors. Nothing in the engine builds message strings; text only
//! exists in the `Display` impls below.
use std::fmt;
use thiserror::Error;

// ------------------------------ Literals ---------------------------------- //

/// A numeric value as it appears in a rule or a violation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x}"),
        }
    }
}

/// `[1,2,3]`
fn compact(xs: &[Literal]) -> String {
    let parts: Vec<String> = xs.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}

/// `[1, 2, 3]`
fn spaced(xs: &[Literal]) -> String {
    let parts: Vec<String> = xs.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn or_null(x: &Option<Literal>) -> String {
    x.map_or_else(|| "null".to_string(), |l| l.to_string())
}

fn joined<T: fmt::Display>(xs: &[T]) -> String {
    let parts: Vec<String> = xs.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

// ----------------------------- Violations --------------------------------- //

/// A value broke a single parameter rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("Argument value provided must be of type {expected}, {given} given")]
    TypeMismatch { expected: String, given: String },

    #[error("Argument value provided is not of type null")]
    NotNull,

    #[error("Argument value provided must be an instance of `{class}`, {given} given")]
    NotInstance { class: String, given: String },

    #[error("Argument value provided `{value}` is not an accepted value in `{list}`", list = compact(.accept))]
    NotAccepted { value: Literal, accept: Vec<Literal> },

    #[error("Argument value provided `{value}` is on rejected list `{list}`", list = compact(.reject))]
    Rejected { value: Literal, reject: Vec<Literal> },

    #[error("Argument value provided `{value}` is less than `{min}`")]
    LessThan { value: Literal, min: Literal },

    #[error("Argument value provided `{value}` is greater than `{max}`")]
    GreaterThan { value: Literal, max: Literal },

    #[error("Argument `{value}` doesn't start with `{prefix}`")]
    StartsWith { value: String, prefix: String },

    #[error("Argument `{value}` doesn't end with `{suffix}`")]
    EndsWith { value: String, suffix: String },

    #[error("Argument `{value}` length ({length}) is less than {min}")]
    TooShort { value: String, length: usize, min: usize },

    #[error("Argument `{value}` length ({length}) is greater than {max}")]
    TooLong { value: String, length: usize, max: usize },

    #[error("Argument `{value}` length ({length}) is different from {expected}")]
    LengthMismatch { value: String, length: usize, expected: usize },

    #[error("Argument `{value}` doesn't contain `{needle}`")]
    MissingSubstring { value: String, needle: String },

    #[error("Argument `{value}` contains rejected value `{needle}`")]
    RejectedSubstring { value: String, needle: String },

    #[error("Argument value provided is empty")]
    Empty,
}

impl Violation {
    pub fn mismatch(expected: impl Into<String>, given: &crate::value::Value) -> Self {
        Violation::TypeMismatch { expected: expected.into(), given: given.type_name().to_string() }
    }
}

// ------------------------------ Conflicts --------------------------------- //

/// Mutually exclusive or inconsistent rules, raised while building a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Conflict {
    #[error("Cannot set {rule} value when {list} range is set")]
    RangeWithList { rule: &'static str, list: &'static str },

    #[error("Cannot set {rule} value `{value}` {relation} {other} value `{bound}`")]
    RangeOrder {
        rule: &'static str,
        value: Literal,
        relation: &'static str,
        other: &'static str,
        bound: Literal,
    },

    #[error("Accept list `{a}` intersects with reject list `{r}`", a = spaced(.accept), r = spaced(.reject))]
    AcceptReject { accept: Vec<Literal>, reject: Vec<Literal> },

    #[error("Unable to set `{rule}` rule when `{existing}` rule is already set")]
    RuleSet { rule: &'static str, existing: &'static str },

    #[error("Argument value provided conflicts with `{rule}` rule length `{length}`")]
    RuleLength { rule: &'static str, length: usize },

    #[error("Must pass at least two parameters for union, {given} given")]
    UnionArity { given: usize },

    #[error("Invalid class or interface name `{name}`")]
    InvalidClassName { name: String },

    #[error("Cannot require minimum {minimum} optional argument(s) when {optional} optional declared")]
    OptionalMinimum { minimum: usize, optional: usize },

    #[error("Cannot set `{rule}` rule, the default value breaks it: {violation}")]
    DefaultBroken { rule: &'static str, violation: Violation },

    #[error("Default value for `{primitive}` parameters can't be declared in a schema document")]
    UndeclarableDefault { primitive: &'static str },
}

// ---------------------------- Compatibility -------------------------------- //

/// One schema is not a safe substitute for another.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Incompatible {
    #[error("Expected {topic} values in `{e}`, provided `{p}`", e = spaced(.expected), p = spaced(.provided))]
    List { topic: &'static str, expected: Vec<Literal>, provided: Vec<Literal> },

    #[error("Expected {topic} value `{e}`, provided `{p}`", e = or_null(.expected), p = or_null(.provided))]
    Limit { topic: &'static str, expected: Option<Literal>, provided: Option<Literal> },

    #[error("Expected {topic} `{expected}`, provided `{provided}`")]
    Rule { topic: &'static str, expected: String, provided: String },

    #[error("Expected parameter of type `{expected}`, provided `{provided}`")]
    Type { expected: String, provided: String },

    #[error("Expected keys `{e}`, provided `{p}`", e = .expected.join(", "), p = .provided.join(", "))]
    Keys { expected: Vec<String>, provided: Vec<String> },

    #[error("Expected `{key}` to be {expected}")]
    Requirement { key: String, expected: &'static str },
}

// -------------------------------- Error ----------------------------------- //

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Arguments,
    Return,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Arguments => f.write_str("arguments"),
            Stage::Return => f.write_str("return"),
        }
    }
}

/// One failed alternative of a union.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionFailure {
    pub name: String,
    pub hint: String,
    pub error: Error,
}

impl fmt::Display for UnionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter `{}` <{}>: {}", self.name, self.hint, self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Invalid argument(s) provided: `{list}`", list = .keys.join(", "))]
    Overflow { keys: Vec<String> },

    #[error("Missing required argument(s): `{list}`", list = .keys.join(", "))]
    MissingRequired { keys: Vec<String> },

    #[error("Requires minimum {minimum} optional argument(s), {provided} provided")]
    InsufficientOptional { minimum: usize, provided: usize },

    #[error(transparent)]
    Violation(#[from] Violation),

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error(transparent)]
    Incompatible(#[from] Incompatible),

    #[error("Parameter `{key}` not found")]
    UnknownKey { key: String },

    #[error("Argument `{key}` is {declared}")]
    Access { key: String, declared: &'static str },

    #[error("Argument provided doesn't match union: {list}", list = joined(.failures))]
    UnionExhausted { failures: Vec<UnionFailure> },

    #[error("[{key}]: {source}")]
    Keyed { key: String, source: Box<Error> },

    #[error("{list}", list = joined(.errors))]
    Aggregate { errors: Vec<Error> },

    #[error("Unable to use default value for parameter `{key}` in `{function}`: {source}")]
    Default { key: String, function: String, source: Box<Error> },

    #[error("`{function}` {stage} → {source}")]
    Call { function: String, stage: Stage, source: Box<Error> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaOverflow,
    MissingRequired,
    InsufficientOptional,
    ConstraintViolation,
    RuleConflict,
    UnknownKey,
    InvalidAccess,
    UnionExhausted,
    Incompatible,
}

impl Error {
    pub fn keyed(key: impl Into<String>, source: Error) -> Self {
        Error::Keyed { key: key.into(), source: Box::new(source) }
    }

    pub fn unknown(key: impl Into<String>) -> Self {
        Error::UnknownKey { key: key.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Overflow { .. } => ErrorKind::SchemaOverflow,
            Error::MissingRequired { .. } => ErrorKind::MissingRequired,
            Error::InsufficientOptional { .. } => ErrorKind::InsufficientOptional,
            Error::Violation(_) | Error::Aggregate { .. } => ErrorKind::ConstraintViolation,
            Error::Conflict(_) => ErrorKind::RuleConflict,
            Error::Incompatible(_) => ErrorKind::Incompatible,
            Error::UnknownKey { .. } => ErrorKind::UnknownKey,
            Error::Access { .. } => ErrorKind::InvalidAccess,
            Error::UnionExhausted { .. } => ErrorKind::UnionExhausted,
            Error::Keyed { source, .. }
            | Error::Default { source, .. }
            | Error::Call { source, .. } => source.kind(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_lists_render_like_the_rule_lists() {
        let v = Violation::NotAccepted {
            value: Literal::Float(4.4),
            accept: vec![Literal::Float(1.1), Literal::Float(2.2), Literal::Float(3.3)],
        };
        assert_eq!(v.to_string(), "Argument value provided `4.4` is not an accepted value in `[1.1,2.2,3.3]`");
        let c = Conflict::AcceptReject {
            accept: vec![Literal::Int(1), Literal::Int(2)],
            reject: vec![Literal::Int(2)],
        };
        assert_eq!(c.to_string(), "Accept list `[1, 2]` intersects with reject list `[2]`");
    }

    #[test]
    fn keyed_errors_nest_paths_and_keep_kind() {
        let inner = Error::keyed("inner", Violation::LessThan { value: Literal::Int(0), min: Literal::Int(1) }.into());
        let outer = Error::keyed("outer", inner);
        assert_eq!(outer.to_string(), "[outer]: [inner]: Argument value provided `0` is less than `1`");
        assert_eq!(outer.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn aggregate_joins_with_semicolons() {
        let e = Error::Aggregate {
            errors: vec![
                Error::keyed("x", Violation::Empty.into()),
                Error::keyed("y", Violation::NotNull.into()),
            ],
        };
        assert_eq!(
            e.to_string(),
            "[x]: Argument value provided is empty; [y]: Argument value provided is not of type null"
        );
    }

    #[test]
    fn broken_defaults_name_the_rule() {
        let c = Conflict::DefaultBroken {
            rule: "min",
            violation: Violation::LessThan { value: Literal::Int(0), min: Literal::Int(1) },
        };
        assert_eq!(
            c.to_string(),
            "Cannot set `min` rule, the default value breaks it: Argument value provided `0` is less than `1`"
        );
        assert_eq!(Error::from(c).kind(), ErrorKind::RuleConflict);
    }

    #[test]
    fn limits_render_missing_bounds_as_null() {
        let e = Incompatible::Limit { topic: "min", expected: Some(Literal::Int(1)), provided: None };
        assert_eq!(e.to_string(), "Expected min value `1`, provided `null`");
    }
}
