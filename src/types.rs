//! Type descriptors: which primitive a parameter validates, and how.
use std::fmt;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Conflict, Error, Violation};
use crate::value::Value;

// `Foo`, `App\Models\User`, `\Foo`, `crate::Foo`
static CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(?:(?:\\|::)[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("class name pattern compiles")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    Iterable,
    Null,
    Mixed,
    Union,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Array => "array",
            Primitive::Object => "object",
            Primitive::Iterable => "iterable",
            Primitive::Null => "null",
            Primitive::Mixed => "mixed",
            Primitive::Union => "union",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable primitive + optional class name (object kind only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Type {
    primitive: Primitive,
    class_name: Option<String>,
}

impl Type {
    pub fn new(primitive: Primitive) -> Self {
        Self { primitive, class_name: None }
    }

    /// Object type bound to a class or interface name, checked eagerly.
    pub fn object(class_name: &str) -> Result<Self, Error> {
        if !CLASS_NAME.is_match(class_name) {
            return Err(Conflict::InvalidClassName { name: class_name.to_string() }.into());
        }
        Ok(Self {
            primitive: Primitive::Object,
            class_name: Some(class_name.trim_start_matches('\\').to_string()),
        })
    }

    pub fn primitive(&self) -> Primitive { self.primitive }

    pub fn class_name(&self) -> Option<&str> { self.class_name.as_deref() }

    /// Class name for object types, primitive name otherwise.
    pub fn hint(&self) -> &str {
        self.class_name.as_deref().unwrap_or(self.primitive.as_str())
    }

    pub fn validate(&self, value: &Value) -> bool {
        match (self.primitive, value) {
            (Primitive::Mixed | Primitive::Union, _) => true,
            (Primitive::Null, Value::Null) => true,
            (Primitive::Bool, Value::Bool(_)) => true,
            (Primitive::Int, Value::Int(_)) => true,
            // int widens to float
            (Primitive::Float, Value::Float(_) | Value::Int(_)) => true,
            (Primitive::String, Value::String(_)) => true,
            (Primitive::Array, Value::Array(_) | Value::Object(_)) => true,
            (Primitive::Iterable, Value::Array(_)) => true,
            (Primitive::Object, Value::Object(o)) => match &self.class_name {
                Some(name) => o.is_instance_of(name),
                None => true,
            },
            _ => false,
        }
    }

    /// [`Type::validate`] as a `Result`, failing with [`Type::mismatch`].
    pub fn assert(&self, value: &Value) -> Result<(), Violation> {
        if self.validate(value) {
            Ok(())
        } else {
            Err(self.mismatch(value))
        }
    }

    /// The violation for a value of the wrong runtime kind.
    pub fn mismatch(&self, value: &Value) -> Violation {
        match (self.primitive, &self.class_name) {
            (Primitive::Null, _) => Violation::NotNull,
            (Primitive::Object, Some(class)) => Violation::NotInstance {
                class: class.clone(),
                given: value.type_name().to_string(),
            },
            (primitive, _) => Violation::mismatch(primitive.as_str(), value),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}
