//! Dynamic values validated by parameters.
//!
//! `Value` mirrors the shapes a loosely typed caller hands us: scalars, ordered
//! maps keyed by int-or-string (lists are just maps keyed `0..n`), and records.
use std::fmt;
use indexmap::IndexMap;

pub type Map = IndexMap<Key, Value>;

// ------------------------------- Key -------------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Canonical decimal strings become int keys: `"7"` → `Int(7)`, `"07"` stays a string.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Key::Int(n),
            _ => Key::Str(s.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::Int(*n),
            Key::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self { Key::parse(s) }
}

impl From<String> for Key {
    fn from(s: String) -> Self { Key::parse(&s) }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self { Key::Int(n) }
}

// ------------------------------ Object ------------------------------------ //

/// A record value: a class name, the interfaces it satisfies, and its fields.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Object {
    class: String,
    implements: Vec<String>,
    fields: IndexMap<String, Value>,
    dynamic: IndexMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into(), ..Self::default() }
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    /// Declared field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Dynamically attached field; loses to a declared field of the same name.
    pub fn with_dynamic(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dynamic.insert(name.into(), value.into());
        self
    }

    pub fn class(&self) -> &str { &self.class }

    pub fn is_instance_of(&self, name: &str) -> bool {
        let name = name.trim_start_matches('\\');
        self.class.trim_start_matches('\\') == name
            || self.implements.iter().any(|i| i.trim_start_matches('\\') == name)
    }

    /// Declared fields first, then dynamic fields not shadowed by a declared one.
    pub fn to_map(&self) -> IndexMap<String, Value> {
        let mut out = self.fields.clone();
        for (k, v) in &self.dynamic {
            if !out.contains_key(k) {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }
}

// ------------------------------- Value ------------------------------------ //

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Map),
    Object(Object),
}

impl Value {
    /// Build a list (`0..n` keys) from any sequence of values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Int(i as i64), v.into()))
            .collect())
    }

    /// Build a map from `(key, value)` pairs, keys normalized via [`Key::parse`].
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Value::Array(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(o) => o.class(),
        }
    }

    /// Arrays as-is, objects flattened to their fields; `None` for anything else.
    pub fn to_map(&self) -> Option<Map> {
        match self {
            Value::Array(m) => Some(m.clone()),
            Value::Object(o) => Some(o.to_map().into_iter().map(|(k, v)| (Key::parse(&k), v)).collect()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(n) => J::from(*n),
            Value::Float(f) => J::from(*f),
            Value::String(s) => J::String(s.clone()),
            Value::Array(m) if is_list(m) => J::Array(m.values().map(Value::to_json).collect()),
            Value::Array(m) => J::Object(m.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect()),
            Value::Object(o) => J::Object(o.to_map().iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }
}

/// True when keys are exactly `0, 1, .., n-1` in order.
pub fn is_list(map: &Map) -> bool {
    map.keys().enumerate().all(|(i, k)| *k == Key::Int(i as i64))
}

// Short, human-facing rendering used in violation messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

// ----------------------------- Conversions -------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::String(s),
            J::Array(xs) => Value::list(xs.into_iter().map(Value::from)),
            J::Object(m) => Value::Array(m.into_iter().map(|(k, v)| (Key::parse(&k), Value::from(v))).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Int(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Int(n as i64) }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self { Value::Float(x) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self { Value::Array(m) }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self { Value::Object(o) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

// ------------------------------- Tests ------------------------------------ //
