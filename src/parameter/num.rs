use std::collections::BTreeSet;
use std::fmt;
use ordered_float::OrderedFloat;
use serde_json::json;

use crate::error::{Conflict, Error, Incompatible, Literal, Violation};
use crate::types::{Primitive, Type};
use crate::value::Value;

/// Scalar numbers a [`Numeric`] parameter can be built over.
pub trait Number: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    const PRIMITIVE: Primitive;
    const LOWEST: Self;
    const HIGHEST: Self;

    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
    fn literal(self) -> Literal;
    fn to_json(self) -> serde_json::Value;
}

impl Number for i64 {
    const PRIMITIVE: Primitive = Primitive::Int;
    const LOWEST: Self = i64::MIN;
    const HIGHEST: Self = i64::MAX;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
    fn into_value(self) -> Value { Value::Int(self) }
    fn literal(self) -> Literal { Literal::Int(self) }
    fn to_json(self) -> serde_json::Value { json!(self) }
}

impl Number for OrderedFloat<f64> {
    const PRIMITIVE: Primitive = Primitive::Float;
    const LOWEST: Self = OrderedFloat(f64::MIN);
    const HIGHEST: Self = OrderedFloat(f64::MAX);

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(OrderedFloat(*x)),
            Value::Int(n) => Some(OrderedFloat(*n as f64)),
            _ => None,
        }
    }
    fn into_value(self) -> Value { Value::Float(self.0) }
    fn literal(self) -> Literal { Literal::Float(self.0) }
    fn to_json(self) -> serde_json::Value { json!(self.0) }
}

/// Range (`min`/`max`) or enumerated (`accept`/`reject`) numeric rules.
///
/// The two rule families are exclusive: setting a list clears the range, and
/// setting a range bound while a list is set is a [`Conflict`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numeric<N: Number> {
    description: String,
    default: Option<N>,
    min: Option<N>,
    max: Option<N>,
    accept: BTreeSet<N>,
    reject: BTreeSet<N>,
}

pub type IntParameter = Numeric<i64>;
pub type FloatParameter = Numeric<OrderedFloat<f64>>;

impl<N: Number> Default for Numeric<N> {
    fn default() -> Self {
        Self {
            description: String::new(),
            default: None,
            min: None,
            max: None,
            accept: BTreeSet::new(),
            reject: BTreeSet::new(),
        }
    }
}

fn literals<N: Number>(xs: &BTreeSet<N>) -> Vec<Literal> {
    xs.iter().map(|x| x.literal()).collect()
}

impl<N: Number> Numeric<N> {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), ..Self::default() }
    }

    pub fn ty(&self) -> Type { Type::new(N::PRIMITIVE) }
    pub fn description(&self) -> &str { &self.description }
    pub fn default_value(&self) -> Option<N> { self.default }
    pub fn min(&self) -> Option<N> { self.min }
    pub fn max(&self) -> Option<N> { self.max }
    pub fn accept(&self) -> &BTreeSet<N> { &self.accept }
    pub fn reject(&self) -> &BTreeSet<N> { &self.reject }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self.clone() }
    }

    pub fn with_default(&self, value: N) -> Result<Self, Error> {
        self.check(value)?;
        Ok(Self { default: Some(value), ..self.clone() })
    }

    pub fn with_min(&self, value: N) -> Result<Self, Error> {
        self.assert_lists_empty("min")?;
        let bound = self.max.unwrap_or(N::HIGHEST);
        if value >= bound {
            return Err(Conflict::RangeOrder {
                rule: "min",
                value: value.literal(),
                relation: "greater or equal than",
                other: "max",
                bound: bound.literal(),
            }.into());
        }
        Self { min: Some(value), ..self.clone() }.keeping_default("min")
    }

    pub fn with_max(&self, value: N) -> Result<Self, Error> {
        self.assert_lists_empty("max")?;
        let bound = self.min.unwrap_or(N::LOWEST);
        if value <= bound {
            return Err(Conflict::RangeOrder {
                rule: "max",
                value: value.literal(),
                relation: "less or equal than",
                other: "min",
                bound: bound.literal(),
            }.into());
        }
        Self { max: Some(value), ..self.clone() }.keeping_default("max")
    }

    /// Replaces the accept list and clears `min`/`max`.
    pub fn with_accept(&self, values: impl IntoIterator<Item = N>) -> Result<Self, Error> {
        let new = Self { accept: values.into_iter().collect(), min: None, max: None, ..self.clone() };
        new.assert_accept_reject()?;
        new.keeping_default("accept")
    }

    /// Replaces the reject list and clears `min`/`max`.
    pub fn with_reject(&self, values: impl IntoIterator<Item = N>) -> Result<Self, Error> {
        let new = Self { reject: values.into_iter().collect(), min: None, max: None, ..self.clone() };
        new.assert_accept_reject()?;
        new.keeping_default("reject")
    }

    pub fn invoke(&self, value: &Value) -> Result<Value, Error> {
        let ty = self.ty();
        ty.assert(value)?;
        let n = N::from_value(value).ok_or_else(|| ty.mismatch(value))?;
        Ok(self.check(n)?.into_value())
    }

    /// accept → reject → min → max
    pub fn check(&self, n: N) -> Result<N, Violation> {
        if !self.accept.is_empty() {
            if !self.accept.contains(&n) {
                return Err(Violation::NotAccepted { value: n.literal(), accept: literals(&self.accept) });
            }
            return Ok(n);
        }
        if !self.reject.is_empty() {
            if self.reject.contains(&n) {
                return Err(Violation::Rejected { value: n.literal(), reject: literals(&self.reject) });
            }
            return Ok(n);
        }
        if let Some(min) = self.min {
            if n < min {
                return Err(Violation::LessThan { value: n.literal(), min: min.literal() });
            }
        }
        if let Some(max) = self.max {
            if n > max {
                return Err(Violation::GreaterThan { value: n.literal(), max: max.literal() });
            }
        }
        Ok(n)
    }

    pub fn assert_compatible(&self, other: &Self) -> Result<(), Error> {
        for (topic, mine, theirs) in [
            ("accept", &self.accept, &other.accept),
            ("reject", &self.reject, &other.reject),
        ] {
            if mine != theirs {
                return Err(Incompatible::List {
                    topic,
                    expected: literals(mine),
                    provided: literals(theirs),
                }.into());
            }
        }
        for (topic, mine, theirs) in [("min", self.min, other.min), ("max", self.max, other.max)] {
            if mine != theirs {
                return Err(Incompatible::Limit {
                    topic,
                    expected: mine.map(N::literal),
                    provided: theirs.map(N::literal),
                }.into());
            }
        }
        Ok(())
    }

    pub fn schema(&self) -> serde_json::Value {
        json!({
            "type": N::PRIMITIVE.as_str(),
            "description": self.description,
            "default": self.default.map(N::to_json),
            "min": self.min.map(N::to_json),
            "max": self.max.map(N::to_json),
            "accept": self.accept.iter().map(|x| x.to_json()).collect::<Vec<_>>(),
            "reject": self.reject.iter().map(|x| x.to_json()).collect::<Vec<_>>(),
        })
    }

    // The stored default has to pass the rules it now lives under.
    fn keeping_default(self, rule: &'static str) -> Result<Self, Error> {
        if let Some(default) = self.default {
            self.check(default).map_err(|violation| Conflict::DefaultBroken { rule, violation })?;
        }
        Ok(self)
    }

    fn assert_lists_empty(&self, rule: &'static str) -> Result<(), Error> {
        if !self.accept.is_empty() {
            return Err(Conflict::RangeWithList { rule, list: "accept" }.into());
        }
        if !self.reject.is_empty() {
            return Err(Conflict::RangeWithList { rule, list: "reject" }.into());
        }
        Ok(())
    }

    fn assert_accept_reject(&self) -> Result<(), Error> {
        if self.accept.intersection(&self.reject).next().is_some() {
            return Err(Conflict::AcceptReject {
                accept: literals(&self.accept),
                reject: literals(&self.reject),
            }.into());
        }
        Ok(())
    }
}

// ------------------------------ Options ----------------------------------- //

/// Constructor options, applied in a fixed order: accept, reject, min, max, default.
#[derive(Clone, Debug)]
pub struct NumericRules<N: Number> {
    pub description: String,
    pub default: Option<N>,
    pub min: Option<N>,
    pub max: Option<N>,
    pub accept: Vec<N>,
    pub reject: Vec<N>,
}

impl<N: Number> Default for NumericRules<N> {
    fn default() -> Self {
        Self {
            description: String::new(),
            default: None,
            min: None,
            max: None,
            accept: Vec::new(),
            reject: Vec::new(),
        }
    }
}

impl<N: Number> NumericRules<N> {
    pub fn build(self) -> Result<Numeric<N>, Error> {
        let mut p = Numeric::new(self.description);
        if !self.accept.is_empty() { p = p.with_accept(self.accept)?; }
        if !self.reject.is_empty() { p = p.with_reject(self.reject)?; }
        if let Some(min) = self.min { p = p.with_min(min)?; }
        if let Some(max) = self.max { p = p.with_max(max)?; }
        if let Some(default) = self.default { p = p.with_default(default)?; }
        Ok(p)
    }
}

// ------------------------------- Tests ------------------------------------ //
