//! Composable parameter schemas for validating dynamic values.
//!
//! Build a schema from [`Parameter`]s, bind a value bag against it with
//! [`arguments`], and compare schemas with `assert_compatible`.
//!
//! ```
//! use paramschema::{arguments, int, parameters, string, Value};
//!
//! let schema = parameters()
//!     .with_required("id", int().with_min(1).unwrap())
//!     .with_optional("name", string().with_min_length(2).unwrap());
//! let args = arguments(&schema, &Value::map([("id", 7)])).unwrap();
//! assert_eq!(args.required("id").unwrap().int().unwrap(), 7);
//! ```
pub mod arguments;
pub mod cast;
pub mod decl;
pub mod error;
pub mod parameter;
pub mod parameters;
pub mod signature;
pub mod types;
pub mod value;

pub use arguments::Arguments;
pub use cast::Cast;
pub use error::{Error, ErrorKind};
pub use parameter::{
    ArrayParameter, ArrayStringParameter, BoolParameter, FloatParameter, IntParameter,
    IterableParameter, MixedParameter, NullParameter, NumericRules, ObjectParameter, Parameter,
    StringParameter, StringRules, UnionParameter,
};
pub use parameters::Parameters;
pub use signature::Signature;
pub use types::{Primitive, Type};
pub use value::{Key, Map, Object, Value};

pub fn null() -> NullParameter { NullParameter::default() }

pub fn mixed() -> MixedParameter { MixedParameter::default() }

pub fn boolean() -> BoolParameter { BoolParameter::default() }

pub fn int() -> IntParameter { IntParameter::default() }

pub fn float() -> FloatParameter { FloatParameter::default() }

pub fn string() -> StringParameter { StringParameter::default() }

pub fn object(class_name: &str) -> Result<ObjectParameter, Error> {
    ObjectParameter::new(class_name)
}

/// Empty (schemaless) array; add keys with `with_required`/`with_optional`.
pub fn arrayp() -> ArrayParameter { ArrayParameter::default() }

/// Array whose entries are all strings.
pub fn array_string() -> ArrayStringParameter { ArrayStringParameter::default() }

/// Iterable with `int` keys.
pub fn iterable(value: impl Into<Parameter>) -> IterableParameter {
    IterableParameter::new(int(), value)
}

pub fn iterable_keyed(key: impl Into<Parameter>, value: impl Into<Parameter>) -> IterableParameter {
    IterableParameter::new(key, value)
}

/// Two-way union; grow it with [`UnionParameter::with_added`].
pub fn union(a: impl Into<Parameter>, b: impl Into<Parameter>) -> UnionParameter {
    let parameters = Parameters::new().with_required("0", a).with_required("1", b);
    UnionParameter::from_pair(parameters)
}

pub fn parameters() -> Parameters { Parameters::new() }

pub fn arguments(parameters: &Parameters, value: &Value) -> Result<Arguments, Error> {
    parameters.bind(value)
}

/// Array parameter holding only `names` taken from `parameters`, all required.
pub fn array_from(parameters: &Parameters, names: &[&str]) -> Result<ArrayParameter, Error> {
    Ok(ArrayParameter::from_parameters(parameters.take(names)?))
}
