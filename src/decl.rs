//! Declarative schema documents.
//!
//! The document format is the `schema()` output of a parameter, so a printed
//! schema can be loaded back. Every rule goes through the same validated
//! `with_*` setters as hand-built parameters.
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{Conflict, Error};
use crate::parameter::{
    ArrayParameter, BoolParameter, IterableParameter, MixedParameter, NullParameter,
    NumericRules, ObjectParameter, Parameter, StringRules, UnionParameter,
};
use crate::parameters::Parameters;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("at JSON path {path} → {source}")]
    Syntax { path: String, source: serde_json::Error },
    #[error(transparent)]
    Schema(#[from] Error),
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Syntax {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}

/// Parse and build a parameter from a schema document.
///
/// An `object` parameter's default is a record, which documents can't
/// express, so a non-null `default` there fails to load.
pub fn load_str(src: &str) -> Result<Parameter, LoadError> {
    let decl: Decl = from_str_with_path(src)?;
    Ok(decl.build()?)
}

// ------------------------------ Documents --------------------------------- //

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Decl {
    #[serde(rename = "null")]
    Null {
        #[serde(default)]
        description: String,
    },
    #[serde(rename = "mixed")]
    Mixed {
        #[serde(default)]
        description: String,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    #[serde(rename = "bool")]
    Bool {
        #[serde(default)]
        description: String,
        #[serde(default)]
        default: Option<bool>,
    },
    #[serde(rename = "int")]
    Int(NumericDecl<i64>),
    #[serde(rename = "float")]
    Float(NumericDecl<f64>),
    #[serde(rename = "string")]
    String(StringDecl),
    #[serde(rename = "object")]
    Object {
        #[serde(default)]
        description: String,
        #[serde(rename = "className")]
        class_name: String,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    #[serde(rename = "array", alias = "array#list", alias = "array#map")]
    Array {
        #[serde(default)]
        description: String,
        #[serde(default)]
        default: Option<serde_json::Value>,
        #[serde(default)]
        parameters: IndexMap<String, EntryDecl>,
        #[serde(rename = "optionalMinimum", default)]
        optional_minimum: usize,
    },
    #[serde(rename = "iterable")]
    Iterable {
        #[serde(default)]
        description: String,
        #[serde(default)]
        default: Option<serde_json::Value>,
        parameters: KeyValueDecl,
    },
    #[serde(rename = "union")]
    Union {
        #[serde(default)]
        description: String,
        #[serde(default)]
        default: Option<serde_json::Value>,
        parameters: IndexMap<String, EntryDecl>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryDecl {
    #[serde(default = "yes")]
    pub required: bool,
    #[serde(flatten)]
    pub decl: Decl,
}

fn yes() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct KeyValueDecl {
    #[serde(rename = "K")]
    pub key: Box<Decl>,
    #[serde(rename = "V")]
    pub value: Box<Decl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "N: Deserialize<'de>"))]
pub struct NumericDecl<N> {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Option<N>,
    #[serde(default)]
    pub min: Option<N>,
    #[serde(default)]
    pub max: Option<N>,
    #[serde(default = "Vec::new")]
    pub accept: Vec<N>,
    #[serde(default = "Vec::new")]
    pub reject: Vec<N>,
}

impl<N> NumericDecl<N> {
    fn into_rules<M: crate::parameter::Number>(self, f: impl Fn(N) -> M) -> NumericRules<M> {
        NumericRules {
            description: self.description,
            default: self.default.map(&f),
            min: self.min.map(&f),
            max: self.max.map(&f),
            accept: self.accept.into_iter().map(&f).collect(),
            reject: self.reject.into_iter().map(&f).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringDecl {
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

// ------------------------------- Building --------------------------------- //

impl Decl {
    /// Builds the parameter tree. Nested failures are prefixed with their key.
    pub fn build(&self) -> Result<Parameter, Error> {
        Ok(match self.clone() {
            Decl::Null { description } => NullParameter::new(description).into(),
            Decl::Mixed { description, default } => {
                let p = MixedParameter::new(description);
                p.with_default(default.map(Value::from).unwrap_or_default()).into()
            }
            Decl::Bool { description, default } => {
                let p = BoolParameter::new(description);
                match default {
                    Some(b) => p.with_default(b).into(),
                    None => p.into(),
                }
            }
            Decl::Int(decl) => decl.into_rules(|n| n).build()?.into(),
            Decl::Float(decl) => decl.into_rules(OrderedFloat).build()?.into(),
            Decl::String(decl) => StringRules {
                description: decl.description,
                default: decl.default,
                starts_with: decl.starts_with,
                ends_with: decl.ends_with,
                contains: decl.contains,
                reject: decl.reject,
                length: decl.length,
                min_length: decl.min_length,
                max_length: decl.max_length,
            }
            .build()?
            .into(),
            Decl::Object { description, class_name, default } => {
                // records have no document form
                if default.is_some_and(|json| !json.is_null()) {
                    return Err(Conflict::UndeclarableDefault { primitive: "object" }.into());
                }
                ObjectParameter::new(&class_name)?.with_description(description).into()
            }
            Decl::Array { description, default, parameters, optional_minimum } => {
                let parameters = build_entries(&parameters)?.with_optional_minimum(optional_minimum)?;
                let p: Parameter = ArrayParameter::from_parameters(parameters)
                    .with_description(description)
                    .into();
                with_json_default(p, default)?
            }
            Decl::Iterable { description, default, parameters } => {
                let key = parameters.key.build().map_err(|e| Error::keyed("K", e))?;
                let value = parameters.value.build().map_err(|e| Error::keyed("V", e))?;
                let p: Parameter = IterableParameter::new(key, value).with_description(description).into();
                with_json_default(p, default)?
            }
            Decl::Union { description, default, parameters } => {
                let p: Parameter = UnionParameter::new(build_entries(&parameters)?)?
                    .with_description(description)
                    .into();
                with_json_default(p, default)?
            }
        })
    }
}

fn build_entries(entries: &IndexMap<String, EntryDecl>) -> Result<Parameters, Error> {
    entries.iter().try_fold(Parameters::new(), |acc, (name, entry)| {
        let parameter = entry.decl.build().map_err(|e| Error::keyed(name.as_str(), e))?;
        Ok(if entry.required {
            acc.with_required(name.as_str(), parameter)
        } else {
            acc.with_optional(name.as_str(), parameter)
        })
    })
}

fn with_json_default(parameter: Parameter, default: Option<serde_json::Value>) -> Result<Parameter, Error> {
    match default {
        Some(json) if !json.is_null() => parameter.with_default(Value::from(json)),
        _ => Ok(parameter),
    }
}
