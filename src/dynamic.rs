//! Configurations assembled at runtime from a list of field specs.
//!
//! Each [`FieldSpec`] names a field and fixes its type through its default
//! value. [`Configuration::build`] seeds every field from the environment and
//! registers its flag straight away; [`Configuration::parse`] then applies a
//! command line. Values are read back by name with typed accessors.
//!
//! ```ignore
//! let mut config = Configuration::build(vec![
//!     FieldSpec::new("listen port", 8080i64).help("Port to listen on"),
//!     FieldSpec::bool("verbose"),
//! ])?;
//! config.parse(std::env::args().skip(1))?;
//!
//! let port = config.get_int64("listen port")?;
//! ```
//!
//! A `Configuration` also implements [`Schema`], so it can go through a
//! [`Binder`](crate::Binder) like any derived record.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::env::{EnvSource, ProcessEnv, lookup_or};
use crate::error::{EnvflagError, ValueError};
use crate::flags::FlagSet;
use crate::naming::{to_display_style, to_env_style, to_flag_style};
use crate::schema::{FieldMeta, Schema, Walker};
use crate::types::{Kind, OnEnvError};
use crate::value::{FloatSlot, IntSlot, Slot, parse_bool, parse_float, parse_int};

/// The value of one dynamic field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::Float(_) => "float64",
            Value::String(_) => "string",
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int(64),
            Value::Float(_) => Kind::Float(64),
            Value::String(_) => Kind::String,
        }
    }

    /// The zero value of the same type.
    pub fn zero(&self) -> Value {
        match self {
            Value::Bool(_) => Value::Bool(false),
            Value::Int(_) => Value::Int(0),
            Value::Float(_) => Value::Float(0.0),
            Value::String(_) => Value::String(String::new()),
        }
    }

    /// Parse `text` as a value of the same type, using the flag grammar.
    pub fn parse_as(&self, text: &str) -> Result<Value, ValueError> {
        Ok(match self {
            Value::Bool(_) => Value::Bool(parse_bool(text)?),
            Value::Int(_) => Value::Int(parse_int(text)?),
            Value::Float(_) => Value::Float(parse_float(text)?),
            Value::String(_) => Value::String(text.to_string()),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Declaration of one dynamic field.
///
/// Names not given explicitly are derived from the field name: env style for
/// the variable, flag style for the flag, display style for serialization.
/// Explicit names pass through the same normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    default: Value,
    env: String,
    flag: String,
    display: String,
    help: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        let name = name.into();
        Self {
            env: to_env_style(&name),
            flag: to_flag_style(&name),
            display: to_display_style(&name),
            help: name.clone(),
            default: default.into(),
            name,
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, 0i64)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, 0.0f64)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    pub fn env(mut self, name: &str) -> Self {
        self.env = to_env_style(name);
        self
    }

    pub fn flag(mut self, name: &str) -> Self {
        self.flag = to_flag_style(name);
        self
    }

    pub fn display(mut self, name: &str) -> Self {
        self.display = to_display_style(name);
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn env_name(&self) -> &str {
        &self.env
    }

    pub fn flag_name(&self) -> &str {
        &self.flag
    }

    pub fn display_name(&self) -> &str {
        &self.display
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    fn meta(&self) -> FieldMeta {
        FieldMeta::new(self.name.clone())
            .env(self.env.clone())
            .flag(self.flag.clone())
            .display(self.display.clone())
            .help(self.help.clone())
    }
}

#[derive(Debug, Clone)]
struct Entry {
    spec: FieldSpec,
    value: Value,
}

/// A runtime-built configuration: ordered named cells plus their flags.
#[derive(Debug, Clone)]
pub struct Configuration {
    entries: IndexMap<String, Entry>,
    flags: FlagSet,
}

impl Configuration {
    /// Build from the process environment with the zero-value policy.
    pub fn build(specs: impl IntoIterator<Item = FieldSpec>) -> Result<Self, EnvflagError> {
        Self::build_with(specs, &ProcessEnv, OnEnvError::default())
    }

    /// Seed each field from `env` (falling back to its declared default when
    /// unset) and register its flag. Cells start at their zero values until
    /// [`parse`](Self::parse) runs.
    pub fn build_with<E: EnvSource + ?Sized>(
        specs: impl IntoIterator<Item = FieldSpec>,
        env: &E,
        policy: OnEnvError,
    ) -> Result<Self, EnvflagError> {
        let mut entries: IndexMap<String, Entry> = IndexMap::new();
        let mut flags = FlagSet::new(crate::bind::DEFAULT_FLAG_SET_NAME);

        for spec in specs {
            if spec.name.trim().is_empty() {
                return Err(EnvflagError::InvalidSchema(
                    "dynamic field with an empty name".into(),
                ));
            }
            if entries.contains_key(&spec.name) {
                return Err(EnvflagError::InvalidSchema(format!(
                    "dynamic field '{}' declared twice",
                    spec.name
                )));
            }

            let seed = seed(&spec, env, policy)?;
            flags.register(spec.flag.clone(), seed.kind(), seed.to_string(), spec.help.clone())?;
            debug!(
                field = %spec.name,
                env = %spec.env,
                flag = %spec.flag,
                "declared dynamic field"
            );

            let value = spec.default.zero();
            entries.insert(spec.name.clone(), Entry { spec, value });
        }

        Ok(Self { entries, flags })
    }

    /// Parse `args` against the registered flags and store every field's
    /// effective value: the command-line text if given, else the seed.
    pub fn parse<I, A>(&mut self, args: I) -> Result<(), EnvflagError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.flags.parse(args)?;
        for entry in self.entries.values_mut() {
            let Some(flag) = self.flags.lookup(&entry.spec.flag) else {
                continue;
            };
            let text = flag.effective();
            entry.value = entry
                .spec
                .default
                .parse_as(text)
                .map_err(|source| EnvflagError::InvalidValue {
                    flag: flag.name().to_string(),
                    value: text.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn usage(&self) -> String {
        self.flags.usage()
    }

    /// Field specs in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.entries.values().map(|e| &e.spec)
    }

    pub fn get_raw(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, EnvflagError> {
        match self.cell(name)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(name, "bool", other)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str, EnvflagError> {
        match self.cell(name)? {
            Value::String(v) => Ok(v),
            other => Err(mismatch(name, "string", other)),
        }
    }

    pub fn get_int64(&self, name: &str) -> Result<i64, EnvflagError> {
        match self.cell(name)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(name, "int64", other)),
        }
    }

    pub fn get_float64(&self, name: &str) -> Result<f64, EnvflagError> {
        match self.cell(name)? {
            Value::Float(v) => Ok(*v),
            other => Err(mismatch(name, "float64", other)),
        }
    }

    /// Pretty-printed JSON keyed by display name.
    pub fn to_json(&self) -> Result<String, EnvflagError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn cell(&self, name: &str) -> Result<&Value, EnvflagError> {
        self.get_raw(name)
            .ok_or_else(|| EnvflagError::UnknownField(name.to_string()))
    }
}

fn mismatch(name: &str, expected: &'static str, actual: &Value) -> EnvflagError {
    EnvflagError::TypeMismatch {
        field: name.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

fn seed<E: EnvSource + ?Sized>(
    spec: &FieldSpec,
    env: &E,
    policy: OnEnvError,
) -> Result<Value, EnvflagError> {
    let key = spec.env.as_str();
    Ok(match &spec.default {
        Value::Bool(d) => Value::Bool(lookup_or(env, key, *d, policy)?),
        Value::Int(d) => Value::Int(lookup_or(env, key, *d, policy)?),
        Value::Float(d) => Value::Float(lookup_or(env, key, *d, policy)?),
        Value::String(d) => Value::String(lookup_or(env, key, d.clone(), policy)?),
    })
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.entries
                .values()
                .map(|e| (e.spec.display.as_str(), &e.value)),
        )
    }
}

impl Schema for Configuration {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
        for entry in self.entries.values_mut() {
            let meta = entry.spec.meta();
            let slot = match &mut entry.value {
                Value::Bool(v) => Slot::Bool(v),
                Value::Int(v) => Slot::Int(IntSlot::I64(v)),
                Value::Float(v) => Slot::Float(FloatSlot::F64(v)),
                Value::String(v) => Slot::Str(v),
            };
            walker.leaf(meta, slot)?;
        }
        Ok(())
    }
}
