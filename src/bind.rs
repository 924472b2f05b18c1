//! The binder: walk a schema, seed every field from the environment, register
//! one flag per field, then apply command-line overrides.
//!
//! # Naming precedence
//!
//! | Identifier | Resolution order                                          |
//! |------------|-----------------------------------------------------------|
//! | flag       | flag override, display override, env override, key       |
//! | env        | env override, then env-styled flag, display, or key       |
//! | help       | help override, else `"flag: <flag> or env: <env>"`         |
//!
//! An env override with no flag or display override therefore also names the
//! flag, while a flag override never changes which variable is read unless it
//! is the only override.
//!
//! # Resolution order
//!
//! ```text
//! zero value
//!      ↑ overridden by
//! environment variable (seeds the flag default)
//!      ↑ overridden by
//! command-line flag
//! ```
//!
//! Sequence fields are populated after the command line has been parsed,
//! from the flag text or, failing that, the seeded default.

use std::time::Duration;

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::env::{EnvSource, ProcessEnv, lookup_or};
use crate::error::{EnvflagError, ValueError};
use crate::flags::{Flag, FlagSet, check_name};
use crate::naming::to_env_style;
use crate::schema::{DEFAULT_MAX_DEPTH, FieldMeta, Schema, walk};
use crate::types::OnEnvError;
use crate::value::{FloatSlot, Slot, decode_custom, parse_value, with_int, with_uint};

/// Name of the flag set when none is configured.
pub const DEFAULT_FLAG_SET_NAME: &str = "config";

/// The precedence-resolved identifiers of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveNames {
    pub flag: String,
    pub env: String,
    pub help: String,
}

impl EffectiveNames {
    /// Resolve names for a field with the given metadata and walker key.
    pub fn resolve(meta: &FieldMeta, key: &str) -> Self {
        let flag = meta
            .flag_override()
            .or(meta.display_override())
            .or(meta.env_override())
            .unwrap_or(key)
            .to_string();
        let env = match meta.env_override() {
            Some(env) => env.to_string(),
            None => to_env_style(meta.flag_override().or(meta.display_override()).unwrap_or(key)),
        };
        let help = match meta.help_override() {
            Some(help) => help.to_string(),
            None => format!("flag: {flag} or env: {env}"),
        };
        Self { flag, env, help }
    }
}

/// Binds schemas to an environment and a command line.
///
/// ```ignore
/// let mut config = AppConfig::default();
/// let flags = Binder::new()
///     .on_env_error(OnEnvError::Fail)
///     .bind(std::env::args().skip(1), &mut config)?;
/// ```
#[derive(Debug, Clone)]
pub struct Binder<E = ProcessEnv> {
    env: E,
    name: String,
    on_env_error: OnEnvError,
    max_depth: usize,
}

impl Default for Binder<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder<ProcessEnv> {
    pub fn new() -> Self {
        Self {
            env: ProcessEnv,
            name: DEFAULT_FLAG_SET_NAME.to_string(),
            on_env_error: OnEnvError::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<E: EnvSource> Binder<E> {
    /// Read variables from `env` instead of the process environment.
    pub fn with_env<F: EnvSource>(self, env: F) -> Binder<F> {
        Binder {
            env,
            name: self.name,
            on_env_error: self.on_env_error,
            max_depth: self.max_depth,
        }
    }

    /// Name of the resulting flag set, shown in usage text.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// What to do with a set but malformed environment variable.
    pub fn on_env_error(mut self, policy: OnEnvError) -> Self {
        self.on_env_error = policy;
        self
    }

    /// Deepest allowed nesting of records before the schema is reported as
    /// cyclic.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Resolve every field of `schema` from the environment and `args`
    /// (without the program name), writing values into the schema in place.
    ///
    /// Returns the populated flag set, which carries the usage text and any
    /// positional arguments.
    pub fn bind<S, I, A>(&self, args: I, schema: &mut S) -> Result<FlagSet, EnvflagError>
    where
        S: Schema + ?Sized,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut fields = walk(schema, self.max_depth)?;
        let names: Vec<EffectiveNames> = fields
            .iter()
            .map(|field| EffectiveNames::resolve(&field.meta, &field.key))
            .collect();

        // Schema defects must surface before any field is written.
        let mut seen = IndexSet::with_capacity(names.len());
        for resolved in &names {
            check_name(&resolved.flag)?;
            if !seen.insert(resolved.flag.as_str()) {
                return Err(EnvflagError::DuplicateFlag(resolved.flag.clone()));
            }
        }

        let mut flags = FlagSet::new(self.name.clone());
        for (field, resolved) in fields.iter_mut().zip(&names) {
            let default = self.seed(&resolved.env, &mut field.slot)?;
            flags.register(
                resolved.flag.clone(),
                field.slot.kind(),
                default,
                resolved.help.clone(),
            )?;
        }

        flags.parse(args)?;

        for (field, resolved) in fields.iter_mut().zip(&names) {
            let Some(flag) = flags.lookup(&resolved.flag) else {
                continue;
            };
            self.apply(flag, &resolved.env, &mut field.slot)?;
        }

        debug!(name = %self.name, fields = names.len(), "bound configuration");
        Ok(flags)
    }

    /// Write the environment value (or zero) into `slot` and return the
    /// flag's textual default.
    fn seed(&self, key: &str, slot: &mut Slot<'_>) -> Result<String, EnvflagError> {
        let env = &self.env;
        let policy = self.on_env_error;

        match slot {
            Slot::Bool(v) => **v = lookup_or(env, key, false, policy)?,
            Slot::Int(s) => with_int!(s, v => **v = lookup_or(env, key, 0, policy)?),
            Slot::Uint(s) => with_uint!(s, v => **v = lookup_or(env, key, 0, policy)?),
            Slot::Float(FloatSlot::F32(v)) => **v = lookup_or(env, key, 0.0, policy)?,
            Slot::Float(FloatSlot::F64(v)) => **v = lookup_or(env, key, 0.0, policy)?,
            Slot::Str(v) => **v = lookup_or(env, key, String::new(), policy)?,
            Slot::Duration(v) => **v = lookup_or(env, key, Duration::ZERO, policy)?,
            Slot::Sequence(_) => return lookup_or(env, key, String::new(), policy),
            Slot::Custom(target) => {
                let Some(raw) = env.var(key) else {
                    return Ok(target.to_text());
                };
                if let Err(source) = decode_custom(&raw, &mut **target) {
                    self.env_fallback(key, &raw, source)?;
                    return Ok(target.to_text());
                }
                return Ok(raw);
            }
        }
        Ok(slot.render())
    }

    /// Apply the command-line value of `flag` to `slot`. Sequences are
    /// populated from the seeded default when no value was given.
    fn apply(&self, flag: &Flag, env_key: &str, slot: &mut Slot<'_>) -> Result<(), EnvflagError> {
        let invalid = |text: &str, source| EnvflagError::InvalidValue {
            flag: flag.name().to_string(),
            value: text.to_string(),
            source,
        };

        match (slot, flag.value()) {
            (Slot::Sequence(seq), None) => {
                if let Err(source) = seq.populate(flag.default_value()) {
                    self.env_fallback(env_key, flag.default_value(), source)?;
                    seq.populate("").map_err(|source| invalid("", source))?;
                }
            }
            (slot, Some(text)) => {
                parse_value(text, slot).map_err(|source| invalid(text, source))?;
                debug!(flag = flag.name(), value = text, "applied command-line override");
            }
            (_, None) => {}
        }
        Ok(())
    }

    /// Handle a malformed environment value the binder could not seed from.
    /// The caller leaves the field at its zero value unless this fails.
    fn env_fallback(&self, key: &str, raw: &str, source: ValueError) -> Result<(), EnvflagError> {
        if self.on_env_error == OnEnvError::Fail {
            return Err(EnvflagError::EnvValue {
                key: key.to_string(),
                value: raw.to_string(),
                source,
            });
        }
        warn!(key, value = raw, error = %source, "malformed environment value, using zero value");
        Ok(())
    }
}

/// Bind `schema` against the process environment and `args` with default
/// settings. See [`Binder::bind`].
pub fn bind<S, I, A>(args: I, schema: &mut S) -> Result<FlagSet, EnvflagError>
where
    S: Schema + ?Sized,
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    Binder::new().bind(args, schema)
}
