//! Bind a configuration struct to environment variables and command-line
//! flags. Define the struct, derive [`Schema`], and call [`bind`].
//!
//! ```ignore
//! #[derive(Debug, Default, envflag::Schema)]
//! struct AppConfig {
//!     host: String,
//!     #[envflag(flag = "port", help = "Port to listen on")]
//!     listen_port: u16,
//!     verbose: bool,
//! }
//!
//! let mut config = AppConfig::default();
//! envflag::bind(std::env::args().skip(1), &mut config)?;
//! ```
//!
//! That call reads `HOST`, `PORT` and `VERBOSE` from the environment, uses
//! them as the defaults of the flags `-HOST`, `-port` and `-VERBOSE`, parses
//! the command line, and writes the result into `config`.
//!
//! # Resolution
//!
//! ```text
//! Zero value            every field starts here
//!        ↑ overridden by
//! Environment variable  seeds the flag default
//!        ↑ overridden by
//! Command-line flag     -name value, -name=value, --name value
//! ```
//!
//! Values are written straight into the struct through typed references, so
//! there is no copy-back step and no reflection.
//!
//! # Naming
//!
//! Every field has a canonical name (the Rust field name) and up to four
//! overrides set with `#[envflag(...)]`:
//!
//! | Attribute | Meaning                                |
//! |-----------|----------------------------------------|
//! | `env`     | environment variable name              |
//! | `flag`    | flag name                              |
//! | `json`    | display name, used as a fallback flag  |
//! | `help`    | usage text                             |
//!
//! The flag name is the first of `flag`, `json`, `env` or the field's key
//! (its name in env style, `listen_port` → `LISTEN_PORT`). The environment
//! variable is `env` if given, otherwise the env-styled flag, display name
//! or key. Help text defaults to `flag: <flag> or env: <env>`. The exact
//! rules live on [`EffectiveNames`].
//!
//! # Nesting
//!
//! A field whose type derives [`Schema`] is flattened into its parent. A
//! named field prefixes its children's keys with its own (`db.url` →
//! `DB_URL`); a field marked `#[envflag(flatten)]` does not. `Option<T>`
//! fields are allocated on demand. Nesting deeper than
//! [`Binder::max_depth`] fails with [`EnvflagError::CyclicSchema`] instead of
//! overflowing the stack.
//!
//! # Field types
//!
//! `bool`, signed and unsigned integers of every width, `f32`, `f64`,
//! `String`, [`std::time::Duration`] (`300ms`, `2h45m`), `Vec<T>` of those
//! (comma-separated) and `Vec<u8>` (the raw bytes of the text). Any other
//! type can be bound with `#[envflag(decode)]` by implementing [`Decode`].
//!
//! Integers on the command line accept `0x`, `0o`, `0b` and leading-zero
//! octal prefixes; integers from the environment are decimal.
//!
//! # Malformed environment values
//!
//! A set but unparsable variable falls back to the field's zero value and
//! logs a warning. [`Binder::on_env_error`] picks another [`OnEnvError`]
//! policy, including failing outright. Malformed command-line values always
//! fail with [`EnvflagError::InvalidValue`].
//!
//! # Dynamic configurations
//!
//! When the fields are only known at runtime, [`Configuration`] builds the
//! same machinery from a list of [`FieldSpec`]s and exposes typed getters.
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! registered flags and applied overrides, `warn` for malformed environment
//! values, `trace` for every walked field. No subscriber is installed.

pub mod error;
pub mod types;

mod bind;
mod duration;
mod dynamic;
mod env;
mod flags;
mod naming;
mod schema;
mod value;

#[cfg(test)]
mod fixtures;

pub use bind::{Binder, DEFAULT_FLAG_SET_NAME, EffectiveNames, bind};
pub use duration::{format_duration, parse_duration};
pub use dynamic::{Configuration, FieldSpec, Value};
pub use env::{EnvSource, EnvValue, ProcessEnv, lookup_env_or, lookup_or};
pub use error::{BoxError, EnvflagError, ValueError};
pub use flags::{Flag, FlagSet};
pub use naming::{to_display_style, to_env_style, to_flag_style};
pub use schema::{Bind, DEFAULT_MAX_DEPTH, FieldDescriptor, FieldMeta, Schema, Walker, walk};
pub use types::{Embedding, Kind, OnEnvError};
pub use value::{
    Decode, Element, FloatSlot, IntSlot, Sequence, Slot, UintSlot, decode_custom, decode_element,
    parse_bool, parse_float, parse_int, parse_uint, parse_value,
};

#[cfg(feature = "derive")]
pub use envflag_derive::Schema;
