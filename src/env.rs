//! Typed environment lookups.
//!
//! Variables are read by exact, case-sensitive name through an [`EnvSource`],
//! so tests and embedders can pass a plain map instead of touching the
//! process environment.
//!
//! | Variable state | Result                                    |
//! |----------------|-------------------------------------------|
//! | unset          | the caller's default                      |
//! | set, parses    | the parsed value                          |
//! | set, malformed | decided by [`OnEnvError`] (zero by default) |
//!
//! Integers read from the environment are decimal only. Durations use the
//! human-readable grammar (`5s`, `2h30m`), not raw nanoseconds.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::Duration;

use tracing::warn;

use crate::duration::parse_duration;
use crate::error::{EnvflagError, ValueError};
use crate::types::OnEnvError;
use crate::value::{parse_bool, parse_float};

/// Somewhere to read environment variables from.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment. Non-UTF-8 values are converted lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// A value that can be seeded from an environment variable.
pub trait EnvValue: Sized {
    fn zero() -> Self;

    fn parse_env(text: &str) -> Result<Self, ValueError>;
}

macro_rules! decimal_env_value {
    ($kind:literal => $($ty:ty),+) => {
        $(
            impl EnvValue for $ty {
                fn zero() -> Self {
                    0
                }

                fn parse_env(text: &str) -> Result<Self, ValueError> {
                    text.parse().map_err(|_| ValueError::syntax($kind, text))
                }
            }
        )+
    };
}

decimal_env_value!("int" => i8, i16, i32, i64, isize);
decimal_env_value!("uint" => u8, u16, u32, u64, usize);

impl EnvValue for bool {
    fn zero() -> Self {
        false
    }

    fn parse_env(text: &str) -> Result<Self, ValueError> {
        parse_bool(text)
    }
}

impl EnvValue for f32 {
    fn zero() -> Self {
        0.0
    }

    fn parse_env(text: &str) -> Result<Self, ValueError> {
        parse_float(text)
    }
}

impl EnvValue for f64 {
    fn zero() -> Self {
        0.0
    }

    fn parse_env(text: &str) -> Result<Self, ValueError> {
        parse_float(text)
    }
}

impl EnvValue for String {
    fn zero() -> Self {
        String::new()
    }

    fn parse_env(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }
}

impl EnvValue for Duration {
    fn zero() -> Self {
        Duration::ZERO
    }

    fn parse_env(text: &str) -> Result<Self, ValueError> {
        parse_duration(text)
    }
}

/// Look up `key` in `env` and parse it as `T`, falling back to `default`
/// when the variable is unset.
///
/// A set but malformed variable is handled by `policy`. Note that
/// [`OnEnvError::Zero`] returns `T`'s zero value, not `default`.
pub fn lookup_or<T, E>(
    env: &E,
    key: &str,
    default: T,
    policy: OnEnvError,
) -> Result<T, EnvflagError>
where
    T: EnvValue,
    E: EnvSource + ?Sized,
{
    let Some(raw) = env.var(key) else {
        return Ok(default);
    };

    match T::parse_env(&raw) {
        Ok(value) => Ok(value),
        Err(source) => match policy {
            OnEnvError::Zero => {
                warn!(
                    key,
                    value = %raw,
                    error = %source,
                    "malformed environment value, using zero value"
                );
                Ok(T::zero())
            }
            OnEnvError::Default => {
                warn!(
                    key,
                    value = %raw,
                    error = %source,
                    "malformed environment value, using default"
                );
                Ok(default)
            }
            OnEnvError::Fail => Err(EnvflagError::EnvValue {
                key: key.to_string(),
                value: raw,
                source,
            }),
        },
    }
}

/// Process-environment shorthand for [`lookup_or`] with the zero-value policy.
///
/// ```ignore
/// let workers: u32 = lookup_env_or("WORKERS", 4);
/// let timeout = lookup_env_or("TIMEOUT", Duration::from_secs(30));
/// ```
pub fn lookup_env_or<T: EnvValue>(key: &str, default: T) -> T {
    let raw = match ProcessEnv.var(key) {
        Some(raw) => raw,
        None => return default,
    };
    T::parse_env(&raw).unwrap_or_else(|source| {
        warn!(key, value = %raw, error = %source, "malformed environment value, using zero value");
        T::zero()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unset_returns_caller_default() {
        let vars = env(&[]);
        assert_eq!(lookup_or(&vars, "PORT", 8080u16, OnEnvError::Zero).unwrap(), 8080);
        assert_eq!(
            lookup_or(&vars, "NAME", "fallback".to_string(), OnEnvError::Zero).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn set_value_is_parsed() {
        let vars = env(&[("PORT", "9000"), ("DEBUG", "true"), ("RATIO", "0.25")]);
        assert_eq!(lookup_or(&vars, "PORT", 1u16, OnEnvError::Zero).unwrap(), 9000);
        assert!(lookup_or(&vars, "DEBUG", false, OnEnvError::Zero).unwrap());
        assert_eq!(lookup_or(&vars, "RATIO", 1.0f64, OnEnvError::Zero).unwrap(), 0.25);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let vars = env(&[("port", "9000")]);
        assert_eq!(lookup_or(&vars, "PORT", 1u16, OnEnvError::Zero).unwrap(), 1);
    }

    #[test]
    fn malformed_value_falls_back_to_zero_not_default() {
        let vars = env(&[("PORT", "eighty")]);
        assert_eq!(lookup_or(&vars, "PORT", 8080i64, OnEnvError::Zero).unwrap(), 0);
    }

    #[test]
    fn malformed_value_with_default_policy() {
        let vars = env(&[("PORT", "eighty")]);
        assert_eq!(
            lookup_or(&vars, "PORT", 8080i64, OnEnvError::Default).unwrap(),
            8080
        );
    }

    #[test]
    fn malformed_value_with_fail_policy() {
        let vars = env(&[("PORT", "eighty")]);
        let err = lookup_or(&vars, "PORT", 8080i64, OnEnvError::Fail).unwrap_err();
        match err {
            EnvflagError::EnvValue { key, value, .. } => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_integers_are_decimal_only() {
        let vars = env(&[("MASK", "0x1f")]);
        assert_eq!(lookup_or(&vars, "MASK", 7u32, OnEnvError::Zero).unwrap(), 0);
    }

    #[test]
    fn env_integers_are_sized() {
        let vars = env(&[("SMALL", "300")]);
        assert_eq!(lookup_or(&vars, "SMALL", 1u8, OnEnvError::Zero).unwrap(), 0);
    }

    #[test]
    fn durations_use_human_grammar() {
        let vars = env(&[("TIMEOUT", "1m30s"), ("RAW", "1000")]);
        assert_eq!(
            lookup_or(&vars, "TIMEOUT", Duration::ZERO, OnEnvError::Zero).unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            lookup_or(&vars, "RAW", Duration::from_secs(5), OnEnvError::Zero).unwrap(),
            Duration::ZERO
        );
    }

    #[test]
    fn empty_string_is_a_set_value() {
        let vars = env(&[("NAME", "")]);
        assert_eq!(
            lookup_or(&vars, "NAME", "fallback".to_string(), OnEnvError::Zero).unwrap(),
            ""
        );
    }

    #[test]
    fn btree_map_source() {
        let vars: BTreeMap<String, String> = [("HOST".to_string(), "db".to_string())].into();
        assert_eq!(
            lookup_or(&vars, "HOST", String::new(), OnEnvError::Zero).unwrap(),
            "db"
        );
    }

    #[test]
    fn process_env_unset_variable_uses_default() {
        let value: u32 = lookup_env_or("ENVFLAG_TEST_SURELY_UNSET_VARIABLE", 17);
        assert_eq!(value, 17);
    }
}
