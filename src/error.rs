use thiserror::Error;

/// Boxed error returned by custom [`Decode`](crate::Decode) hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EnvflagError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Schema nesting exceeds {max_depth} levels at '{path}' (is the schema cyclic?)")]
    CyclicSchema { path: String, max_depth: usize },

    #[error("Flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("Bad flag syntax: {0}")]
    FlagSyntax(String),

    /// `-h` / `-help` was requested. Carries the rendered usage text.
    #[error("{0}")]
    Help(String),

    #[error("Invalid arguments: {0}")]
    Args(#[from] clap::Error),

    #[error("Invalid value {value:?} for flag -{flag}: {source}")]
    InvalidValue {
        flag: String,
        value: String,
        source: ValueError,
    },

    #[error("Invalid value {value:?} for environment variable {key}: {source}")]
    EnvValue {
        key: String,
        value: String,
        source: ValueError,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' is {actual}, not {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure to turn text into a field's native value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid {kind} syntax: {text:?}")]
    Syntax { kind: &'static str, text: String },

    #[error("{kind} value out of range: {text:?}")]
    Range { kind: &'static str, text: String },

    #[error("invalid duration {text:?}: {reason}")]
    Duration { text: String, reason: &'static str },

    #[error("no decoder accepted {0:?}")]
    NoDecoder(String),

    #[error(transparent)]
    Custom(BoxError),
}

impl ValueError {
    pub(crate) fn syntax(kind: &'static str, text: &str) -> Self {
        ValueError::Syntax {
            kind,
            text: text.to_string(),
        }
    }

    pub(crate) fn range(kind: &'static str, text: &str) -> Self {
        ValueError::Range {
            kind,
            text: text.to_string(),
        }
    }
}
