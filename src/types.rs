use std::fmt;

/// Semantic type of a bound field. Drives flag grammar and usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    /// Signed integer of the given bit width.
    Int(u32),
    /// Unsigned integer of the given bit width.
    Uint(u32),
    /// Floating point of the given bit width.
    Float(u32),
    String,
    Duration,
    /// Comma-separated sequence of a primitive element type.
    Sequence,
    /// Raw byte sequence, taken from the text unsplit.
    Bytes,
    /// A type that decodes itself from text.
    Custom,
}

impl Kind {
    /// Short name shown as the value placeholder in usage text.
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int(_) => "int",
            Kind::Uint(_) => "uint",
            Kind::Float(_) => "float",
            Kind::String => "string",
            Kind::Duration => "duration",
            Kind::Sequence => "list",
            Kind::Bytes => "bytes",
            Kind::Custom => "value",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Int(bits) | Kind::Uint(bits) | Kind::Float(bits) => {
                write!(f, "{}{bits}", self.type_name())
            }
            other => f.write_str(other.type_name()),
        }
    }
}

/// How a nested record's fields are named once flattened into its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embedding {
    /// Children keep their own keys (`#[envflag(flatten)]`).
    Anonymous,
    /// Children keys are prefixed with the parent field's key: `PARENT_CHILD`.
    Named,
}

/// What to do when an environment variable is set but does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnEnvError {
    /// Use the type's zero value.
    #[default]
    Zero,
    /// Use the caller-supplied default.
    Default,
    /// Abort resolution with [`EnvflagError::EnvValue`](crate::EnvflagError::EnvValue).
    Fail,
}
