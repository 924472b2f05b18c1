//! Schema walking: flatten a configuration record into an ordered list of
//! field descriptors.
//!
//! A record implements [`Schema`] (normally through `#[derive(Schema)]`) and
//! hands each field to the [`Walker`]. Field types implement [`Bind`], which
//! decides whether the field is a leaf (one slot) or a nested record (its own
//! fields, flattened in place). Nested records under a named field get that
//! field's key as a prefix; `flatten`ed records do not.
//!
//! ```text
//! struct App { port: u16, db: Db, #[envflag(flatten)] log: Log }
//! struct Db  { url: String }
//! struct Log { level: String }
//!
//! → PORT, DB_URL, LEVEL
//! ```

use std::time::Duration;

use tracing::trace;

use crate::error::EnvflagError;
use crate::naming::to_env_style;
use crate::types::Embedding;
use crate::value::{Element, FloatSlot, IntSlot, Slot, UintSlot};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A configuration record whose fields can be walked.
pub trait Schema {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError>;
}

/// A field type the walker knows how to bind.
pub trait Bind {
    fn bind<'a>(&'a mut self, meta: FieldMeta, walker: &mut Walker<'a>) -> Result<(), EnvflagError>;
}

/// Declared naming for one field: its canonical name plus optional overrides.
///
/// Empty override strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    name: String,
    env: Option<String>,
    flag: Option<String>,
    display: Option<String>,
    help: Option<String>,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|v| !v.is_empty())
}

impl FieldMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Explicit environment variable name. Stored upper-cased.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = non_empty(name).map(|n| n.to_uppercase());
        self
    }

    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.flag = non_empty(name);
        self
    }

    /// JSON-style display name. Used as the flag name when no flag override exists.
    pub fn display(mut self, name: impl Into<String>) -> Self {
        self.display = non_empty(name);
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = non_empty(text);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env_override(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn flag_override(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    pub fn display_override(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn help_override(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// One configurable field found by the walker.
#[derive(Debug)]
pub struct FieldDescriptor<'a> {
    pub meta: FieldMeta,
    /// Conventional env-style key, including any named-nesting prefix.
    pub key: String,
    pub slot: Slot<'a>,
}

/// Collects field descriptors while a [`Schema`] walks itself.
pub struct Walker<'a> {
    fields: Vec<FieldDescriptor<'a>>,
    prefix: String,
    path: Vec<String>,
    max_depth: usize,
}

impl<'a> Walker<'a> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            fields: Vec::new(),
            prefix: String::new(),
            path: Vec::new(),
            max_depth,
        }
    }

    /// Bind a field through its type's [`Bind`] impl.
    pub fn field<T: Bind + ?Sized>(
        &mut self,
        meta: FieldMeta,
        value: &'a mut T,
    ) -> Result<(), EnvflagError> {
        value.bind(meta, self)
    }

    /// Record a leaf field.
    pub fn leaf(&mut self, meta: FieldMeta, slot: Slot<'a>) -> Result<(), EnvflagError> {
        self.check_name(&meta)?;
        let key = self.key_for(&meta);
        trace!(field = meta.name(), key = %key, kind = %slot.kind(), "walked field");
        self.fields.push(FieldDescriptor { meta, key, slot });
        Ok(())
    }

    /// Walk a nested record in place of the field that holds it.
    pub fn nest<S: Schema + ?Sized>(
        &mut self,
        meta: FieldMeta,
        embedding: Embedding,
        record: &'a mut S,
    ) -> Result<(), EnvflagError> {
        self.check_name(&meta)?;
        if self.path.len() >= self.max_depth {
            let mut path = self.path.join(".");
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(meta.name());
            return Err(EnvflagError::CyclicSchema {
                path,
                max_depth: self.max_depth,
            });
        }

        let prefix = match embedding {
            Embedding::Named => self.key_for(&meta),
            Embedding::Anonymous => self.prefix.clone(),
        };
        let saved = std::mem::replace(&mut self.prefix, prefix);
        self.path.push(meta.name().to_string());

        let result = record.walk(self);

        self.path.pop();
        self.prefix = saved;
        result
    }

    pub fn into_fields(self) -> Vec<FieldDescriptor<'a>> {
        self.fields
    }

    fn check_name(&self, meta: &FieldMeta) -> Result<(), EnvflagError> {
        if meta.name().trim().is_empty() {
            let at = if self.path.is_empty() {
                "top level".to_string()
            } else {
                format!("'{}'", self.path.join("."))
            };
            return Err(EnvflagError::InvalidSchema(format!(
                "field with an empty name at {at}"
            )));
        }
        Ok(())
    }

    /// The env override (or canonical name, env-styled), upper-cased and
    /// prefixed by the enclosing named record's key.
    fn key_for(&self, meta: &FieldMeta) -> String {
        let base = match meta.env_override() {
            Some(env) => env.to_uppercase(),
            None => to_env_style(meta.name()),
        };
        if self.prefix.is_empty() {
            base
        } else {
            format!("{}_{base}", self.prefix)
        }
    }
}

/// Walk `schema` and return its fields in declaration order.
pub fn walk<'a, S: Schema + ?Sized>(
    schema: &'a mut S,
    max_depth: usize,
) -> Result<Vec<FieldDescriptor<'a>>, EnvflagError> {
    let mut walker = Walker::new(max_depth);
    schema.walk(&mut walker)?;
    Ok(walker.into_fields())
}

// --- Bind impls ---

macro_rules! leaf_bind {
    ($($ty:ty, $v:ident => $slot:expr);+ $(;)?) => {
        $(
            impl Bind for $ty {
                fn bind<'a>(
                    &'a mut self,
                    meta: FieldMeta,
                    walker: &mut Walker<'a>,
                ) -> Result<(), EnvflagError> {
                    let $v = self;
                    walker.leaf(meta, $slot)
                }
            }
        )+
    };
}

leaf_bind! {
    bool, v => Slot::Bool(v);
    i8, v => Slot::Int(IntSlot::I8(v));
    i16, v => Slot::Int(IntSlot::I16(v));
    i32, v => Slot::Int(IntSlot::I32(v));
    i64, v => Slot::Int(IntSlot::I64(v));
    isize, v => Slot::Int(IntSlot::Isize(v));
    u8, v => Slot::Uint(UintSlot::U8(v));
    u16, v => Slot::Uint(UintSlot::U16(v));
    u32, v => Slot::Uint(UintSlot::U32(v));
    u64, v => Slot::Uint(UintSlot::U64(v));
    usize, v => Slot::Uint(UintSlot::Usize(v));
    f32, v => Slot::Float(FloatSlot::F32(v));
    f64, v => Slot::Float(FloatSlot::F64(v));
    String, v => Slot::Str(v);
    Duration, v => Slot::Duration(v);
}

impl<T: Element> Bind for Vec<T> {
    fn bind<'a>(
        &'a mut self,
        meta: FieldMeta,
        walker: &mut Walker<'a>,
    ) -> Result<(), EnvflagError> {
        walker.leaf(meta, Slot::Sequence(self))
    }
}

/// Absent values are allocated with `T::default()` so they can be written.
impl<T: Bind + Default> Bind for Option<T> {
    fn bind<'a>(
        &'a mut self,
        meta: FieldMeta,
        walker: &mut Walker<'a>,
    ) -> Result<(), EnvflagError> {
        self.get_or_insert_with(T::default).bind(meta, walker)
    }
}

impl<T: Bind + ?Sized> Bind for Box<T> {
    fn bind<'a>(
        &'a mut self,
        meta: FieldMeta,
        walker: &mut Walker<'a>,
    ) -> Result<(), EnvflagError> {
        (**self).bind(meta, walker)
    }
}

impl<T: Schema + Default> Schema for Option<T> {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
        self.get_or_insert_with(T::default).walk(walker)
    }
}

impl<T: Schema + ?Sized> Schema for Box<T> {
    fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
        (**self).walk(walker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Chain, Embedded, Nested, TestConfig};
    use crate::types::Kind;

    fn keys<S: Schema>(schema: &mut S) -> Vec<String> {
        walk(schema, DEFAULT_MAX_DEPTH)
            .unwrap()
            .into_iter()
            .map(|f| f.key)
            .collect()
    }

    #[test]
    fn flat_fields_in_declaration_order() {
        let mut config = TestConfig::default();
        assert_eq!(
            keys(&mut config),
            vec!["TEST_STRING", "TEST_INT", "TEST_FLOAT", "PASS"]
        );
    }

    #[test]
    fn descriptors_carry_overrides() {
        let mut config = TestConfig::default();
        let fields = walk(&mut config, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(fields[1].meta.flag_override(), Some("testint"));
        assert_eq!(fields[1].meta.env_override(), None);
        assert_eq!(fields[1].slot.kind(), Kind::Int(64));
    }

    #[test]
    fn env_override_replaces_key_and_is_upper_cased() {
        let meta = FieldMeta::new("port").env("listen_port");
        assert_eq!(meta.env_override(), Some("LISTEN_PORT"));
        let walker = Walker::new(DEFAULT_MAX_DEPTH);
        assert_eq!(walker.key_for(&meta), "LISTEN_PORT");
    }

    #[test]
    fn empty_overrides_are_absent() {
        let meta = FieldMeta::new("port").env("").flag("").display("").help("");
        assert_eq!(meta, FieldMeta::new("port"));
    }

    #[test]
    fn anonymous_embedding_has_no_prefix() {
        let mut config = Embedded::default();
        assert_eq!(keys(&mut config), vec!["NAME", "X"]);
    }

    #[test]
    fn named_nesting_prefixes_children() {
        let mut config = Nested::default();
        assert_eq!(keys(&mut config), vec!["N_X", "N_INNER_DEPTH", "AFTER"]);
    }

    #[test]
    fn nested_writes_reach_caller_storage() {
        let mut config = Nested::default();
        {
            let mut fields = walk(&mut config, DEFAULT_MAX_DEPTH).unwrap();
            crate::value::parse_value("41", &mut fields[0].slot).unwrap();
        }
        assert_eq!(config.n.x, 41);
    }

    #[test]
    fn optional_records_are_allocated() {
        let mut config = Nested::default();
        assert!(config.n.inner.is_none());
        walk(&mut config, DEFAULT_MAX_DEPTH).unwrap();
        assert!(config.n.inner.is_some());
    }

    #[test]
    fn unbounded_recursion_is_reported_as_cyclic() {
        let mut config = Chain::default();
        let err = walk(&mut config, 4).unwrap_err();
        match err {
            EnvflagError::CyclicSchema { path, max_depth } => {
                assert_eq!(max_depth, 4);
                assert_eq!(path, "next.next.next.next.next");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_field_name_is_invalid() {
        struct Bad {
            value: bool,
        }
        impl Schema for Bad {
            fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
                walker.field(FieldMeta::new(""), &mut self.value)
            }
        }
        let err = walk(&mut Bad { value: false }, DEFAULT_MAX_DEPTH).unwrap_err();
        assert!(matches!(err, EnvflagError::InvalidSchema(_)));
    }
}
