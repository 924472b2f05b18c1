#[cfg(test)]
pub mod test {
    //! Hand-written schemas shaped like `#[derive(Schema)]` output, so unit
    //! tests do not depend on the proc-macro crate.

    use std::time::Duration;

    use crate::error::{BoxError, EnvflagError};
    use crate::schema::{Bind, FieldMeta, Schema, Walker};
    use crate::types::Embedding;
    use crate::value::{Decode, Slot};

    macro_rules! named_record {
        ($ty:ty) => {
            impl Bind for $ty {
                fn bind<'a>(
                    &'a mut self,
                    meta: FieldMeta,
                    walker: &mut Walker<'a>,
                ) -> Result<(), EnvflagError> {
                    walker.nest(meta, Embedding::Named, self)
                }
            }
        };
    }

    /// `{ test_string, test_int envflag(flag = "testint"), test_float envflag(flag = "testfloat"), pass }`
    #[derive(Debug, Default, PartialEq)]
    pub struct TestConfig {
        pub test_string: String,
        pub test_int: i64,
        pub test_float: f64,
        pub pass: bool,
    }

    impl Schema for TestConfig {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("test_string"), &mut self.test_string)?;
            walker.field(FieldMeta::new("test_int").flag("testint"), &mut self.test_int)?;
            walker.field(FieldMeta::new("test_float").flag("testfloat"), &mut self.test_float)?;
            walker.field(FieldMeta::new("pass"), &mut self.pass)?;
            Ok(())
        }
    }

    /// `{ a envflag(flag = "x"), b envflag(flag = "x") }`
    #[derive(Debug, Default, PartialEq)]
    pub struct Clash {
        pub a: i64,
        pub b: i64,
    }

    impl Schema for Clash {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("a").flag("x"), &mut self.a)?;
            walker.field(FieldMeta::new("b").flag("x"), &mut self.b)
        }
    }

    /// `{ a, b envflag(flag = "two words") }`
    #[derive(Debug, Default, PartialEq)]
    pub struct Unusable {
        pub a: i64,
        pub b: i64,
    }

    impl Schema for Unusable {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("a"), &mut self.a)?;
            walker.field(FieldMeta::new("b").flag("two words"), &mut self.b)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Base {
        pub x: i64,
    }

    impl Schema for Base {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("x"), &mut self.x)
        }
    }

    /// `{ name, #[envflag(flatten)] base: Base }`
    #[derive(Debug, Default, PartialEq)]
    pub struct Embedded {
        pub name: String,
        pub base: Base,
    }

    impl Schema for Embedded {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("name"), &mut self.name)?;
            walker.nest(FieldMeta::new("base"), Embedding::Anonymous, &mut self.base)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Deep {
        pub depth: u32,
    }

    impl Schema for Deep {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("depth"), &mut self.depth)
        }
    }

    named_record!(Deep);

    #[derive(Debug, Default, PartialEq)]
    pub struct Inner {
        pub x: i64,
        pub inner: Option<Deep>,
    }

    impl Schema for Inner {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("x"), &mut self.x)?;
            walker.field(FieldMeta::new("inner"), &mut self.inner)
        }
    }

    named_record!(Inner);

    /// `{ n: Inner, after }`
    #[derive(Debug, Default, PartialEq)]
    pub struct Nested {
        pub n: Inner,
        pub after: bool,
    }

    impl Schema for Nested {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("n"), &mut self.n)?;
            walker.field(FieldMeta::new("after"), &mut self.after)
        }
    }

    /// Self-referential through `Option<Box<_>>`; walking it never ends.
    #[derive(Debug, Default)]
    pub struct Chain {
        pub value: i32,
        pub next: Option<Box<Chain>>,
    }

    impl Schema for Chain {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("value"), &mut self.value)?;
            walker.nest(FieldMeta::new("next"), Embedding::Named, &mut self.next)
        }
    }

    /// One field of every built-in kind, with a mix of overrides.
    #[derive(Debug, Default, PartialEq)]
    pub struct AllKinds {
        pub enabled: bool,
        pub offset: i8,
        pub retries: u32,
        pub ratio: f32,
        pub host: String,
        pub timeout: Duration,
        pub ports: Vec<u16>,
        pub secret: Vec<u8>,
        pub level: Level,
    }

    impl Schema for AllKinds {
        fn walk<'a>(&'a mut self, walker: &mut Walker<'a>) -> Result<(), EnvflagError> {
            walker.field(FieldMeta::new("enabled"), &mut self.enabled)?;
            walker.field(FieldMeta::new("offset"), &mut self.offset)?;
            walker.field(FieldMeta::new("retries").env("max_retries"), &mut self.retries)?;
            walker.field(FieldMeta::new("ratio").display("sampleRatio"), &mut self.ratio)?;
            walker.field(FieldMeta::new("host").help("Host to bind"), &mut self.host)?;
            walker.field(FieldMeta::new("timeout"), &mut self.timeout)?;
            walker.field(FieldMeta::new("ports"), &mut self.ports)?;
            walker.field(FieldMeta::new("secret"), &mut self.secret)?;
            walker.leaf(FieldMeta::new("level"), Slot::Custom(&mut self.level))
        }
    }

    /// Decodes `low` / `high` through the text hook.
    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    pub enum Level {
        #[default]
        Unset,
        Low,
        High,
    }

    impl Decode for Level {
        fn unmarshal_text(&mut self, text: &[u8]) -> Option<Result<(), BoxError>> {
            Some(match text {
                b"low" => {
                    *self = Level::Low;
                    Ok(())
                }
                b"high" => {
                    *self = Level::High;
                    Ok(())
                }
                _ => Err("expected low or high".into()),
            })
        }

        fn to_text(&self) -> String {
            match self {
                Level::Unset => String::new(),
                Level::Low => "low".into(),
                Level::High => "high".into(),
            }
        }
    }
}
