//! Typed storage slots and the text-to-value parser.
//!
//! A [`Slot`] is a mutable reference into the caller's configuration record,
//! tagged with the field's semantic type. [`parse_value`] turns flag or
//! environment text into that type and writes it through the slot, so parsing
//! the command line lands directly in caller storage.
//!
//! Types outside the built-in set opt in through [`Decode`], whose hooks are
//! tried in a fixed order before any built-in parsing would apply.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::time::Duration;

use crate::duration::{format_duration, parse_duration};
use crate::error::{BoxError, ValueError};
use crate::types::Kind;

/// A writable reference to one configurable field.
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(IntSlot<'a>),
    Uint(UintSlot<'a>),
    Float(FloatSlot<'a>),
    Str(&'a mut String),
    Duration(&'a mut Duration),
    Sequence(&'a mut dyn Sequence),
    Custom(&'a mut dyn Decode),
}

pub enum IntSlot<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
}

pub enum UintSlot<'a> {
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
}

pub enum FloatSlot<'a> {
    F32(&'a mut f32),
    F64(&'a mut f64),
}

/// Run `$body` with `$v` bound to the inner reference of an [`IntSlot`].
macro_rules! with_int {
    ($slot:expr, $v:ident => $body:expr) => {
        match $slot {
            $crate::value::IntSlot::I8($v) => $body,
            $crate::value::IntSlot::I16($v) => $body,
            $crate::value::IntSlot::I32($v) => $body,
            $crate::value::IntSlot::I64($v) => $body,
            $crate::value::IntSlot::Isize($v) => $body,
        }
    };
}

/// Run `$body` with `$v` bound to the inner reference of a [`UintSlot`].
macro_rules! with_uint {
    ($slot:expr, $v:ident => $body:expr) => {
        match $slot {
            $crate::value::UintSlot::U8($v) => $body,
            $crate::value::UintSlot::U16($v) => $body,
            $crate::value::UintSlot::U32($v) => $body,
            $crate::value::UintSlot::U64($v) => $body,
            $crate::value::UintSlot::Usize($v) => $body,
        }
    };
}

pub(crate) use with_int;
pub(crate) use with_uint;

fn bits_of<T>(_: &T) -> u32 {
    (std::mem::size_of::<T>() * 8) as u32
}

impl Slot<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Slot::Bool(_) => Kind::Bool,
            Slot::Int(s) => with_int!(s, v => Kind::Int(bits_of(&**v))),
            Slot::Uint(s) => with_uint!(s, v => Kind::Uint(bits_of(&**v))),
            Slot::Float(FloatSlot::F32(_)) => Kind::Float(32),
            Slot::Float(FloatSlot::F64(_)) => Kind::Float(64),
            Slot::Str(_) => Kind::String,
            Slot::Duration(_) => Kind::Duration,
            Slot::Sequence(seq) => seq.kind(),
            Slot::Custom(_) => Kind::Custom,
        }
    }

    /// The current value in the same textual grammar [`parse_value`] accepts.
    pub fn render(&self) -> String {
        match self {
            Slot::Bool(v) => v.to_string(),
            Slot::Int(s) => with_int!(s, v => v.to_string()),
            Slot::Uint(s) => with_uint!(s, v => v.to_string()),
            Slot::Float(FloatSlot::F32(v)) => v.to_string(),
            Slot::Float(FloatSlot::F64(v)) => v.to_string(),
            Slot::Str(v) => v.to_string(),
            Slot::Duration(v) => format_duration(v),
            Slot::Sequence(seq) => seq.render(),
            Slot::Custom(target) => target.to_text(),
        }
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind(), self.render())
    }
}

/// Parse `text` into the slot's semantic type and store it.
///
/// The slot is only written once the whole text has parsed, so a failure
/// leaves the previous value in place.
pub fn parse_value(text: &str, slot: &mut Slot<'_>) -> Result<(), ValueError> {
    match slot {
        Slot::Bool(v) => **v = parse_bool(text)?,
        Slot::Int(s) => with_int!(s, v => **v = parse_int(text)?),
        Slot::Uint(s) => with_uint!(s, v => **v = parse_uint(text)?),
        Slot::Float(FloatSlot::F32(v)) => **v = parse_float(text)?,
        Slot::Float(FloatSlot::F64(v)) => **v = parse_float(text)?,
        Slot::Str(v) => **v = text.to_string(),
        Slot::Duration(v) => **v = parse_duration(text)?,
        Slot::Sequence(seq) => seq.populate(text)?,
        Slot::Custom(target) => decode_custom(text, &mut **target)?,
    }
    Ok(())
}

// --- Capabilities ---

/// Text decoding hooks for types outside the built-in set.
///
/// Each hook returns `None` when the type does not support it. The parser
/// tries them in declaration order and uses the first one that answers:
/// `decode`, `set`, `unmarshal_text`, then `unmarshal_binary` (which receives
/// the raw bytes of the text).
///
/// ```ignore
/// #[derive(Default)]
/// struct Level(u8);
///
/// impl Decode for Level {
///     fn decode(&mut self, text: &str) -> Option<Result<(), BoxError>> {
///         Some(match text {
///             "low" => { self.0 = 1; Ok(()) }
///             "high" => { self.0 = 9; Ok(()) }
///             other => Err(format!("unknown level {other}").into()),
///         })
///     }
/// }
/// ```
pub trait Decode {
    fn decode(&mut self, _text: &str) -> Option<Result<(), BoxError>> {
        None
    }

    fn set(&mut self, _text: &str) -> Option<Result<(), BoxError>> {
        None
    }

    fn unmarshal_text(&mut self, _text: &[u8]) -> Option<Result<(), BoxError>> {
        None
    }

    fn unmarshal_binary(&mut self, _data: &[u8]) -> Option<Result<(), BoxError>> {
        None
    }

    /// Textual form shown as the flag default. Empty when not rendered.
    fn to_text(&self) -> String {
        String::new()
    }
}

pub fn decode_custom(text: &str, target: &mut dyn Decode) -> Result<(), ValueError> {
    target
        .decode(text)
        .or_else(|| target.set(text))
        .or_else(|| target.unmarshal_text(text.as_bytes()))
        .or_else(|| target.unmarshal_binary(text.as_bytes()))
        .ok_or_else(|| ValueError::NoDecoder(text.to_string()))?
        .map_err(ValueError::Custom)
}

/// Decode a fresh `T` from text. Handy for implementing [`Element`] on a
/// custom type so it can appear in comma-separated sequences.
pub fn decode_element<T: Decode + Default>(text: &str) -> Result<T, ValueError> {
    let mut value = T::default();
    decode_custom(text, &mut value)?;
    Ok(value)
}

// --- Sequences ---

/// An element type of a comma-separated sequence field.
pub trait Element: Sized {
    fn parse_element(text: &str) -> Result<Self, ValueError>;

    fn render_element(&self) -> String;

    /// Split `raw` on commas and parse every element. Blank input is empty.
    fn collect(raw: &str) -> Result<Vec<Self>, ValueError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',').map(Self::parse_element).collect()
    }

    fn join(items: &[Self]) -> String {
        items
            .iter()
            .map(Self::render_element)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn is_bytes() -> bool {
        false
    }
}

/// Type-erased view of a `Vec<T: Element>` field.
pub trait Sequence {
    /// Replace the contents with the elements parsed from `raw`.
    fn populate(&mut self, raw: &str) -> Result<(), ValueError>;

    fn render(&self) -> String;

    fn kind(&self) -> Kind;
}

impl<T: Element> Sequence for Vec<T> {
    fn populate(&mut self, raw: &str) -> Result<(), ValueError> {
        *self = T::collect(raw)?;
        Ok(())
    }

    fn render(&self) -> String {
        T::join(self)
    }

    fn kind(&self) -> Kind {
        if T::is_bytes() {
            Kind::Bytes
        } else {
            Kind::Sequence
        }
    }
}

macro_rules! numeric_element {
    ($parse:ident => $($ty:ty),+) => {
        $(
            impl Element for $ty {
                fn parse_element(text: &str) -> Result<Self, ValueError> {
                    $parse(text)
                }

                fn render_element(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

numeric_element!(parse_int => i8, i16, i32, i64, isize);
numeric_element!(parse_uint => u16, u32, u64, usize);
numeric_element!(parse_float => f32, f64);

/// `Vec<u8>` is a byte sequence: the text's bytes are taken as-is.
impl Element for u8 {
    fn parse_element(text: &str) -> Result<Self, ValueError> {
        parse_uint(text)
    }

    fn render_element(&self) -> String {
        self.to_string()
    }

    fn collect(raw: &str) -> Result<Vec<Self>, ValueError> {
        Ok(raw.as_bytes().to_vec())
    }

    fn join(items: &[Self]) -> String {
        String::from_utf8_lossy(items).into_owned()
    }

    fn is_bytes() -> bool {
        true
    }
}

impl Element for bool {
    fn parse_element(text: &str) -> Result<Self, ValueError> {
        parse_bool(text)
    }

    fn render_element(&self) -> String {
        self.to_string()
    }
}

impl Element for String {
    fn parse_element(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }

    fn render_element(&self) -> String {
        self.clone()
    }
}

impl Element for Duration {
    fn parse_element(text: &str) -> Result<Self, ValueError> {
        parse_duration(text)
    }

    fn render_element(&self) -> String {
        format_duration(self)
    }
}

// --- Built-in grammars ---

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::syntax("bool", text)),
    }
}

/// Signed integer with an optional base prefix (`0x`, `0o`, `0b`, or a
/// leading `0` for octal) and `_` digit separators, range-checked against `T`.
pub fn parse_int<T: TryFrom<i128>>(text: &str) -> Result<T, ValueError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = magnitude("int", text, digits)?;
    let magnitude = i128::try_from(magnitude).map_err(|_| ValueError::range("int", text))?;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| ValueError::range("int", text))
}

/// Unsigned counterpart of [`parse_int`]. A sign other than `+` is rejected.
pub fn parse_uint<T: TryFrom<u128>>(text: &str) -> Result<T, ValueError> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    let magnitude = magnitude("uint", text, digits)?;
    T::try_from(magnitude).map_err(|_| ValueError::range("uint", text))
}

pub fn parse_float<T: FromStr>(text: &str) -> Result<T, ValueError> {
    text.parse().map_err(|_| ValueError::syntax("float", text))
}

fn magnitude(kind: &'static str, text: &str, digits: &str) -> Result<u128, ValueError> {
    let prefixed = |lower: &str, upper: &str| {
        digits
            .strip_prefix(lower)
            .or_else(|| digits.strip_prefix(upper))
    };
    let (radix, body) = if let Some(body) = prefixed("0x", "0X") {
        (16, body)
    } else if let Some(body) = prefixed("0b", "0B") {
        (2, body)
    } else if let Some(body) = prefixed("0o", "0O") {
        (8, body)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    let misplaced_separator =
        body.ends_with('_') || body.contains("__") || (radix == 10 && body.starts_with('_'));
    let cleaned = body.replace('_', "");
    if misplaced_separator || cleaned.is_empty() || cleaned.starts_with(['+', '-']) {
        return Err(ValueError::syntax(kind, text));
    }

    u128::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ValueError::range(kind, text),
        _ => ValueError::syntax(kind, text),
    })
}
