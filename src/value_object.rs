//! The contract every generated shape follows: structural equality, a fixed hash
//! combinator and a one-line rendering of the fields that are present.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;
use strum::AsRefStr;

/// A value that can sit in a shape field, either directly or as a list element.
pub trait Field: Clone + Debug {
    /// Value equality. Doubles compare by bit pattern with every NaN equal, so
    /// the relation stays reflexive.
    fn field_eq(&self, other: &Self) -> bool;

    /// Hash folded into the owning shape's hash. Equal values hash equal.
    fn hash_code(&self) -> i32;

    /// Writes the value the way it appears in a shape rendering.
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result;
}

/// A typed request or response shape.
pub trait ValueObject: Field + Default + Eq + Hash + Display + Send + Sync + 'static {
    /// Shape name as it appears in the API model.
    const SHAPE: &'static str;
    /// Field descriptors in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    fn field(name: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|d| d.name == name)
    }
}

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    Timestamp,
    Enum { name: &'static str, values: &'static [&'static str] },
    Structure(&'static str),
}

impl FieldKind {
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Enum { name, .. } => *name,
            FieldKind::Structure(name) => *name,
            other => other.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Member name, also the JSON key and the rendering label.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether the field holds an ordered list of `kind`.
    pub list: bool,
    pub doc: &'static str,
}

impl FieldDescriptor {
    /// `[Tag]` for lists, the bare type name otherwise.
    pub fn type_label(&self) -> String {
        if self.list {
            format!("[{}]", self.kind.type_name())
        } else {
            self.kind.type_name().to_string()
        }
    }
}

/// Folds field hashes as `31 * hash + field`, starting from 1; absent fields
/// contribute 0.
#[derive(Debug, Clone, Copy)]
pub struct HashCode(i32);

impl HashCode {
    pub const PRIME: i32 = 31;

    pub fn new() -> Self {
        HashCode(1)
    }

    pub fn field<T: Field>(self, value: &Option<T>) -> Self {
        let hash = value.as_ref().map_or(0, |v| v.hash_code());
        HashCode(self.0.wrapping_mul(Self::PRIME).wrapping_add(hash))
    }

    pub fn finish(self) -> i32 {
        self.0
    }
}

impl Default for HashCode {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares two optional fields; absent only equals absent.
pub fn field_eq<T: Field>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.field_eq(b),
        (None, None) => true,
        _ => false,
    }
}

/// 31-polynomial over UTF-16 code units, so string hashes match the ones other
/// SDKs compute for the same shapes.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn long_hash(v: i64) -> i32 {
    (v ^ ((v as u64) >> 32) as i64) as i32
}

/// Rejects an empty enum token; anything else is a usable token, known or not.
pub fn wire_token<'a>(enum_name: &str, token: &'a str) -> Result<&'a str> {
    if token.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{enum_name} needs a value")));
    }
    Ok(token)
}

/// Builder behind every shape's `Display`: `{Name: value,Name: value}`, present
/// fields only.
pub struct Rendering<'a, 'b> {
    f: &'a mut Formatter<'b>,
    result: fmt::Result,
    has_fields: bool,
}

pub fn render_struct<'a, 'b>(f: &'a mut Formatter<'b>) -> Rendering<'a, 'b> {
    let result = f.write_str("{");
    Rendering { f, result, has_fields: false }
}

impl<'a, 'b> Rendering<'a, 'b> {
    pub fn field<T: Field>(&mut self, name: &str, value: &Option<T>) -> &mut Self {
        if let (Some(value), Ok(())) = (value, self.result) {
            self.result = self.write_field(name, value);
        }
        self
    }

    fn write_field<T: Field>(&mut self, name: &str, value: &T) -> fmt::Result {
        if self.has_fields {
            self.f.write_str(",")?;
        }
        self.has_fields = true;
        write!(self.f, "{name}: ")?;
        value.render(self.f)
    }

    pub fn finish(&mut self) -> fmt::Result {
        self.result?;
        self.f.write_str("}")
    }
}

impl Field for String {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i32 {
        string_hash(self)
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl Field for i32 {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i32 {
        *self
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Field for i64 {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i32 {
        long_hash(*self)
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Field for f64 {
    fn field_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits() || (self.is_nan() && other.is_nan())
    }

    fn hash_code(&self) -> i32 {
        let bits = if self.is_nan() { f64::NAN.to_bits() } else { self.to_bits() };
        long_hash(bits as i64)
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Field for bool {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i32 {
        if *self {
            1231
        } else {
            1237
        }
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Field for DateTime<Utc> {
    fn field_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i32 {
        long_hash(self.timestamp_millis())
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl<T: Field> Field for Vec<T> {
    fn field_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.field_eq(b))
    }

    fn hash_code(&self) -> i32 {
        self.iter().fold(1i32, |h, v| h.wrapping_mul(31).wrapping_add(v.hash_code()))
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            v.render(f)?;
        }
        f.write_str("]")
    }
}
