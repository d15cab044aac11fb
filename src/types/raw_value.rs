use std::borrow::Cow;

use super::SourceTypeHint;

/// A cell exactly as a driver produced it, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Textual wire form. Drivers should prefer this for decimal and large
    /// integer columns so no precision is lost before normalization.
    Text(String),
    Bytes(Vec<u8>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Returns the value's textual form when it has one: text, or bytes
    /// that are valid UTF-8.
    pub fn lexical(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            RawValue::Bytes(b) => std::str::from_utf8(b).ok().map(Cow::Borrowed),
            _ => None,
        }
    }

    /// Renders the value as text for diagnostics and text materialization.
    /// Floats use the shortest representation that round-trips.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            RawValue::Null => Cow::Borrowed("NULL"),
            RawValue::Bool(true) => Cow::Borrowed("1"),
            RawValue::Bool(false) => Cow::Borrowed("0"),
            RawValue::Int(i) => Cow::Owned(i.to_string()),
            RawValue::Float(f) => Cow::Owned(render_float(*f)),
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Bytes(b) => match std::str::from_utf8(b) {
                Ok(text) => Cow::Borrowed(text),
                Err(_) => Cow::Owned(render_hex(b)),
            },
        }
    }
}

/// Opaque bytes in PostgreSQL's `bytea` hex output form, `\x0aff`.
fn render_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::from("\\x"), |mut text, byte| {
            text.push_str(&format!("{:02x}", byte));
            text
        })
}

fn render_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        value.to_string()
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => RawValue::Null,
        }
    }
}

/// One fetched cell paired with the type its column declared.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumnValue {
    value: RawValue,
    hint: SourceTypeHint,
}

impl RawColumnValue {
    pub fn new(value: impl Into<RawValue>, hint: SourceTypeHint) -> Self {
        Self {
            value: value.into(),
            hint,
        }
    }

    /// A cell with no declared type, e.g. the result of `SELECT 0.1`.
    pub fn untyped(value: impl Into<RawValue>) -> Self {
        Self::new(value, SourceTypeHint::Untyped)
    }

    pub fn null(hint: SourceTypeHint) -> Self {
        Self::new(RawValue::Null, hint)
    }

    pub fn value(&self) -> &RawValue {
        &self.value
    }

    pub fn hint(&self) -> &SourceTypeHint {
        &self.hint
    }
}
