//! Classification of raw driver cells into semantic kinds.

use serde::{Deserialize, Serialize};

use crate::types::{AggregateFunction, RawColumnValue, RawValue, SemanticKind, SourceTypeHint};

/// Widest signed integer the host treats as a plain `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IntegerWidth {
    #[default]
    Bits32,
    Bits64,
}

impl IntegerWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntegerWidth::Bits32 => 32,
            IntegerWidth::Bits64 => 64,
        }
    }

    fn fits(self, value: i64) -> bool {
        match self {
            IntegerWidth::Bits32 => i32::try_from(value).is_ok(),
            IntegerWidth::Bits64 => true,
        }
    }
}

impl TryFrom<u8> for IntegerWidth {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(IntegerWidth::Bits32),
            64 => Ok(IntegerWidth::Bits64),
            other => Err(format!("native integer width must be 32 or 64, got {}", other)),
        }
    }
}

impl From<IntegerWidth> for u8 {
    fn from(width: IntegerWidth) -> Self {
        match width {
            IntegerWidth::Bits32 => 32,
            IntegerWidth::Bits64 => 64,
        }
    }
}

/// How `AVG` over exact numeric input is classified. Engines disagree: some
/// keep the result exact, others widen to floating point internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateDecimalMode {
    #[default]
    Decimal,
    Float,
}

/// Per-adapter classification settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierOptions {
    pub native_integer_bits: IntegerWidth,
    pub aggregate_decimals: AggregateDecimalMode,
}

/// Maps raw cells to a [`SemanticKind`].
///
/// Declared type metadata wins whenever it is present. Only cells without a
/// usable hint are classified from their lexical form. Classification never
/// fails; anything unrecognizable is `Text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueClassifier {
    options: ClassifierOptions,
}

impl ValueClassifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    pub fn classify(&self, raw: &RawColumnValue) -> SemanticKind {
        if raw.value().is_null() {
            return SemanticKind::Null;
        }
        self.classify_hint(raw.hint(), raw.value())
    }

    fn classify_hint(&self, hint: &SourceTypeHint, value: &RawValue) -> SemanticKind {
        match hint {
            SourceTypeHint::Boolean => SemanticKind::Boolean,
            SourceTypeHint::Integer { bits, unsigned } => {
                // An unsigned column needs one more bit than its storage width.
                // Width 0 is unknown, so only the value decides.
                let needed = u32::from(*bits) + u32::from(*unsigned);
                if needed > self.options.native_integer_bits.bits() {
                    return SemanticKind::BigInteger;
                }
                // Loosely typed stores (SQLite INT affinity) hold values
                // wider than the declared type.
                match self.classify_lexical(value) {
                    SemanticKind::BigInteger => SemanticKind::BigInteger,
                    _ => SemanticKind::Integer,
                }
            }
            SourceTypeHint::Float { .. } => SemanticKind::Float,
            SourceTypeHint::Decimal { .. } => SemanticKind::Decimal,
            SourceTypeHint::Text { .. } => SemanticKind::Text,
            SourceTypeHint::Aggregate { function, input } => {
                match self.resolve_aggregate(*function, input) {
                    Some(resolved) => self.classify_hint(&resolved, value),
                    None => self.classify_lexical(value),
                }
            }
            SourceTypeHint::Other(_) | SourceTypeHint::Untyped => self.classify_lexical(value),
        }
    }

    /// Result type of an aggregate, or `None` when the input says nothing useful.
    fn resolve_aggregate(
        &self,
        function: AggregateFunction,
        input: &SourceTypeHint,
    ) -> Option<SourceTypeHint> {
        use AggregateFunction::*;

        match (function, input) {
            (Count, _) => Some(SourceTypeHint::Integer {
                bits: 64,
                unsigned: false,
            }),
            (Min | Max, SourceTypeHint::Aggregate { .. }) => None,
            (Min | Max, hint) => Some(hint.clone()),
            // Sums widen past the input's width by an engine-specific amount.
            (Sum, SourceTypeHint::Integer { .. }) => Some(SourceTypeHint::Integer {
                bits: 0,
                unsigned: false,
            }),
            (Sum, hint @ (SourceTypeHint::Float { .. } | SourceTypeHint::Decimal { .. })) => {
                Some(hint.clone())
            }
            (Avg, SourceTypeHint::Float { .. }) => Some(SourceTypeHint::Float { bits: 64 }),
            (Avg, SourceTypeHint::Integer { .. } | SourceTypeHint::Decimal { .. }) => {
                Some(match self.options.aggregate_decimals {
                    AggregateDecimalMode::Decimal => SourceTypeHint::Decimal {
                        precision: None,
                        scale: None,
                    },
                    AggregateDecimalMode::Float => SourceTypeHint::Float { bits: 64 },
                })
            }
            _ => None,
        }
    }

    fn classify_lexical(&self, value: &RawValue) -> SemanticKind {
        match value {
            RawValue::Null => SemanticKind::Null,
            RawValue::Bool(_) => SemanticKind::Boolean,
            RawValue::Int(i) => self.integer_kind(*i),
            RawValue::Float(_) => SemanticKind::Float,
            RawValue::Text(_) | RawValue::Bytes(_) => match value.lexical() {
                Some(text) => self.classify_literal(&text),
                None => SemanticKind::Text,
            },
        }
    }

    fn classify_literal(&self, text: &str) -> SemanticKind {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            return SemanticKind::Boolean;
        }
        match scan_number(text) {
            Some(NumberShape::Integer) => match text.parse::<i64>() {
                Ok(value) => self.integer_kind(value),
                Err(_) => SemanticKind::BigInteger,
            },
            Some(NumberShape::Decimal) => SemanticKind::Decimal,
            Some(NumberShape::Exponent) => SemanticKind::Float,
            None if is_special_float(text) => SemanticKind::Float,
            None => SemanticKind::Text,
        }
    }

    fn integer_kind(&self, value: i64) -> SemanticKind {
        if self.options.native_integer_bits.fits(value) {
            SemanticKind::Integer
        } else {
            SemanticKind::BigInteger
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberShape {
    /// `-12`
    Integer,
    /// `0.1`, `.5`, `3.`
    Decimal,
    /// `0.125e0`
    Exponent,
}

/// Recognizes SQL numeric literal syntax.
fn scan_number(text: &str) -> Option<NumberShape> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    let mut shape = NumberShape::Integer;
    if pos < bytes.len() && bytes[pos] == b'.' {
        shape = NumberShape::Decimal;
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        digits += pos - frac_start;
    }

    if digits == 0 {
        return None;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        shape = NumberShape::Exponent;
        pos += 1;
        if pos < bytes.len() && matches!(bytes[pos], b'+' | b'-') {
            pos += 1;
        }
        let exp_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exp_start {
            return None;
        }
    }

    (pos == bytes.len()).then_some(shape)
}

fn is_special_float(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    ["nan", "inf", "infinity"]
        .iter()
        .any(|special| unsigned.eq_ignore_ascii_case(special))
}
