use num_bigint::BigInt;

use super::SemanticKind;

/// A value in its final host representation.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    Text(String),
}

/// The value handed to callers after normalization, together with the
/// semantic kind it was materialized as.
///
/// For a given cell, hint and policy the same `NormalizedValue` is produced
/// every time.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedValue {
    kind: SemanticKind,
    value: HostValue,
}

impl NormalizedValue {
    pub fn new(kind: SemanticKind, value: HostValue) -> Self {
        Self { kind, value }
    }

    pub fn null() -> Self {
        Self::new(SemanticKind::Null, HostValue::Null)
    }

    pub fn kind(&self) -> SemanticKind {
        self.kind
    }

    pub fn value(&self) -> &HostValue {
        &self.value
    }

    pub fn into_value(self) -> HostValue {
        self.value
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, HostValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            HostValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            HostValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<&BigInt> {
        match &self.value {
            HostValue::BigInt(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            HostValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            HostValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
