//! Turns raw driver cells into [`NormalizedValue`]s under a [`CoercionPolicy`].
//!
//! The pipeline is always classify, resolve, materialize. A `NULL` cell
//! short-circuits to a null value before the policy is consulted.

use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::classifier::ValueClassifier;
use crate::error::{Result, SqlNormError};
use crate::policy::{CoercionPolicy, Materialization};
use crate::types::{
    HostValue, NormalizedValue, QueryResult, RawColumnValue, RawQueryResult,
    RawValue, SemanticKind,
};

/// Normalizes a single cell with the default classifier settings.
pub fn normalize(raw: &RawColumnValue, policy: &CoercionPolicy) -> Result<NormalizedValue> {
    let kind = ValueClassifier::default().classify(raw);
    materialize(kind, raw.value(), policy.resolve(kind))
}

/// A classifier and a policy bound together for one session.
///
/// Cheap to clone; the policy is shared, never mutated.
#[derive(Debug, Clone)]
pub struct Normalizer {
    classifier: ValueClassifier,
    policy: Arc<CoercionPolicy>,
}

impl Normalizer {
    pub fn new(classifier: ValueClassifier, policy: Arc<CoercionPolicy>) -> Self {
        Self { classifier, policy }
    }

    pub fn classifier(&self) -> &ValueClassifier {
        &self.classifier
    }

    pub fn policy(&self) -> &Arc<CoercionPolicy> {
        &self.policy
    }

    pub fn normalize(&self, raw: &RawColumnValue) -> Result<NormalizedValue> {
        let kind = self.classifier.classify(raw);
        let materialization = self.policy.resolve(kind);
        materialize(kind, raw.value(), materialization).map_err(|err| {
            tracing::warn!(
                %kind,
                %materialization,
                hint = %raw.hint(),
                error = %err,
                "failed to materialize value"
            );
            err
        })
    }

    /// Normalizes every cell of a driver result. The first failing cell
    /// aborts the whole result.
    pub fn normalize_result(&self, raw: RawQueryResult) -> Result<QueryResult> {
        let rows = raw
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.normalize(cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<Vec<NormalizedValue>>>>()?;
        Ok(QueryResult::new(raw.columns, rows))
    }
}

fn materialize(
    kind: SemanticKind,
    value: &RawValue,
    materialization: Materialization,
) -> Result<NormalizedValue> {
    if value.is_null() {
        return Ok(NormalizedValue::null());
    }

    let host = match materialization {
        Materialization::AsNativeNumber => native_number(kind, value)?,
        Materialization::AsExactText => HostValue::Text(exact_text(kind, value)),
        Materialization::AsTextAlways => {
            return Ok(NormalizedValue::new(
                SemanticKind::Text,
                HostValue::Text(exact_text(kind, value)),
            ));
        }
        Materialization::AsBoolean01 => HostValue::Int(i64::from(truth(kind, value)?)),
        Materialization::AsBooleanNative => HostValue::Bool(truth(kind, value)?),
    };
    Ok(NormalizedValue::new(kind, host))
}

/// Lexical text as fetched. Booleans have no portable lexical form across
/// drivers and are rendered as `1`/`0` when they read as a truth value.
/// Never fails.
fn exact_text(kind: SemanticKind, value: &RawValue) -> String {
    if kind == SemanticKind::Boolean {
        if let Ok(flag) = truth(kind, value) {
            return if flag { "1" } else { "0" }.to_string();
        }
    }
    value.render().into_owned()
}

fn native_number(kind: SemanticKind, value: &RawValue) -> Result<HostValue> {
    match kind {
        SemanticKind::Integer => {
            let parsed = exact_integer(kind, value)?;
            i64::try_from(&parsed).map(HostValue::Int).map_err(|_| {
                SqlNormError::unrepresentable(kind, value.render(), "exceeds 64-bit range")
            })
        }
        SemanticKind::BigInteger => exact_integer(kind, value).map(HostValue::BigInt),
        SemanticKind::Float => float(kind, value).map(HostValue::Float),
        _ => Err(SqlNormError::unrepresentable(
            kind,
            value.render(),
            "kind has no native number representation",
        )),
    }
}

/// Parses an integer without going through floating point. Integral values
/// written with a zero fraction (`9.0`, `9.000`) are accepted.
fn exact_integer(kind: SemanticKind, value: &RawValue) -> Result<BigInt> {
    let not_integer = || SqlNormError::unrepresentable(kind, value.render(), "not an integer");

    match value {
        RawValue::Int(i) => Ok(BigInt::from(*i)),
        RawValue::Bool(b) => Ok(BigInt::from(u8::from(*b))),
        RawValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
            // `{:.0}` prints every digit of an integral double.
            BigInt::from_str(&format!("{:.0}", f)).map_err(|_| not_integer())
        }
        RawValue::Float(_) | RawValue::Null => Err(not_integer()),
        RawValue::Text(_) | RawValue::Bytes(_) => {
            let text = value.lexical().ok_or_else(not_integer)?;
            let text = text.trim();
            let (negative, unsigned) = match text.as_bytes().first() {
                Some(b'-') => (true, &text[1..]),
                Some(b'+') => (false, &text[1..]),
                _ => (false, text),
            };
            let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
            if whole.is_empty()
                || !whole.bytes().all(|b| b.is_ascii_digit())
                || !fraction.bytes().all(|b| b == b'0')
            {
                return Err(not_integer());
            }
            let magnitude = BigInt::from_str(whole).map_err(|_| not_integer())?;
            Ok(if negative { -magnitude } else { magnitude })
        }
    }
}

fn float(kind: SemanticKind, value: &RawValue) -> Result<f64> {
    match value {
        RawValue::Float(f) => Ok(*f),
        RawValue::Int(i) => Ok(*i as f64),
        RawValue::Bool(b) => Ok(f64::from(u8::from(*b))),
        RawValue::Null => Err(SqlNormError::unrepresentable(kind, "NULL", "not a number")),
        RawValue::Text(_) | RawValue::Bytes(_) => {
            let text = value.lexical().unwrap_or_default();
            let text = text.trim();
            let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
            let negative = text.starts_with('-');
            if unsigned.eq_ignore_ascii_case("nan") {
                return Ok(f64::NAN);
            }
            if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
                return Ok(if negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                });
            }
            text.parse::<f64>()
                .map_err(|_| SqlNormError::unrepresentable(kind, text, "not a number"))
        }
    }
}

fn truth(kind: SemanticKind, value: &RawValue) -> Result<bool> {
    match value {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Int(i) => Ok(*i != 0),
        RawValue::Float(f) => Ok(*f != 0.0),
        RawValue::Null => Err(SqlNormError::unrepresentable(kind, "NULL", "not a truth value")),
        RawValue::Text(_) | RawValue::Bytes(_) => {
            let text = value.lexical().unwrap_or_default();
            let word = text.trim().to_ascii_lowercase();
            match word.as_str() {
                "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
                "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
                other => other.parse::<i64>().map(|i| i != 0).map_err(|_| {
                    SqlNormError::unrepresentable(kind, &*text, "not a truth value")
                }),
            }
        }
    }
}
