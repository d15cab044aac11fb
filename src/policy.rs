//! Session-wide choice of host representation for each semantic kind.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqlNormError};
use crate::types::SemanticKind;

/// How values of one semantic kind are handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialization {
    /// Exact native number: `i64`/`BigInt` for integers, `f64` for floats.
    AsNativeNumber,
    /// The value's own lexical text, never reformatted.
    AsExactText,
    /// Booleans as integer `0`/`1`.
    AsBoolean01,
    /// Booleans as `bool`.
    AsBooleanNative,
    /// Text for any kind; the reported kind becomes `Text`.
    AsTextAlways,
}

impl Materialization {
    pub fn as_str(self) -> &'static str {
        match self {
            Materialization::AsNativeNumber => "as_native_number",
            Materialization::AsExactText => "as_exact_text",
            Materialization::AsBoolean01 => "as_boolean01",
            Materialization::AsBooleanNative => "as_boolean_native",
            Materialization::AsTextAlways => "as_text_always",
        }
    }
}

impl fmt::Display for Materialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documented defaults. `Null` never reaches materialization but is mapped
/// anyway so that every policy is total.
const DEFAULT_RULES: [Materialization; 7] = [
    Materialization::AsExactText,     // Null
    Materialization::AsBooleanNative, // Boolean
    Materialization::AsNativeNumber,  // Integer
    Materialization::AsNativeNumber,  // BigInteger
    Materialization::AsNativeNumber,  // Float
    Materialization::AsExactText,     // Decimal
    Materialization::AsExactText,     // Text
];

/// The enumerated switches a session is configured with.
///
/// Resolution order: defaults, then `native_numbers`, then `boolean_as_int`,
/// then per-kind `overrides`, and finally `stringify_all`, which wins over
/// everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOptions {
    /// Every kind becomes exact text.
    pub stringify_all: bool,
    /// Integers, big integers and floats as native numbers. When off they
    /// become exact text.
    pub native_numbers: bool,
    /// Booleans as `0`/`1` instead of `bool`.
    pub boolean_as_int: bool,
    pub overrides: BTreeMap<SemanticKind, Materialization>,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            stringify_all: false,
            native_numbers: true,
            boolean_as_int: false,
            overrides: BTreeMap::new(),
        }
    }
}

/// A total, immutable mapping from [`SemanticKind`] to [`Materialization`].
///
/// A policy is fixed for the lifetime of the session that owns it. To change
/// behavior, build a new policy and hand it to a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionPolicy {
    rules: [Materialization; 7],
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl CoercionPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn from_options(options: &PolicyOptions) -> Result<Self> {
        let mut rules: BTreeMap<SemanticKind, Materialization> = SemanticKind::ALL
            .into_iter()
            .zip(DEFAULT_RULES)
            .collect();

        if !options.native_numbers {
            for kind in [
                SemanticKind::Integer,
                SemanticKind::BigInteger,
                SemanticKind::Float,
            ] {
                rules.insert(kind, Materialization::AsExactText);
            }
        }
        if options.boolean_as_int {
            rules.insert(SemanticKind::Boolean, Materialization::AsBoolean01);
        }
        rules.extend(options.overrides.iter().map(|(k, m)| (*k, *m)));
        if options.stringify_all {
            for rule in rules.values_mut() {
                *rule = Materialization::AsExactText;
            }
        }

        Self::from_map(&rules)
    }

    /// Builds a policy from an explicit map. Every kind must be present and
    /// mapped to a materialization that can represent it.
    pub fn from_map(map: &BTreeMap<SemanticKind, Materialization>) -> Result<Self> {
        let mut rules = DEFAULT_RULES;
        for kind in SemanticKind::ALL {
            let materialization = map.get(&kind).copied().ok_or_else(|| {
                SqlNormError::configuration(format!(
                    "no materialization configured for {} values",
                    kind
                ))
            })?;
            check_compatible(kind, materialization)?;
            rules[kind as usize] = materialization;
        }
        Ok(Self { rules })
    }

    pub fn resolve(&self, kind: SemanticKind) -> Materialization {
        self.rules[kind as usize]
    }
}

fn check_compatible(kind: SemanticKind, materialization: Materialization) -> Result<()> {
    use Materialization::*;

    match (kind, materialization) {
        (_, AsExactText | AsTextAlways) | (SemanticKind::Null, _) => Ok(()),
        (SemanticKind::Boolean, AsBoolean01 | AsBooleanNative) => Ok(()),
        (SemanticKind::Integer | SemanticKind::BigInteger | SemanticKind::Float, AsNativeNumber) => {
            Ok(())
        }
        (SemanticKind::Decimal, AsNativeNumber) => Err(SqlNormError::configuration(
            "decimal values have no exact native number; use as_exact_text",
        )),
        (kind, materialization) => Err(SqlNormError::configuration(format!(
            "{} cannot materialize {} values",
            materialization, kind
        ))),
    }
}

/// Explicit kind-by-kind construction. `build` fails unless every kind was
/// mapped.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    rules: BTreeMap<SemanticKind, Materialization>,
}

impl PolicyBuilder {
    pub fn map(mut self, kind: SemanticKind, materialization: Materialization) -> Self {
        self.rules.insert(kind, materialization);
        self
    }

    pub fn build(self) -> Result<CoercionPolicy> {
        CoercionPolicy::from_map(&self.rules)
    }
}
