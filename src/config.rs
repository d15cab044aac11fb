//! Session normalization settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierOptions, ValueClassifier};
use crate::error::{Result, SqlNormError};
use crate::normalizer::Normalizer;
use crate::policy::{CoercionPolicy, PolicyOptions};

/// Everything a session needs to normalize results, supplied once when the
/// client is constructed.
///
/// ```
/// use sqlnorm::config::NormalizationConfig;
///
/// let config = NormalizationConfig::from_json(
///     r#"{ "policy": { "boolean_as_int": true }, "classifier": { "native_integer_bits": 64 } }"#,
/// )
/// .unwrap();
/// assert!(config.policy.boolean_as_int);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizationConfig {
    pub policy: PolicyOptions,
    pub classifier: ClassifierOptions,
}

impl NormalizationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SqlNormError::configuration(format!("invalid normalization config: {}", e)))
    }

    /// Resolves the policy and pairs it with the configured classifier.
    /// Fails on an invalid policy before any value is normalized.
    pub fn build(&self) -> Result<Normalizer> {
        let policy = CoercionPolicy::from_options(&self.policy)?;
        tracing::debug!(
            stringify_all = self.policy.stringify_all,
            native_numbers = self.policy.native_numbers,
            boolean_as_int = self.policy.boolean_as_int,
            overrides = self.policy.overrides.len(),
            native_integer_bits = self.classifier.native_integer_bits.bits(),
            "resolved coercion policy"
        );
        Ok(Normalizer::new(
            ValueClassifier::new(self.classifier),
            Arc::new(policy),
        ))
    }
}
