//! sqlnorm - driver-agnostic type normalization for SQL result values
//!
//! Drivers disagree about what a fetched cell looks like: one hands back a
//! boolean column as `1`, another as `true`; one returns a decimal as text,
//! another as a float. sqlnorm classifies every cell from its declared column
//! type and materializes it according to a session-wide policy, so callers
//! see the same host types no matter which backend produced them.
//!
//! # Example
//! ```ignore
//! use sqlnorm::{NormalizationConfig, SqlNormClient};
//!
//! let config = NormalizationConfig::from_json(r#"{ "policy": { "boolean_as_int": true } }"#)?;
//! let client = SqlNormClient::connect("postgres://localhost/mydb", &config).await?;
//!
//! let row = client
//!     .query("SELECT col_decimal, col_bool FROM test", &[])
//!     .await?
//!     .single_row()?;
//!
//! assert_eq!(row.get("col_decimal")?.as_str(), Some("0.1"));
//! assert_eq!(row.get("col_bool")?.as_i64(), Some(1));
//! ```

pub mod classifier;
pub mod config;
pub mod drivers;
pub mod error;
pub mod normalizer;
pub mod policy;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use classifier::{AggregateDecimalMode, ClassifierOptions, IntegerWidth, ValueClassifier};
pub use client::SqlNormClient;
pub use config::NormalizationConfig;
pub use error::{Result, SqlNormError};
pub use normalizer::{normalize, Normalizer};
pub use policy::{CoercionPolicy, Materialization, PolicyBuilder, PolicyOptions};
pub use traits::DatabaseDriver;
pub use types::{
    AggregateFunction, HostValue, NormalizedValue, QueryResult, RawColumnValue, RawQueryResult,
    RawValue, Row, SemanticKind, SourceTypeHint, SqlValue,
};
