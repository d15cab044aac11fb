use std::fmt;

use serde::{Deserialize, Serialize};

/// The semantic family a fetched value belongs to, independent of how the
/// driver happened to represent it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticKind {
    Null,
    Boolean,
    /// Integer that fits the session's native integer width.
    Integer,
    /// Integer whose range exceeds the session's native integer width.
    BigInteger,
    Float,
    /// Fixed precision/scale number, always carried as exact text.
    Decimal,
    Text,
}

impl SemanticKind {
    /// Every kind, in declaration order.
    pub const ALL: [SemanticKind; 7] = [
        SemanticKind::Null,
        SemanticKind::Boolean,
        SemanticKind::Integer,
        SemanticKind::BigInteger,
        SemanticKind::Float,
        SemanticKind::Decimal,
        SemanticKind::Text,
    ];

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SemanticKind::Integer
                | SemanticKind::BigInteger
                | SemanticKind::Float
                | SemanticKind::Decimal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticKind::Null => "null",
            SemanticKind::Boolean => "boolean",
            SemanticKind::Integer => "integer",
            SemanticKind::BigInteger => "big_integer",
            SemanticKind::Float => "float",
            SemanticKind::Decimal => "decimal",
            SemanticKind::Text => "text",
        }
    }
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
