mod hint;
mod kind;
mod normalized;
mod raw_value;
mod row;
mod sql_value;

pub use hint::{AggregateFunction, SourceTypeHint};
pub use kind::SemanticKind;
pub use normalized::{HostValue, NormalizedValue};
pub use raw_value::{RawColumnValue, RawValue};
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
