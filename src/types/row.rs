use crate::error::{Result, SqlNormError};

use super::{NormalizedValue, RawColumnValue};

/// Driver-agnostic raw result from a database query.
/// Each cell carries the declared type of its column.
#[derive(Debug, Clone)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of raw cells in column order
    pub rows: Vec<Vec<RawColumnValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawColumnValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// A single normalized row, accessed by column name or position.
///
/// Values stay in column order. Duplicate names (`SELECT 1, 1`) keep every
/// value; lookup by name returns the first.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<(String, NormalizedValue)>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub(crate) fn new(columns: &[String], values: Vec<NormalizedValue>) -> Self {
        let values = columns
            .iter()
            .zip(values)
            .map(|(col, val)| (col.clone(), val))
            .collect();
        Self { values }
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Result<&NormalizedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| SqlNormError::ColumnNotFound(column.to_string()))
    }

    /// Gets a value by its position in the select list.
    pub fn get_at(&self, index: usize) -> Option<&NormalizedValue> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// Returns all column names in this row, in order.
    pub fn columns(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more normalized rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Builds a result from already normalized rows in column order.
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<NormalizedValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| Row::new(&columns, values))
            .collect();
        Self { columns, rows }
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        let actual = self.rows.len();
        let mut rows = self.rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            _ => Err(SqlNormError::UnexpectedRowCount {
                expected: 1,
                actual,
            }),
        }
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HostValue, SemanticKind};

    fn int(value: i64) -> NormalizedValue {
        NormalizedValue::new(SemanticKind::Integer, HostValue::Int(value))
    }

    fn text(value: &str) -> NormalizedValue {
        NormalizedValue::new(SemanticKind::Text, HostValue::Text(value.to_string()))
    }

    #[test]
    fn test_row_get() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let row = Row::new(&columns, vec![int(1), text("John")]);

        assert_eq!(row.get("id").unwrap().as_i64(), Some(1));
        assert_eq!(row.get("name").unwrap().as_str(), Some("John"));
        assert!(row.get("missing").is_err());
    }

    #[test]
    fn test_row_keeps_duplicate_columns() {
        let columns = vec!["?column?".to_string(), "?column?".to_string()];
        let row = Row::new(&columns, vec![int(1), int(2)]);

        assert_eq!(row.len(), 2);
        assert_eq!(row.columns(), ["?column?", "?column?"]);
        assert_eq!(row.get("?column?").unwrap().as_i64(), Some(1));
        assert_eq!(row.get_at(1).unwrap().as_i64(), Some(2));
        assert!(row.get_at(2).is_none());
    }

    #[test]
    fn test_query_result_single_row() {
        let result = QueryResult::new(vec!["id".to_string()], vec![vec![int(1)]]);
        let row = result.single_row().unwrap();
        assert_eq!(row.get("id").unwrap(), &int(1));
    }

    #[test]
    fn test_query_result_single_row_error_on_empty() {
        let result = QueryResult::new(vec!["id".to_string()], vec![]);
        let err = result.single_row().unwrap_err();
        match err {
            SqlNormError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }

    #[test]
    fn test_query_result_single_row_error_on_multiple() {
        let result = QueryResult::new(vec!["id".to_string()], vec![vec![int(1)], vec![int(2)]]);
        let err = result.single_row().unwrap_err();
        match err {
            SqlNormError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }
}
