use std::sync::Arc;

use num_bigint::BigInt;
use sqlnorm::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use sqlnorm::error::SqlNormError;
use sqlnorm::traits::DatabaseDriver;
use sqlnorm::types::{
    AggregateFunction, HostValue, RawQueryResult, RawValue, SemanticKind, SourceTypeHint, SqlValue,
};
use sqlnorm::{NormalizationConfig, SqlNormClient};

const COLUMNS: [(&str, &str); 6] = [
    ("col_bool", "BOOLEAN"),
    ("col_float", "FLOAT"),
    ("col_decimal", "DECIMAL(2, 1)"),
    ("col_int", "INT"),
    ("col_bigint", "BIGINT"),
    ("col_string", "VARCHAR(255)"),
];

const SELECT_ALL: &str =
    "SELECT col_bool, col_float, col_decimal, col_int, col_bigint, col_string FROM test";

/// The row `(TRUE, 0.125, 0.1, 9, 2147483648, 'foobar')` the way different
/// backends hand it over.
fn backend_rows() -> Vec<(&'static str, RawQueryResult)> {
    let build = |values: [RawValue; 6]| {
        InMemoryTestResponseBuilder::new()
            .columns(&COLUMNS)
            .row(values)
            .build()
    };

    vec![
        // Native PostgreSQL: real booleans, exact NUMERIC text.
        (
            "postgres",
            build([
                RawValue::Bool(true),
                RawValue::Float(0.125),
                RawValue::from("0.1"),
                RawValue::Int(9),
                RawValue::Int(2147483648),
                RawValue::from("foobar"),
            ]),
        ),
        // MySQL: booleans stored as TINYINT.
        (
            "mysql",
            build([
                RawValue::Int(1),
                RawValue::Float(0.125),
                RawValue::from("0.1"),
                RawValue::Int(9),
                RawValue::Int(2147483648),
                RawValue::from("foobar"),
            ]),
        ),
        // SQLite: no decimal storage, the driver already converted to float.
        (
            "sqlite",
            build([
                RawValue::Int(1),
                RawValue::Float(0.125),
                RawValue::Float(0.1),
                RawValue::Int(9),
                RawValue::Int(2147483648),
                RawValue::from("foobar"),
            ]),
        ),
        // A driver that stringifies every fetched value.
        (
            "stringified",
            build([
                RawValue::from("1"),
                RawValue::from("0.125"),
                RawValue::from("0.1"),
                RawValue::from("9"),
                RawValue::from("2147483648"),
                RawValue::from("foobar"),
            ]),
        ),
        // PostgreSQL text protocol.
        (
            "postgres-text",
            build([
                RawValue::from("t"),
                RawValue::from("0.125"),
                RawValue::from("0.1"),
                RawValue::from("9"),
                RawValue::from("2147483648"),
                RawValue::from("foobar"),
            ]),
        ),
    ]
}

fn client_for(result: RawQueryResult, config: &NormalizationConfig) -> SqlNormClient {
    let driver: Arc<dyn DatabaseDriver> =
        Arc::new(InMemoryTestDriver::new().with_default_response(result));
    SqlNormClient::with_driver(driver, config).unwrap()
}

async fn fetch_row(
    result: RawQueryResult,
    config: &NormalizationConfig,
) -> Vec<(SemanticKind, HostValue)> {
    let row = client_for(result, config)
        .query(SELECT_ALL, &[])
        .await
        .unwrap()
        .single_row()
        .unwrap();
    COLUMNS
        .iter()
        .map(|(name, _)| {
            let value = row.get(name).unwrap();
            (value.kind(), value.value().clone())
        })
        .collect()
}

#[tokio::test]
async fn test_backends_agree_under_default_policy() {
    let config = NormalizationConfig::default();
    let expected = vec![
        (SemanticKind::Boolean, HostValue::Bool(true)),
        (SemanticKind::Float, HostValue::Float(0.125)),
        (SemanticKind::Decimal, HostValue::Text("0.1".to_string())),
        (SemanticKind::Integer, HostValue::Int(9)),
        (
            SemanticKind::BigInteger,
            HostValue::BigInt(BigInt::from(2147483648_i64)),
        ),
        (SemanticKind::Text, HostValue::Text("foobar".to_string())),
    ];

    for (backend, result) in backend_rows() {
        assert_eq!(fetch_row(result, &config).await, expected, "backend {}", backend);
    }
}

#[tokio::test]
async fn test_backends_agree_when_stringified() {
    let config = NormalizationConfig::from_json(r#"{ "policy": { "stringify_all": true } }"#)
        .unwrap();
    // Text values, classified kinds kept.
    let expected: Vec<(SemanticKind, HostValue)> = [
        (SemanticKind::Boolean, "1"),
        (SemanticKind::Float, "0.125"),
        (SemanticKind::Decimal, "0.1"),
        (SemanticKind::Integer, "9"),
        (SemanticKind::BigInteger, "2147483648"),
        (SemanticKind::Text, "foobar"),
    ]
    .into_iter()
    .map(|(kind, text)| (kind, HostValue::Text(text.to_string())))
    .collect();

    for (backend, result) in backend_rows() {
        assert_eq!(fetch_row(result, &config).await, expected, "backend {}", backend);
    }
}

#[tokio::test]
async fn test_backends_agree_with_int_booleans_and_text_numbers() {
    let config = NormalizationConfig::from_json(
        r#"{ "policy": { "boolean_as_int": true, "native_numbers": false } }"#,
    )
    .unwrap();

    for (backend, result) in backend_rows() {
        let row = fetch_row(result, &config).await;
        assert_eq!(row[0], (SemanticKind::Boolean, HostValue::Int(1)), "{}", backend);
        assert_eq!(
            row[4],
            (
                SemanticKind::BigInteger,
                HostValue::Text("2147483648".to_string())
            ),
            "{}",
            backend
        );
    }
}

#[tokio::test]
async fn test_computed_expressions() {
    // (expression, declared hint, raw value, expected kind)
    let cases: Vec<(&str, SourceTypeHint, RawValue, SemanticKind)> = vec![
        ("TRUE", SourceTypeHint::Untyped, RawValue::from("TRUE"), SemanticKind::Boolean),
        ("NOT(col_bool)", SourceTypeHint::Boolean, RawValue::Int(0), SemanticKind::Boolean),
        ("1 > 2", SourceTypeHint::Untyped, RawValue::Bool(false), SemanticKind::Boolean),
        // MySQL and SQLite return comparisons as narrow integers.
        ("1 > 2", SourceTypeHint::Boolean, RawValue::Int(0), SemanticKind::Boolean),
        ("1 > 2", SourceTypeHint::parse("tinyint(1)"), RawValue::from("0"), SemanticKind::Boolean),
        ("0.1", SourceTypeHint::Untyped, RawValue::from("0.1"), SemanticKind::Decimal),
        ("0.125e0", SourceTypeHint::Untyped, RawValue::from("0.125e0"), SemanticKind::Float),
        ("1", SourceTypeHint::Untyped, RawValue::Int(1), SemanticKind::Integer),
        (
            "2147483648",
            SourceTypeHint::Untyped,
            RawValue::Int(2147483648),
            SemanticKind::BigInteger,
        ),
        (
            "AVG(col_decimal)",
            SourceTypeHint::aggregate(AggregateFunction::Avg, SourceTypeHint::parse("DECIMAL(2,1)")),
            RawValue::from("0.10000"),
            SemanticKind::Decimal,
        ),
        (
            "AVG(col_float)",
            SourceTypeHint::aggregate(AggregateFunction::Avg, SourceTypeHint::parse("FLOAT")),
            RawValue::Float(0.125),
            SemanticKind::Float,
        ),
        (
            "SUM(col_int)",
            SourceTypeHint::aggregate(AggregateFunction::Sum, SourceTypeHint::parse("INT")),
            RawValue::from("9"),
            SemanticKind::Integer,
        ),
        (
            "COUNT(*)",
            SourceTypeHint::aggregate(AggregateFunction::Count, SourceTypeHint::Untyped),
            RawValue::Int(1),
            SemanticKind::BigInteger,
        ),
        (
            "MAX(col_decimal)",
            SourceTypeHint::aggregate(AggregateFunction::Max, SourceTypeHint::parse("DECIMAL(2,1)")),
            RawValue::from("0.1"),
            SemanticKind::Decimal,
        ),
        (
            "LOWER(col_string)",
            SourceTypeHint::parse("text"),
            RawValue::from("foobar"),
            SemanticKind::Text,
        ),
        ("SQRT(-1)", SourceTypeHint::Untyped, RawValue::Null, SemanticKind::Null),
    ];

    let config = NormalizationConfig::default();
    for (expression, hint, value, expected) in cases {
        let result = InMemoryTestResponseBuilder::new()
            .column("value", hint)
            .row([value])
            .build();
        let row = client_for(result, &config)
            .query(&format!("SELECT {} FROM test", expression), &[])
            .await
            .unwrap()
            .single_row()
            .unwrap();
        assert_eq!(row.get("value").unwrap().kind(), expected, "{}", expression);
    }
}

#[tokio::test]
async fn test_comparison_from_narrow_integer_backends() {
    let config = NormalizationConfig::default();
    let as_int =
        NormalizationConfig::from_json(r#"{ "policy": { "boolean_as_int": true } }"#).unwrap();

    for raw in [RawValue::Bool(false), RawValue::Int(0), RawValue::from("0")] {
        let result = InMemoryTestResponseBuilder::new()
            .columns(&[("cmp", "BOOLEAN")])
            .row([raw.clone()])
            .build();

        let row = client_for(result.clone(), &config)
            .query("SELECT 1 > 2 AS cmp", &[])
            .await
            .unwrap()
            .single_row()
            .unwrap();
        assert_eq!(row.get("cmp").unwrap().kind(), SemanticKind::Boolean, "{:?}", raw);
        assert_eq!(row.get("cmp").unwrap().as_bool(), Some(false), "{:?}", raw);

        let row = client_for(result, &as_int)
            .query("SELECT 1 > 2 AS cmp", &[])
            .await
            .unwrap()
            .single_row()
            .unwrap();
        assert_eq!(row.get("cmp").unwrap().as_i64(), Some(0), "{:?}", raw);
    }
}

#[tokio::test]
async fn test_query_records_sql_and_params() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&[("id", "INT")])
                .row([RawValue::Int(42)])
                .build(),
        ),
    );
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(&in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    let client = SqlNormClient::with_driver(driver, &NormalizationConfig::default()).unwrap();

    let result = client
        .query(
            "SELECT id FROM users WHERE name = $1",
            &[SqlValue::from("Bob")],
        )
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT id FROM users WHERE name = $1",
        &[SqlValue::Text("Bob".to_string())],
    );
    in_memory_test_driver.assert_query_count(1);

    let row = result.single_row().unwrap();
    assert_eq!(row.get("id").unwrap().as_i64(), Some(42));
}

#[tokio::test]
async fn test_multiple_rows_and_nulls() {
    let client = client_for(
        InMemoryTestResponseBuilder::new()
            .columns(&[("id", "INT"), ("score", "DECIMAL(4,2)")])
            .row([RawValue::Int(1), RawValue::from("12.50")])
            .row([RawValue::Int(2), RawValue::Null])
            .row([RawValue::Int(3), RawValue::from("-0.01")])
            .build(),
        &NormalizationConfig::default(),
    );

    let result = client.query("SELECT id, score FROM scores", &[]).await.unwrap();
    assert_eq!(result.columns(), ["id".to_string(), "score".to_string()]);
    assert_eq!(result.len(), 3);

    let rows = result.rows();
    assert_eq!(rows[0].get("score").unwrap().as_str(), Some("12.50"));
    assert!(rows[1].get("score").unwrap().is_null());
    assert_eq!(rows[1].get("score").unwrap().kind(), SemanticKind::Null);
    assert_eq!(rows[2].get("score").unwrap().as_str(), Some("-0.01"));
}

#[tokio::test]
async fn test_empty_result() {
    let client = client_for(
        InMemoryTestResponseBuilder::new()
            .columns(&[("id", "INT")])
            .build(),
        &NormalizationConfig::default(),
    );

    let result = client.query("SELECT id FROM users", &[]).await.unwrap();
    assert!(result.is_empty());

    match result.single_row().unwrap_err() {
        SqlNormError::UnexpectedRowCount { expected, actual } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("Expected UnexpectedRowCount error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_driver_failure_is_surfaced() {
    let driver: Arc<dyn DatabaseDriver> =
        Arc::new(InMemoryTestDriver::new().with_failure("relation \"test\" does not exist"));
    let client = SqlNormClient::with_driver(driver, &NormalizationConfig::default()).unwrap();

    match client.query("SELECT 1 FROM test", &[]).await {
        Err(SqlNormError::QueryFailed(message)) => assert!(message.contains("does not exist")),
        other => panic!("Expected QueryFailed, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_unrepresentable_value_is_an_error() {
    let client = client_for(
        InMemoryTestResponseBuilder::new()
            .columns(&[("col_int", "INT")])
            .row([RawValue::from("not a number")])
            .build(),
        &NormalizationConfig::default(),
    );

    match client.query("SELECT col_int FROM test", &[]).await {
        Err(SqlNormError::UnrepresentableValue { kind, text, .. }) => {
            assert_eq!(kind, SemanticKind::Integer);
            assert_eq!(text, "not a number");
        }
        other => panic!("Expected UnrepresentableValue, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_invalid_config_rejected_before_any_query() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(&in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    let config = NormalizationConfig::from_json(
        r#"{ "policy": { "overrides": { "text": "as_boolean01" } } }"#,
    )
    .unwrap();

    assert!(matches!(
        SqlNormClient::with_driver(driver, &config),
        Err(SqlNormError::Configuration(_))
    ));
    in_memory_test_driver.assert_query_count(0);
}

#[tokio::test]
async fn test_reconfigure_leaves_existing_client_untouched() {
    let result = InMemoryTestResponseBuilder::new()
        .columns(&[("col_bool", "BOOLEAN")])
        .row([RawValue::Bool(true)])
        .build();
    let base = client_for(result, &NormalizationConfig::default());
    let as_int = base
        .reconfigure(
            &NormalizationConfig::from_json(r#"{ "policy": { "boolean_as_int": true } }"#).unwrap(),
        )
        .unwrap();

    let before = base.query("SELECT col_bool FROM test", &[]).await.unwrap();
    let after = as_int.query("SELECT col_bool FROM test", &[]).await.unwrap();
    let again = base.query("SELECT col_bool FROM test", &[]).await.unwrap();

    let first = |result: sqlnorm::QueryResult| {
        result
            .single_row()
            .unwrap()
            .get("col_bool")
            .unwrap()
            .value()
            .clone()
    };
    assert_eq!(first(before), HostValue::Bool(true));
    assert_eq!(first(after), HostValue::Int(1));
    assert_eq!(first(again), HostValue::Bool(true));
}
