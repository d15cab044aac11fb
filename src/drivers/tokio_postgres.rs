use std::error::Error;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio_postgres::types::{FromSql, ToSql, Type};
use uuid::Uuid;
use tokio_postgres::{Client, NoTls};

use crate::error::{Result, SqlNormError};
use crate::traits::DatabaseDriver;
use crate::types::{RawColumnValue, RawQueryResult, RawValue, SourceTypeHint, SqlValue};

type DecodeResult<T> = std::result::Result<T, Box<dyn Error + Sync + Send>>;

/// PostgreSQL driver implementation using tokio-postgres.
///
/// Column hints come from the prepared statement's result types, so they are
/// available even when a query returns no rows.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| SqlNormError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let statement = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| SqlNormError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let types: Vec<Type> = statement
            .columns()
            .iter()
            .map(|c| c.type_().clone())
            .collect();
        let hints: Vec<SourceTypeHint> = types.iter().map(hint_for_type).collect();

        // Convert SqlValue params to tokio-postgres compatible types
        let converted_params: Vec<Box<dyn ToSql + Sync + Send>> =
            params.iter().map(sql_value_to_tosql).collect();

        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(&statement, &param_refs)
            .await
            .map_err(|e| SqlNormError::QueryFailed(e.to_string()))?;

        let result_rows = rows
            .iter()
            .map(|row| {
                types
                    .iter()
                    .zip(&hints)
                    .enumerate()
                    .map(|(i, (ty, hint))| {
                        read_cell(row, i, ty, hint)
                            .map(|value| RawColumnValue::new(value, hint.clone()))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            columns = columns.len(),
            rows = result_rows.len(),
            "fetched PostgreSQL result"
        );

        Ok(RawQueryResult::new(columns, result_rows))
    }
}

/// Convert a SqlValue to a boxed ToSql trait object.
fn sql_value_to_tosql(value: &SqlValue) -> Box<dyn ToSql + Sync + Send> {
    match value {
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Int32(i) => Box::new(*i),
        SqlValue::Int64(i) => Box::new(*i),
        SqlValue::Float64(f) => Box::new(*f),
        SqlValue::Bool(b) => Box::new(*b),
    }
}

/// Declared type of a result column, from the server's type name.
fn hint_for_type(ty: &Type) -> SourceTypeHint {
    match ty.name() {
        // Literals such as `SELECT 'foo'` that the server never resolved.
        "unknown" => SourceTypeHint::Untyped,
        "oid" => SourceTypeHint::Integer {
            bits: 32,
            unsigned: true,
        },
        name => SourceTypeHint::parse(name),
    }
}

/// Read one cell in the most precision-preserving form its type allows.
fn read_cell(
    row: &tokio_postgres::Row,
    index: usize,
    ty: &Type,
    hint: &SourceTypeHint,
) -> Result<RawValue> {
    let value: std::result::Result<RawValue, tokio_postgres::Error> = match hint {
        SourceTypeHint::Boolean => row.try_get::<_, Option<bool>>(index).map(RawValue::from),
        SourceTypeHint::Integer { bits: 16, .. } => row
            .try_get::<_, Option<i16>>(index)
            .map(|v| v.map(i64::from).into()),
        SourceTypeHint::Integer {
            bits: 32,
            unsigned: false,
        } => row.try_get::<_, Option<i32>>(index).map(RawValue::from),
        SourceTypeHint::Integer {
            bits: 32,
            unsigned: true,
        } => row
            .try_get::<_, Option<u32>>(index)
            .map(|v| v.map(i64::from).into()),
        SourceTypeHint::Integer { bits: 64, .. } => {
            row.try_get::<_, Option<i64>>(index).map(RawValue::from)
        }
        // Widening a real to double invents digits; its own shortest form
        // is the exact value the server sent.
        SourceTypeHint::Float { bits: 32 } => {
            row.try_get::<_, Option<f32>>(index).map(|v| match v {
                Some(f) if f.is_finite() => RawValue::Text(f.to_string()),
                Some(f) => RawValue::Float(f64::from(f)),
                None => RawValue::Null,
            })
        }
        SourceTypeHint::Float { .. } => row.try_get::<_, Option<f64>>(index).map(RawValue::from),
        SourceTypeHint::Decimal { .. } => row
            .try_get::<_, Option<NumericText>>(index)
            .map(|v| v.map(|n| n.0).into()),
        SourceTypeHint::Text { .. } => row.try_get::<_, Option<String>>(index).map(RawValue::from),
        _ if DisplayText::accepts(ty) => row
            .try_get::<_, Option<DisplayText>>(index)
            .map(|v| v.map(|t| t.0).into()),
        _ => row
            .try_get::<_, Option<WireBytes>>(index)
            .map(|v| v.map_or(RawValue::Null, |b| RawValue::Bytes(b.0))),
    };
    value.map_err(|e| SqlNormError::QueryFailed(e.to_string()))
}

/// NUMERIC decoded straight from the binary wire format into exact text.
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> DecodeResult<Self> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Dates, times, UUIDs and JSON in their canonical text form. The binary
/// wire form of these types is not text.
struct DisplayText(String);

impl<'a> FromSql<'a> for DisplayText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> DecodeResult<Self> {
        let text = if *ty == Type::DATE {
            NaiveDate::from_sql(ty, raw)?.to_string()
        } else if *ty == Type::TIME {
            NaiveTime::from_sql(ty, raw)?.to_string()
        } else if *ty == Type::TIMESTAMP {
            NaiveDateTime::from_sql(ty, raw)?.to_string()
        } else if *ty == Type::TIMESTAMPTZ {
            DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339()
        } else if *ty == Type::UUID {
            Uuid::from_sql(ty, raw)?.to_string()
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            serde_json::Value::from_sql(ty, raw)?.to_string()
        } else {
            return Err(format!("no text form for type {}", ty).into());
        };
        Ok(DisplayText(text))
    }

    fn accepts(ty: &Type) -> bool {
        [
            Type::DATE,
            Type::TIME,
            Type::TIMESTAMP,
            Type::TIMESTAMPTZ,
            Type::UUID,
            Type::JSON,
            Type::JSONB,
        ]
        .contains(ty)
    }
}

/// The undecoded wire bytes of a column of any other type.
struct WireBytes(Vec<u8>);

impl<'a> FromSql<'a> for WireBytes {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> DecodeResult<Self> {
        Ok(WireBytes(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Binary NUMERIC layout, all big-endian:
/// - u16 ndigits: number of base-10000 digits
/// - i16 weight: base-10000 exponent of the first digit
/// - u16 sign
/// - u16 dscale: digits shown after the decimal point
/// - u16[ndigits] digits, most significant first
fn decode_numeric(raw: &[u8]) -> DecodeResult<String> {
    if raw.len() < 8 {
        return Err(format!("invalid NUMERIC length: {} (minimum 8)", raw.len()).into());
    }
    let word = |at: usize| u16::from_be_bytes([raw[at], raw[at + 1]]);

    let ndigits = usize::from(word(0));
    let weight = i32::from(word(2) as i16);
    let sign = word(4);
    let dscale = usize::from(word(6));

    if raw.len() != 8 + 2 * ndigits {
        return Err(format!(
            "invalid NUMERIC length: {} for {} digits",
            raw.len(),
            ndigits
        )
        .into());
    }

    match sign {
        NUMERIC_POS | NUMERIC_NEG => {}
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        other => return Err(format!("invalid NUMERIC sign: {:#06x}", other).into()),
    }

    let digits: Vec<u16> = (0..ndigits).map(|i| word(8 + 2 * i)).collect();
    // Digit at base-10000 position `i` counted from the first stored digit;
    // positions outside the stored range are zero.
    let digit = |i: i32| -> u16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NUMERIC_NEG && ndigits > 0 {
        text.push('-');
    }

    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit(0).to_string());
        for i in 1..=weight {
            text.push_str(&format!("{:04}", digit(i)));
        }
    }

    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit(i)));
            i += 1;
        }
        fraction.truncate(dscale);
        text.push('.');
        text.push_str(&fraction);
    }

    Ok(text)
}
