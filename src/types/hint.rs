use std::fmt;

/// Aggregate functions whose result type depends on the type of their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    fn as_str(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// Declared type metadata reported by a driver for a result column.
///
/// Hints are best effort. A driver that cannot tell what a computed column is
/// reports [`SourceTypeHint::Untyped`] and classification falls back to the
/// value's own lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceTypeHint {
    Boolean,
    /// Integer storage. `bits == 0` means the width is unknown.
    Integer { bits: u8, unsigned: bool },
    Float { bits: u8 },
    Decimal {
        precision: Option<u16>,
        scale: Option<u16>,
    },
    Text { max_length: Option<u32> },
    /// An aggregate over an input of the given type, e.g. `AVG(col_decimal)`.
    Aggregate {
        function: AggregateFunction,
        input: Box<SourceTypeHint>,
    },
    /// A declared type outside the numeric, boolean and text families
    /// (dates, uuids, json, ...). Holds the name as the driver reported it.
    Other(String),
    /// No declared type at all, typical for literals and function results.
    Untyped,
}

impl SourceTypeHint {
    /// Shorthand for [`SourceTypeHint::Aggregate`].
    pub fn aggregate(function: AggregateFunction, input: SourceTypeHint) -> Self {
        SourceTypeHint::Aggregate {
            function,
            input: Box::new(input),
        }
    }

    /// Parses a declared SQL type name such as `DECIMAL(2, 1)`,
    /// `INT UNSIGNED`, `double precision` or `varchar(255)`.
    ///
    /// Parsing never fails: an empty name is [`SourceTypeHint::Untyped`] and an
    /// unrecognized one is kept as [`SourceTypeHint::Other`].
    pub fn parse(declared: &str) -> Self {
        let declared = declared.trim();
        if declared.is_empty() {
            return SourceTypeHint::Untyped;
        }

        let lower = declared.to_ascii_lowercase();
        let (head, params, tail) = match (lower.find('('), lower.rfind(')')) {
            (Some(open), Some(close)) if open < close => (
                &lower[..open],
                &lower[open + 1..close],
                &lower[close + 1..],
            ),
            _ => (lower.as_str(), "", ""),
        };

        let mut unsigned = false;
        let words: Vec<&str> = head
            .split_whitespace()
            .chain(tail.split_whitespace())
            .filter(|word| match *word {
                "unsigned" => {
                    unsigned = true;
                    false
                }
                "signed" | "zerofill" => false,
                _ => true,
            })
            .collect();
        let name = words.join(" ");

        let params: Vec<u32> = params
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();

        match name.as_str() {
            "bool" | "boolean" => SourceTypeHint::Boolean,
            // MySQL spells BOOLEAN as TINYINT(1).
            "tinyint" if params == [1] && !unsigned => SourceTypeHint::Boolean,
            "tinyint" | "int1" => SourceTypeHint::Integer { bits: 8, unsigned },
            "smallint" | "int2" | "smallserial" => SourceTypeHint::Integer { bits: 16, unsigned },
            "mediumint" | "int3" => SourceTypeHint::Integer { bits: 24, unsigned },
            "int" | "integer" | "int4" | "serial" => SourceTypeHint::Integer { bits: 32, unsigned },
            "bigint" | "int8" | "bigserial" => SourceTypeHint::Integer { bits: 64, unsigned },
            "real" | "float4" => SourceTypeHint::Float { bits: 32 },
            "float" | "double" | "double precision" | "float8" => {
                SourceTypeHint::Float { bits: 64 }
            }
            "decimal" | "numeric" | "dec" | "fixed" => SourceTypeHint::Decimal {
                precision: params.first().map(|&p| p as u16),
                scale: params.get(1).map(|&s| s as u16),
            },
            "char" | "character" | "varchar" | "character varying" | "nchar" | "nvarchar"
            | "bpchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "name" | "clob" => {
                SourceTypeHint::Text {
                    max_length: params.first().copied(),
                }
            }
            _ => SourceTypeHint::Other(declared.to_string()),
        }
    }
}

impl fmt::Display for SourceTypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTypeHint::Boolean => f.write_str("BOOLEAN"),
            SourceTypeHint::Integer { bits, unsigned } => {
                let name = match bits {
                    8 => "TINYINT",
                    16 => "SMALLINT",
                    24 => "MEDIUMINT",
                    32 => "INT",
                    64 => "BIGINT",
                    _ => "INTEGER",
                };
                f.write_str(name)?;
                if *unsigned {
                    f.write_str(" UNSIGNED")?;
                }
                Ok(())
            }
            SourceTypeHint::Float { bits: 32 } => f.write_str("REAL"),
            SourceTypeHint::Float { .. } => f.write_str("DOUBLE PRECISION"),
            SourceTypeHint::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => f.write_str("DECIMAL"),
            },
            SourceTypeHint::Text { max_length: Some(n) } => write!(f, "VARCHAR({})", n),
            SourceTypeHint::Text { max_length: None } => f.write_str("TEXT"),
            SourceTypeHint::Aggregate { function, input } => {
                write!(f, "{}({})", function.as_str(), input)
            }
            SourceTypeHint::Other(name) => f.write_str(name),
            SourceTypeHint::Untyped => f.write_str("UNTYPED"),
        }
    }
}
