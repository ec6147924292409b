/// Which list of a table a column is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    TimeDimension,
    Dimension,
    Measure,
}

pub const TEMPORAL_TYPES: &[&str] = &[
    "DATE",
    "DATETIME",
    "TIME",
    "TIMESTAMP",
    "TIMESTAMP_LTZ(9)",
    "TIMESTAMP_NTZ",
    "TIMESTAMP_TZ",
];

pub const TEXTUAL_TYPES: &[&str] = &[
    "VARCHAR(50)",
    "VARCHAR(16777216)",
    "VARCHAR(1)",
    "VARCHAR(10)",
    "VARCHAR(20)",
    "VARCHAR(30)",
    "CHAR",
    "CHARACTER",
    "STRING",
    "TEXT",
    "BINARY",
    "VARBINARY",
];

pub const NUMERIC_TYPES: &[&str] = &[
    "NUMBER",
    "DECIMAL",
    "NUMERIC",
    "INT",
    "INTEGER",
    "BIGINT",
    "SMALLINT",
    "TINYINT",
    "BYTEINT",
    "FLOAT",
    "FLOAT4",
    "FLOAT8",
    "DOUBLE",
    "DOUBLE PRECISION",
    "REAL",
];

/// Classify a declared column type by exact membership after uppercasing.
///
/// Temporal is checked first, then textual, then numeric. Parameterised types
/// that are not listed verbatim (`NUMBER(38,0)`, `VARCHAR(255)`) are not
/// recognised and yield `None`.
pub fn classify(data_type: &str) -> Option<ColumnKind> {
    let data_type = data_type.to_uppercase();
    if TEMPORAL_TYPES.contains(&data_type.as_str()) {
        Some(ColumnKind::TimeDimension)
    } else if TEXTUAL_TYPES.contains(&data_type.as_str()) {
        Some(ColumnKind::Dimension)
    } else if NUMERIC_TYPES.contains(&data_type.as_str()) {
        Some(ColumnKind::Measure)
    } else {
        None
    }
}
