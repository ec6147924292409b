pub mod snowflake;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use snowflake::SnowflakeCatalog;

/// Fully qualified `database.schema.table` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(database: &str, schema: &str, table: &str) -> Self {
        Self {
            database: database.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl FromStr for TableRef {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [database, schema, table]
                if !database.is_empty() && !schema.is_empty() && !table.is_empty() =>
            {
                Ok(TableRef::new(database, schema, table))
            }
            _ => Err(CatalogError::InvalidIdentifier(s.to_string())),
        }
    }
}

/// One row of a `DESCRIBE TABLE` result
///
/// `details` keeps the remaining describe attributes (kind, null?, default,
/// primary key, ...) in the order the catalog returned them. They are only
/// used as context for description generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub details: Vec<(String, Option<String>)>,
}

impl ColumnInfo {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: Option<&str>) -> Self {
        self.details
            .push((key.to_string(), value.map(|v| v.to_string())));
        self
    }
}

/// MIN/MAX of a column rendered as text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl SampleRange {
    pub fn values(&self) -> Vec<String> {
        self.min.iter().chain(self.max.iter()).cloned().collect()
    }
}

/// Rows returned from an arbitrary query, every cell rendered as text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// More than one row can be drawn as line/bar/area charts
    pub fn is_chartable(&self) -> bool {
        self.rows.len() > 1
    }

    /// Column used as the chart index, when there is something left to plot
    pub fn chart_index(&self) -> Option<&str> {
        if self.is_chartable() && self.columns.len() > 1 {
            self.columns.first().map(|c| c.as_str())
        } else {
            None
        }
    }
}

/// Catalog the semantic model is built from
///
/// Also executes the SQL produced by the analyst service.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<String>, CatalogError>;
    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError>;
    async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError>;
    async fn list_stages(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError>;
    /// Columns of the table in declaration order
    async fn describe_table(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, CatalogError>;
    async fn min_max(&self, table: &TableRef, column: &str) -> Result<SampleRange, CatalogError>;
    async fn execute(&self, sql: &str) -> Result<QueryResult, CatalogError>;
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}
