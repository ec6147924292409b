use super::{Catalog, CatalogError, ColumnInfo, QueryResult, SampleRange, TableRef};
use crate::config::SnowflakeConfig;
use async_trait::async_trait;
use log::debug;
use snowflake_connector_rs::{
    SnowflakeAuthMethod, SnowflakeClient, SnowflakeClientConfig, SnowflakeRow, SnowflakeSession,
};
use std::sync::Arc;
use std::time::Duration;

/// [`Catalog`] backed by a single Snowflake session
#[derive(Clone)]
pub struct SnowflakeCatalog {
    session: Arc<SnowflakeSession>,
}

impl SnowflakeCatalog {
    pub async fn connect(config: SnowflakeConfig) -> Result<Self, CatalogError> {
        let client = SnowflakeClient::new(
            &config.user,
            SnowflakeAuthMethod::Password(config.password.clone()),
            SnowflakeClientConfig {
                account: config.account.clone(),
                warehouse: config.warehouse.clone(),
                database: config.database.clone(),
                schema: config.schema.clone(),
                role: config.role.clone(),
                timeout: config.timeout.map(Duration::from_secs),
                ..Default::default()
            },
        )
        .map_err(|e| CatalogError::ConnectionError(e.to_string()))?;

        let session = client.create_session().await.map_err(|e| {
            CatalogError::ConnectionError(format!("Failed to connect to Snowflake, {}", e))
        })?;

        Ok(SnowflakeCatalog {
            session: Arc::new(session),
        })
    }

    pub async fn query(&self, sql: &str) -> Result<Vec<SnowflakeRow>, CatalogError> {
        debug!("Running query: {}", sql);
        self.session
            .query(sql)
            .await
            .map_err(|e| CatalogError::QueryError(e.to_string()))
    }

    async fn names(&self, sql: &str) -> Result<Vec<String>, CatalogError> {
        self.query(sql)
            .await?
            .iter()
            .map(|row| required_text(row, "name"))
            .collect()
    }
}

#[async_trait]
impl Catalog for SnowflakeCatalog {
    async fn list_databases(&self) -> Result<Vec<String>, CatalogError> {
        self.names("SHOW DATABASES").await
    }

    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError> {
        self.names(&format!("SHOW SCHEMAS IN DATABASE {}", quote_ident(database)))
            .await
    }

    async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.names(&format!(
            "SHOW TABLES IN {}.{}",
            quote_ident(database),
            quote_ident(schema)
        ))
        .await
    }

    async fn list_stages(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.names(&format!(
            "SHOW STAGES IN {}.{}",
            quote_ident(database),
            quote_ident(schema)
        ))
        .await
    }

    async fn describe_table(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, CatalogError> {
        let rows = self
            .query(&format!("DESCRIBE TABLE {}", qualified(table)))
            .await?;

        rows.iter()
            .map(|row| {
                let mut info = ColumnInfo::new(
                    &required_text(row, "name")?,
                    &required_text(row, "type")?,
                );
                for column in row.column_names() {
                    if column.eq_ignore_ascii_case("name") || column.eq_ignore_ascii_case("type") {
                        continue;
                    }
                    let value = row.get::<Option<String>>(column).unwrap_or(None);
                    info = info.with_detail(column, value.as_deref());
                }
                Ok(info)
            })
            .collect()
    }

    async fn min_max(&self, table: &TableRef, column: &str) -> Result<SampleRange, CatalogError> {
        let column = quote_ident(column);
        let rows = self
            .query(&format!(
                "SELECT MIN({column})::TEXT AS MIN, MAX({column})::TEXT AS MAX FROM {}",
                qualified(table)
            ))
            .await?;

        match rows.first() {
            Some(row) => Ok(SampleRange {
                min: text(row, "MIN")?,
                max: text(row, "MAX")?,
            }),
            None => Ok(SampleRange::default()),
        }
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, CatalogError> {
        let rows = self.query(sql).await?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.column_names().into_iter().map(String::from).collect(),
            None => Vec::new(),
        };

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| text(row, column))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult { columns, rows })
    }
}

/// Quote an identifier so catalog names keep their exact case
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified(table: &TableRef) -> String {
    format!(
        "{}.{}.{}",
        quote_ident(&table.database),
        quote_ident(&table.schema),
        quote_ident(&table.table)
    )
}

// SHOW/DESCRIBE return lower-case column names, so resolve them case-insensitively
fn text(row: &SnowflakeRow, column: &str) -> Result<Option<String>, CatalogError> {
    let name = row
        .column_names()
        .into_iter()
        .find(|c| c.eq_ignore_ascii_case(column))
        .ok_or_else(|| CatalogError::ColumnNotFound(column.to_string()))?;

    row.get::<Option<String>>(name)
        .map_err(|e| CatalogError::QueryError(e.to_string()))
}

fn required_text(row: &SnowflakeRow, column: &str) -> Result<String, CatalogError> {
    text(row, column)?.ok_or_else(|| CatalogError::ColumnNotFound(column.to_string()))
}
