#![allow(dead_code)]

use async_trait::async_trait;
use eqtble_semantic::analyst::{
    AnalystClient, AnalystError, ContentBlock, Message, MessageRequest, MessageResponse, Role,
};
use eqtble_semantic::data_store::{
    Catalog, CatalogError, ColumnInfo, QueryResult, SampleRange, TableRef,
};
use eqtble_semantic::describer::{Completion, DescriberError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory catalog with a fixed set of tables
#[derive(Default)]
pub struct FakeCatalog {
    pub tables: HashMap<TableRef, Vec<ColumnInfo>>,
    pub describe_calls: AtomicUsize,
    pub min_max_calls: AtomicUsize,
    pub executed: Mutex<Vec<String>>,
    pub result: QueryResult,
}

impl FakeCatalog {
    pub fn with_table(mut self, table: TableRef, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, data_type)| {
                ColumnInfo::new(name, data_type).with_detail("kind", Some("COLUMN"))
            })
            .collect();
        self.tables.insert(table, columns);
        self
    }

    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.result = result;
        self
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_databases(&self) -> Result<Vec<String>, CatalogError> {
        let mut databases: Vec<String> = self.tables.keys().map(|t| t.database.clone()).collect();
        databases.sort();
        databases.dedup();
        Ok(databases)
    }

    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError> {
        let mut schemas: Vec<String> = self
            .tables
            .keys()
            .filter(|t| t.database == database)
            .map(|t| t.schema.clone())
            .collect();
        schemas.sort();
        schemas.dedup();
        Ok(schemas)
    }

    async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>, CatalogError> {
        let mut tables: Vec<String> = self
            .tables
            .keys()
            .filter(|t| t.database == database && t.schema == schema)
            .map(|t| t.table.clone())
            .collect();
        tables.sort();
        Ok(tables)
    }

    async fn list_stages(&self, _database: &str, _schema: &str) -> Result<Vec<String>, CatalogError> {
        Ok(vec!["MODELS".to_string()])
    }

    async fn describe_table(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, CatalogError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| CatalogError::QueryError(format!("Table {} does not exist", table)))
    }

    async fn min_max(&self, _table: &TableRef, column: &str) -> Result<SampleRange, CatalogError> {
        self.min_max_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SampleRange {
            min: Some(format!("{}_MIN", column)),
            max: Some(format!("{}_MAX", column)),
        })
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, CatalogError> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.result.clone())
    }
}

/// Completion that answers column prompts with `Describes <column>.` and
/// table prompts with `Holds <table> records!`.
///
/// Earlier columns answer slower so concurrent requests finish out of order.
#[derive(Default)]
pub struct FakeCompletion {
    pub fail_on: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeCompletion {
    pub fn failing_on(column: &str) -> Self {
        FakeCompletion {
            fail_on: Some(column.to_string()),
            ..Default::default()
        }
    }
}

fn value_after<'a>(prompt: &'a str, marker: &str) -> Option<&'a str> {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(marker))
        .map(str::trim)
}

#[async_trait]
impl Completion for FakeCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, DescriberError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(column) = value_after(prompt, "The column name is:") {
            if self.fail_on.as_deref() == Some(column) {
                return Err(DescriberError::Completion(format!("model overloaded on {}", column)));
            }
            tokio::time::sleep(Duration::from_millis(30u64.saturating_sub(call as u64 * 10))).await;
            return Ok(format!("Describes {}.", column));
        }

        let table = value_after(prompt, "The table name is:").unwrap_or("unknown");
        Ok(format!("Holds {} records!", table))
    }
}

/// Analyst returning a canned answer and recording every request
pub struct FakeAnalyst {
    pub content: Vec<ContentBlock>,
    pub requests: Mutex<Vec<MessageRequest>>,
}

impl FakeAnalyst {
    pub fn answering(content: Vec<ContentBlock>) -> Self {
        FakeAnalyst {
            content,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnalystClient for FakeAnalyst {
    async fn send(&self, request: &MessageRequest) -> Result<MessageResponse, AnalystError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(MessageResponse {
            message: Message {
                role: Role::Analyst,
                content: self.content.clone(),
            },
            request_id: None,
        })
    }
}

pub fn orders() -> TableRef {
    TableRef::new("DEMO", "PUBLIC", "ORDERS")
}

pub fn orders_catalog() -> FakeCatalog {
    FakeCatalog::default().with_table(
        orders(),
        &[
            ("ID", "NUMBER"),
            ("NAME", "VARCHAR(50)"),
            ("CREATED_AT", "TIMESTAMP_NTZ"),
        ],
    )
}
