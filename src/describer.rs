use crate::data_store::{ColumnInfo, SnowflakeCatalog, TableRef};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Text completion service used to write business descriptions
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DescriberError>;
}

#[derive(Error, Debug)]
pub enum DescriberError {
    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("Completion returned no rows")]
    EmptyResponse,
}

/// Snowflake Cortex `COMPLETE` called through a catalog session
pub struct CortexComplete {
    catalog: SnowflakeCatalog,
    model: String,
}

impl CortexComplete {
    pub fn new(catalog: SnowflakeCatalog, model: &str) -> Self {
        Self {
            catalog,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Completion for CortexComplete {
    async fn complete(&self, prompt: &str) -> Result<String, DescriberError> {
        let rows = self
            .catalog
            .query(&complete_sql(&self.model, prompt))
            .await
            .map_err(|e| DescriberError::Completion(e.to_string()))?;

        let row = rows.first().ok_or(DescriberError::EmptyResponse)?;
        row.get::<String>("RESPONSE")
            .map_err(|e| DescriberError::Completion(e.to_string()))
    }
}

pub fn complete_sql(model: &str, prompt: &str) -> String {
    format!(
        "SELECT SNOWFLAKE.CORTEX.COMPLETE('{}', '{}') AS RESPONSE;",
        model.replace('\'', "''"),
        prompt.replace('\'', "''")
    )
}

/// Writes column and table descriptions with a [`Completion`] service
pub struct Describer<L> {
    llm: L,
}

impl<L: Completion> Describer<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    pub async fn describe_column(
        &self,
        table: &TableRef,
        columns: &[String],
        column: &ColumnInfo,
    ) -> Result<String, DescriberError> {
        let response = self
            .llm
            .complete(&column_prompt(table, columns, column))
            .await?;
        Ok(sanitize(&response))
    }

    pub async fn describe_table(
        &self,
        table: &TableRef,
        columns: &[ColumnInfo],
    ) -> Result<String, DescriberError> {
        let response = self.llm.complete(&table_prompt(table, columns)).await?;
        Ok(sanitize(&response))
    }
}

/// Collapse every run of non-alphanumeric characters into a single space
pub fn sanitize(response: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new("[^A-Za-z0-9]+").expect("valid regex"));
    re.replace_all(response, " ").trim().to_string()
}

fn details(column: &ColumnInfo) -> String {
    let mut lines = vec![
        format!("    \"NAME\": \"{}\"", column.name),
        format!("    \"TYPE\": \"{}\"", column.data_type),
    ];
    for (key, value) in &column.details {
        match value {
            Some(value) => lines.push(format!("    \"{}\": \"{}\"", key, value)),
            None => lines.push(format!("    \"{}\": None", key)),
        }
    }
    format!("{{\n{}\n}}", lines.join(",\n"))
}

pub fn column_prompt(table: &TableRef, columns: &[String], column: &ColumnInfo) -> String {
    format!(
        r#"
Please provide a concise business description for the column in two phrases or less. Do not mention the column name, its type, whether it is unique or nullable, where it is stored, or any other technical details. I only need the business description. Do not include any special characters or additional information beyond the business description.

The column name is: {column_name}
It is stored in the {table_name} table, which is in the {schema} schema, in the {database} database.
Other columns in the same table are: {columns}

Use the following information to enhance the description:
{details}

Focus solely on the business purpose and usage of the column in queries. Avoid any mention of technical attributes such as nullability, data type, or storage location.
Do not include any introductory phrases.

Example:
For a column named "COGS" in the "DAILY_REVENUE" table, which is in the "REVENUE_TIMESERIES" schema, in the "CORTEX_ANALYST_DEMO" database, with the following details:
{{
    "NAME": "COGS",
    "TYPE": "FLOAT",
    "KIND": "COLUMN",
    "null?": "Y",
    "DEFAULT": None,
    "primary key": "N",
    "unique key": "N",
    "CHECK": None,
    "EXPRESSION": None,
    "COMMENT": None,
    "policy name": None,
    "privacy domain": None
}}
The good description might be:
"Represents the cost of goods sold"
The bad description would be:
"Here is a concise business description for the COGS column Represents the cost of goods sold"
"#,
        column_name = column.name,
        table_name = table.table,
        schema = table.schema,
        database = table.database,
        columns = columns.join(", "),
        details = details(column),
    )
}

pub fn table_prompt(table: &TableRef, columns: &[ColumnInfo]) -> String {
    let column_details: Vec<String> = columns.iter().map(details).collect();
    format!(
        r#"
Please provide a concise business description for the table in two phrases or less. Do not mention the table name, where it is stored, or any technical details. Do not include any special characters.

The table name is: {table_name}
It is stored in the {schema} schema, in the {database} database.
Here are the column descriptions of the table:
{column_details}
Focus solely on the business purpose and usage of the table.
Do not include any introductory phrases.
"#,
        table_name = table.table,
        schema = table.schema,
        database = table.database,
        column_details = column_details.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    struct Recorder {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    #[async_trait]
    impl Completion for Recorder {
        async fn complete(&self, prompt: &str) -> Result<String, DescriberError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[rstest]
    #[case::quotes_and_punctuation("\"Represents the cost of goods sold.\"", "Represents the cost of goods sold")]
    #[case::newlines("Unique order\nidentifier\r\n", "Unique order identifier")]
    #[case::intro_phrase("Description: the customer's e-mail", "Description the customer s e mail")]
    #[case::already_clean("Total revenue", "Total revenue")]
    #[case::only_symbols("***", "")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_complete_sql_escapes_single_quotes() {
        let sql = complete_sql("llama3-70b", "the customer's order");
        assert_eq!(
            sql,
            "SELECT SNOWFLAKE.CORTEX.COMPLETE('llama3-70b', 'the customer''s order') AS RESPONSE;"
        );
    }

    #[test]
    fn test_column_prompt_contains_context() {
        let table = TableRef::new("CORTEX_ANALYST_DEMO", "REVENUE_TIMESERIES", "DAILY_REVENUE");
        let column = ColumnInfo::new("COGS", "FLOAT")
            .with_detail("kind", Some("COLUMN"))
            .with_detail("default", None);
        let columns = vec!["DATE".to_string(), "COGS".to_string()];

        let prompt = column_prompt(&table, &columns, &column);
        assert!(prompt.contains("The column name is: COGS"));
        assert!(prompt.contains(
            "It is stored in the DAILY_REVENUE table, which is in the REVENUE_TIMESERIES schema, in the CORTEX_ANALYST_DEMO database."
        ));
        assert!(prompt.contains("Other columns in the same table are: DATE, COGS"));
        assert!(prompt.contains("\"kind\": \"COLUMN\""));
        assert!(prompt.contains("\"default\": None"));
    }

    #[test]
    fn test_table_prompt_lists_every_column() {
        let table = TableRef::new("DEMO", "PUBLIC", "ORDERS");
        let columns = vec![
            ColumnInfo::new("ID", "NUMBER"),
            ColumnInfo::new("NAME", "VARCHAR(50)"),
        ];
        let prompt = table_prompt(&table, &columns);
        assert!(prompt.contains("The table name is: ORDERS"));
        assert!(prompt.contains("\"NAME\": \"ID\""));
        assert!(prompt.contains("\"NAME\": \"NAME\""));
    }

    #[tokio::test]
    async fn test_describer_sanitizes_completion() {
        let describer = Describer::new(Recorder {
            prompts: Mutex::new(Vec::new()),
            reply: "\"Identifies each order.\"\n".to_string(),
        });
        let table = TableRef::new("DEMO", "PUBLIC", "ORDERS");
        let column = ColumnInfo::new("ID", "NUMBER");

        let description = describer
            .describe_column(&table, &["ID".to_string()], &column)
            .await
            .unwrap();
        assert_eq!(description, "Identifies each order");
        assert_eq!(describer.llm.prompts.lock().unwrap().len(), 1);
    }
}
