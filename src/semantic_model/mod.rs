pub mod builder;
pub mod classify;
pub mod local_store;
pub mod s3_store;
pub mod store;

use crate::data_store::{CatalogError, TableRef};
use crate::describer::DescriberError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use builder::{TableGenerator, TableReport};
pub use classify::{classify, ColumnKind};
pub use store::{StageFile, StageStore, StageStoreError};

/// Most tables a single semantic model may hold
pub const MAX_TABLES: usize = 100;

/// Shown in place of the document until a model has been started
pub const TEMPLATE_YAML: &str = r#"name: <name>
description: <string>
tables:
- name: <name>
  description: <string>
  base_table:
    database: <database>
    schema: <schema>
    table: <base table name>
  dimensions:
  - name: <name>
    synonyms:
    - <array of strings>
    description: <string>
    expr: <SQL expression>
    data_type: <data type>
  time_dimensions:
  - name: date
    synonyms:
    - <array of strings>
    description: <string>
    expr: date
    data_type: date
  measures:
  - name: <name>
    synonyms:
    - <array of strings>
    description: <string>
    expr: <SQL expression>
    data_type: <data type>
    default_aggregation: <aggregate function>
  filters:
  - name: <name>
    synonyms:
    - <array of strings>
    description: <string>
    expr: <SQL expression>
"#;

/// Root document handed to the analyst service
///
/// Fields serialize in declaration order, which is the order the service
/// documents them in.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SemanticModel {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl SemanticModel {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tables: Vec::new(),
        }
    }

    /// Fails when the model already holds [`MAX_TABLES`] tables
    pub fn ensure_capacity(&self) -> Result<(), SemanticModelError> {
        if self.tables.len() >= MAX_TABLES {
            return Err(SemanticModelError::TableLimit(MAX_TABLES));
        }
        Ok(())
    }

    /// Append a table. The same table may be added more than once.
    pub fn add_table(&mut self, table: Table) -> Result<(), SemanticModelError> {
        self.ensure_capacity()?;
        self.tables.push(table);
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Render with `serde_yaml`, which follows YAML 1.2: strings such as `yes`
    /// or `on` stay unquoted and only read back as strings under 1.2 rules.
    pub fn to_yaml(&self) -> Result<String, SemanticModelError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SemanticModelError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub description: String,
    pub base_table: BaseTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_dimensions: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<Column>,
}

impl Table {
    pub fn new(table: &TableRef, description: &str) -> Self {
        Self {
            name: table.table.clone(),
            description: description.to_string(),
            base_table: BaseTable::from(table),
            dimensions: Vec::new(),
            time_dimensions: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn columns(&self, kind: ColumnKind) -> &[Column] {
        match kind {
            ColumnKind::Dimension => &self.dimensions,
            ColumnKind::TimeDimension => &self.time_dimensions,
            ColumnKind::Measure => &self.measures,
        }
    }

    pub fn push(&mut self, kind: ColumnKind, column: Column) {
        match kind {
            ColumnKind::Dimension => self.dimensions.push(column),
            ColumnKind::TimeDimension => self.time_dimensions.push(column),
            ColumnKind::Measure => self.measures.push(column),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BaseTable {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl From<&TableRef> for BaseTable {
    fn from(table: &TableRef) -> Self {
        BaseTable {
            database: table.database.clone(),
            schema: table.schema.clone(),
            table: table.table.clone(),
        }
    }
}

/// Shared shape of dimensions, time dimensions and measures
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub expr: String,
    pub description: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SemanticModelError {
    #[error("Table limit of {0} reached")]
    TableLimit(usize),

    #[error("No semantic model started")]
    NoModel,

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Description error: {0}")]
    Description(#[from] DescriberError),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, description: &str, data_type: &str) -> Column {
        Column {
            name: name.to_string(),
            expr: name.to_string(),
            description: description.to_string(),
            data_type: data_type.to_string(),
            synonyms: Vec::new(),
            sample_values: Vec::new(),
        }
    }

    fn orders_table() -> Table {
        let mut table = Table::new(
            &TableRef::new("DEMO", "PUBLIC", "ORDERS"),
            "Customer orders placed online",
        );
        table.push(
            ColumnKind::Dimension,
            column("CUSTOMER_NAME", "Name of the buying customer", "VARCHAR(50)"),
        );
        table.push(
            ColumnKind::Measure,
            column("AMOUNT", "Order value in dollars", "NUMBER"),
        );
        table
    }

    #[test]
    fn test_serialize_preserves_field_order_and_omits_empty_lists() {
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        model.add_table(orders_table()).unwrap();

        let expected = "\
name: revenue
description: Revenue analysis
tables:
- name: ORDERS
  description: Customer orders placed online
  base_table:
    database: DEMO
    schema: PUBLIC
    table: ORDERS
  dimensions:
  - name: CUSTOMER_NAME
    expr: CUSTOMER_NAME
    description: Name of the buying customer
    data_type: VARCHAR(50)
  measures:
  - name: AMOUNT
    expr: AMOUNT
    description: Order value in dollars
    data_type: NUMBER
";
        assert_eq!(model.to_yaml().unwrap(), expected);
    }

    #[test]
    fn test_serialize_omits_every_empty_column_list() {
        let mut model = SemanticModel::new("empty", "No columns");
        model
            .add_table(Table::new(&TableRef::new("DEMO", "PUBLIC", "EMPTY"), "Nothing"))
            .unwrap();

        let yaml = model.to_yaml().unwrap();
        assert!(!yaml.contains("dimensions"));
        assert!(!yaml.contains("time_dimensions"));
        assert!(!yaml.contains("measures"));
        assert!(!yaml.contains("synonyms"));
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        model.add_table(orders_table()).unwrap();
        assert_eq!(model.to_yaml().unwrap(), model.to_yaml().unwrap());
    }

    #[test]
    fn test_long_descriptions_are_not_wrapped() {
        let mut table = orders_table();
        table.description = "word ".repeat(60).trim().to_string();
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        model.add_table(table.clone()).unwrap();

        let yaml = model.to_yaml().unwrap();
        assert!(yaml.contains(&format!("  description: {}\n", table.description)));
    }

    #[test]
    fn test_yaml_round_trip_is_byte_identical() {
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        model.add_table(orders_table()).unwrap();
        let mut with_synonyms = orders_table();
        with_synonyms.measures[0].synonyms = vec!["total".to_string(), "value".to_string()];
        model.add_table(with_synonyms).unwrap();

        let yaml = model.to_yaml().unwrap();
        let parsed = SemanticModel::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, model);
        assert_eq!(parsed.to_yaml().unwrap(), yaml);
    }

    #[test]
    fn test_same_table_can_be_added_twice() {
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        model.add_table(orders_table()).unwrap();
        model.add_table(orders_table()).unwrap();
        assert_eq!(model.tables.len(), 2);
        assert_eq!(model.get_table("ORDERS"), Some(&model.tables[0]));
    }

    #[test]
    fn test_table_limit_leaves_model_unchanged() {
        let mut model = SemanticModel::new("revenue", "Revenue analysis");
        for i in 0..MAX_TABLES {
            let mut table = orders_table();
            table.name = format!("ORDERS_{i}");
            model.add_table(table).unwrap();
        }
        assert_eq!(model.tables.len(), MAX_TABLES);
        assert_eq!(model.tables[0].name, "ORDERS_0");
        assert_eq!(model.tables[MAX_TABLES - 1].name, "ORDERS_99");

        let before = model.to_yaml().unwrap();
        let result = model.add_table(orders_table());
        assert!(matches!(result, Err(SemanticModelError::TableLimit(100))));
        assert_eq!(model.tables.len(), MAX_TABLES);
        assert_eq!(model.to_yaml().unwrap(), before);
    }

    #[test]
    fn test_boolean_like_names_stay_strings() {
        let mut model = SemanticModel::new("yes", "on");
        let mut table = orders_table();
        table.name = "off".to_string();
        table.measures[0].description = "no".to_string();
        model.add_table(table).unwrap();

        let yaml = model.to_yaml().unwrap();
        let parsed = SemanticModel::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.name, "yes");
        assert_eq!(parsed.description, "on");
        assert_eq!(parsed.tables[0].name, "off");
        assert_eq!(parsed.tables[0].measures[0].description, "no");
        assert_eq!(parsed.to_yaml().unwrap(), yaml);
    }

    #[test]
    fn test_template_parses_as_yaml() {
        let template: serde_yaml::Value = serde_yaml::from_str(TEMPLATE_YAML).unwrap();
        assert_eq!(template["name"], serde_yaml::Value::from("<name>"));
    }
}
