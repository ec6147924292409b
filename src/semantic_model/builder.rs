use super::{classify, Column, ColumnKind, SemanticModel, SemanticModelError, Table};
use crate::data_store::{Catalog, ColumnInfo, SampleRange, TableRef};
use crate::describer::{Completion, Describer};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};

/// A described column waiting to be placed in a [`Table`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDraft {
    pub info: ColumnInfo,
    pub description: String,
    pub sample: Option<SampleRange>,
}

/// What happened to the columns of a table added to the model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableReport {
    pub table: String,
    /// `(column, declared type)` of columns left out because their type is not recognised
    pub skipped: Vec<(String, String)>,
}

/// Place described columns into a [`Table`], keeping source column order
/// within each list.
pub fn build_table(
    table: &TableRef,
    description: &str,
    columns: Vec<ColumnDraft>,
) -> (Table, TableReport) {
    let mut entry = Table::new(table, description);
    let mut report = TableReport {
        table: table.table.clone(),
        skipped: Vec::new(),
    };

    for draft in columns {
        let Some(kind) = classify(&draft.info.data_type) else {
            warn!(
                "Skipping column {}.{} with unrecognised type {}",
                table, draft.info.name, draft.info.data_type
            );
            report
                .skipped
                .push((draft.info.name, draft.info.data_type));
            continue;
        };

        let sample_values = match (&kind, draft.sample) {
            (ColumnKind::Measure, _) | (_, None) => Vec::new(),
            (_, Some(sample)) => sample.values(),
        };

        entry.push(
            kind,
            Column {
                expr: draft.info.name.clone(),
                name: draft.info.name,
                description: draft.description,
                data_type: draft.info.data_type.to_uppercase(),
                synonyms: Vec::new(),
                sample_values,
            },
        );
    }

    (entry, report)
}

/// Generates [`Table`] entries from the catalog with LLM written descriptions
pub struct TableGenerator<'a, C, L> {
    catalog: &'a C,
    describer: Describer<L>,
    concurrency: usize,
    sample_values: bool,
}

impl<'a, C, L> TableGenerator<'a, C, L>
where
    C: Catalog,
    L: Completion,
{
    pub fn new(catalog: &'a C, llm: L) -> Self {
        Self {
            catalog,
            describer: Describer::new(llm),
            concurrency: 1,
            sample_values: false,
        }
    }

    /// Number of column descriptions requested at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Collect MIN/MAX of dimensions and time dimensions as sample values
    pub fn with_sample_values(mut self, sample_values: bool) -> Self {
        self.sample_values = sample_values;
        self
    }

    pub async fn generate(&self, table: &TableRef) -> Result<(Table, TableReport), SemanticModelError> {
        info!("Describing table {}", table);
        let columns = self.catalog.describe_table(table).await?;
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let descriptions: Vec<String> = stream::iter(columns.iter())
            .map(|column| self.describer.describe_column(table, &names, column))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let samples: Vec<Option<SampleRange>> = stream::iter(columns.iter())
            .map(|column| self.sample(table, column))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let description = self.describer.describe_table(table, &columns).await?;
        debug!("Generated description for {}: {}", table, description);

        let drafts = columns
            .into_iter()
            .zip(descriptions)
            .zip(samples)
            .map(|((info, description), sample)| ColumnDraft {
                info,
                description,
                sample,
            })
            .collect();

        Ok(build_table(table, &description, drafts))
    }

    /// Generate the table and append it to `model`.
    ///
    /// The model is only touched once every catalog and completion call has
    /// succeeded.
    pub async fn add_to(
        &self,
        model: &mut SemanticModel,
        table: &TableRef,
    ) -> Result<TableReport, SemanticModelError> {
        model.ensure_capacity()?;
        let (entry, report) = self.generate(table).await?;
        model.add_table(entry)?;
        info!(
            "Added table {} to semantic model {} ({} tables)",
            table,
            model.name,
            model.tables.len()
        );
        Ok(report)
    }

    async fn sample(
        &self,
        table: &TableRef,
        column: &ColumnInfo,
    ) -> Result<Option<SampleRange>, SemanticModelError> {
        if !self.sample_values {
            return Ok(None);
        }
        match classify(&column.data_type) {
            Some(ColumnKind::Dimension) | Some(ColumnKind::TimeDimension) => {
                Ok(Some(self.catalog.min_max(table, &column.name).await?))
            }
            _ => Ok(None),
        }
    }
}
