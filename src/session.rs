use crate::analyst::{AnalystClient, AnalystError, Conversation, Reply};
use crate::data_store::{Catalog, TableRef};
use crate::describer::Completion;
use crate::semantic_model::local_store::LocalStageStore;
use crate::semantic_model::{
    SemanticModel, SemanticModelError, StageFile, StageStore, StageStoreError, TableGenerator,
    TableReport, TEMPLATE_YAML,
};
use chrono::NaiveDateTime;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

pub const DOWNLOAD_FILE_NAME: &str = "semantic_model.yaml";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    SemanticModel(#[from] SemanticModelError),

    #[error(transparent)]
    Stage(#[from] StageStoreError),

    #[error(transparent)]
    Analyst(#[from] AnalystError),
}

/// State of one user working on one semantic model
#[derive(Default)]
pub struct Session {
    model: Option<SemanticModel>,
    tables: Vec<String>,
    yaml: Option<String>,
    semantic_file: Option<StageFile>,
    conversation: Conversation,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new semantic model, dropping any tables added so far
    pub fn start(&mut self, name: &str, description: &str) {
        info!("Starting semantic model {}", name);
        self.model = Some(SemanticModel::new(name, description));
        self.tables.clear();
        self.yaml = None;
    }

    pub fn model(&self) -> Option<&SemanticModel> {
        self.model.as_ref()
    }

    /// Names of the tables added, in the order they were added
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn semantic_file(&self) -> Option<&StageFile> {
        self.semantic_file.as_ref()
    }

    /// Point the conversation at a model uploaded earlier
    pub fn use_semantic_file(&mut self, file: StageFile) {
        self.semantic_file = Some(file);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Latest rendered document, or the placeholder template before any table is added
    pub fn yaml(&self) -> &str {
        self.yaml.as_deref().unwrap_or(TEMPLATE_YAML)
    }

    pub async fn add_table<C, L>(
        &mut self,
        generator: &TableGenerator<'_, C, L>,
        table: &TableRef,
    ) -> Result<TableReport, SessionError>
    where
        C: Catalog,
        L: Completion,
    {
        let model = self.model.as_mut().ok_or(SemanticModelError::NoModel)?;
        let report = generator.add_to(model, table).await?;
        self.yaml = Some(model.to_yaml()?);
        self.tables.push(table.table.clone());
        Ok(report)
    }

    /// Cached document, or the freshly rendered model when no table has been added yet
    fn rendered(&self) -> Result<String, SessionError> {
        match &self.yaml {
            Some(yaml) => Ok(yaml.clone()),
            None => {
                let model = self.model.as_ref().ok_or(SemanticModelError::NoModel)?;
                Ok(model.to_yaml()?)
            }
        }
    }

    /// Save the current document as `semantic_model.yaml`
    pub async fn download(&self, store: &LocalStageStore) -> Result<PathBuf, SessionError> {
        let yaml = self.rendered()?;
        Ok(store.download(DOWNLOAD_FILE_NAME, yaml.as_bytes()).await?)
    }

    /// Upload the current document to a stage and use it for the conversation
    pub async fn upload<S: StageStore>(
        &mut self,
        store: &S,
        database: &str,
        schema: &str,
        stage: &str,
        now: NaiveDateTime,
    ) -> Result<StageFile, SessionError> {
        let yaml = self.rendered()?;
        let name = self
            .model
            .as_ref()
            .map(|m| m.name.as_str())
            .ok_or(SemanticModelError::NoModel)?;

        let file = StageFile::timestamped(database, schema, stage, name, now);
        store.put(&file, yaml.as_bytes()).await?;
        info!("Uploaded semantic model to {}", file.reference());

        self.semantic_file = Some(file.clone());
        Ok(file)
    }

    pub async fn ask<A, C>(
        &mut self,
        prompt: &str,
        client: &A,
        catalog: &C,
    ) -> Result<Reply, SessionError>
    where
        A: AnalystClient,
        C: Catalog,
    {
        Ok(self
            .conversation
            .process_message(prompt, self.semantic_file.as_ref(), client, catalog)
            .await?)
    }

    /// Ask the suggestion picked with [`Conversation::select_suggestion`], if any
    pub async fn ask_active_suggestion<A, C>(
        &mut self,
        client: &A,
        catalog: &C,
    ) -> Result<Option<Reply>, SessionError>
    where
        A: AnalystClient,
        C: Catalog,
    {
        match self.conversation.take_suggestion() {
            Some(suggestion) => Ok(Some(self.ask(&suggestion, client, catalog).await?)),
            None => Ok(None),
        }
    }

    pub fn reset(&mut self) {
        info!("Resetting session");
        *self = Session::default();
    }
}
