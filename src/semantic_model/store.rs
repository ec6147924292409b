use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A semantic model file inside a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub database: String,
    pub schema: String,
    pub stage: String,
    pub file_name: String,
}

impl StageFile {
    pub fn new(database: &str, schema: &str, stage: &str, file_name: &str) -> Self {
        Self {
            database: database.to_string(),
            schema: schema.to_string(),
            stage: stage.to_string(),
            file_name: file_name.to_string(),
        }
    }

    /// `<semantic_name>_semantic_model_<YYYYMMDDHHMM>.yaml` in the given stage
    pub fn timestamped(
        database: &str,
        schema: &str,
        stage: &str,
        semantic_name: &str,
        now: NaiveDateTime,
    ) -> Self {
        let file_name = format!(
            "{}_semantic_model_{}.yaml",
            semantic_name,
            now.format("%Y%m%d%H%M")
        );
        Self::new(database, schema, stage, &file_name)
    }

    /// `<database>.<schema>.<stage>`
    pub fn stage_path(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.stage)
    }

    /// Stage reference understood by the analyst service
    pub fn reference(&self) -> String {
        format!("@{}", self)
    }
}

impl fmt::Display for StageFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.stage_path(), self.file_name)
    }
}

impl FromStr for StageFile {
    type Err = StageStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('@');
        let invalid = || StageStoreError::InvalidPath(s.to_string());

        let (stage_path, file_name) = s.split_once('/').ok_or_else(invalid)?;
        let parts: Vec<&str> = stage_path.split('.').collect();
        match parts.as_slice() {
            [database, schema, stage]
                if !database.is_empty()
                    && !schema.is_empty()
                    && !stage.is_empty()
                    && !file_name.is_empty() =>
            {
                Ok(StageFile::new(database, schema, stage, file_name))
            }
            _ => Err(invalid()),
        }
    }
}

/// Storage the generated YAML is written to and read back from
#[async_trait]
pub trait StageStore: Send + Sync {
    async fn put(&self, file: &StageFile, content: &[u8]) -> Result<(), StageStoreError>;
    async fn get(&self, file: &StageFile) -> Result<Vec<u8>, StageStoreError>;
}

#[derive(Error, Debug)]
pub enum StageStoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid stage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),
}
