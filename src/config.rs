use envconfig::Envconfig;
use log::debug;

use crate::data_store::{CatalogError, TableRef};

#[derive(Envconfig, Clone)]
pub struct SnowflakeConfig {
    #[envconfig(from = "SNOWFLAKE_ACCOUNT")]
    pub account: String,

    #[envconfig(from = "SNOWFLAKE_USER")]
    pub user: String,

    #[envconfig(from = "SNOWFLAKE_PASSWORD")]
    pub password: String,

    #[envconfig(from = "SNOWFLAKE_WAREHOUSE")]
    pub warehouse: Option<String>,

    #[envconfig(from = "SNOWFLAKE_DATABASE")]
    pub database: Option<String>,

    #[envconfig(from = "SNOWFLAKE_SCHEMA")]
    pub schema: Option<String>,

    #[envconfig(from = "SNOWFLAKE_ROLE")]
    pub role: Option<String>,

    #[envconfig(from = "SNOWFLAKE_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl SnowflakeConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!("SnowflakeConfig loaded: account={}, user={}, warehouse={:?}, database={:?}, schema={:?}, role={:?}, timeout={:?}",
               config.account, config.user, config.warehouse, config.database, config.schema, config.role, config.timeout);
        Ok(config)
    }
}

#[derive(Envconfig, Clone)]
pub struct S3Config {
    #[envconfig(from = "TENANT")]
    pub tenant: String,

    #[envconfig(from = "S3_BUCKET_NAME")]
    pub bucket_name: String,
}

impl S3Config {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "S3Config loaded: tenant={}, bucket_name={}",
            config.tenant, config.bucket_name
        );
        Ok(config)
    }
}

/// Where the semantic model is written when it is stored on disk
#[derive(Envconfig, Clone)]
pub struct LocalStageConfig {
    #[envconfig(from = "OUTPUT_DIR", default = ".")]
    pub output_dir: String,
}

impl LocalStageConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!("LocalStageConfig loaded: output_dir={}", config.output_dir);
        Ok(config)
    }
}

#[derive(Envconfig, Clone)]
pub struct AnalystConfig {
    /// Defaults to `https://<SNOWFLAKE_ACCOUNT>.snowflakecomputing.com`
    #[envconfig(from = "ANALYST_BASE_URL")]
    pub base_url: Option<String>,

    #[envconfig(from = "SNOWFLAKE_ACCOUNT")]
    pub account: String,

    #[envconfig(from = "SNOWFLAKE_TOKEN")]
    pub token: String,

    #[envconfig(from = "SNOWFLAKE_TOKEN_TYPE", default = "KEYPAIR_JWT")]
    pub token_type: String,

    #[envconfig(from = "ANALYST_TIMEOUT_MS", default = "30000")]
    pub timeout_ms: u64,
}

impl AnalystConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "AnalystConfig loaded: base_url={}, token_type={}, timeout_ms={}",
            config.url(),
            config.token_type,
            config.timeout_ms
        );
        Ok(config)
    }

    pub fn url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

#[derive(Envconfig, Clone)]
pub struct BuilderConfig {
    #[envconfig(from = "SEMANTIC_NAME")]
    pub semantic_name: String,

    #[envconfig(from = "SEMANTIC_DESCRIPTION", default = "")]
    pub description: String,

    /// Comma separated `database.schema.table` list
    #[envconfig(from = "SEMANTIC_TABLES")]
    pub tables: String,

    /// `database.schema.stage` to upload the model to
    #[envconfig(from = "SEMANTIC_STAGE")]
    pub stage: Option<String>,

    #[envconfig(from = "CORTEX_MODEL", default = "llama3-70b")]
    pub cortex_model: String,

    #[envconfig(from = "DESCRIBE_CONCURRENCY", default = "4")]
    pub describe_concurrency: usize,

    #[envconfig(from = "SAMPLE_VALUES", default = "false")]
    pub sample_values: bool,
}

impl BuilderConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "BuilderConfig loaded: semantic_name={}, tables={}, stage={:?}, cortex_model={}, describe_concurrency={}, sample_values={}",
            config.semantic_name,
            config.tables,
            config.stage,
            config.cortex_model,
            config.describe_concurrency,
            config.sample_values
        );
        Ok(config)
    }

    pub fn table_refs(&self) -> Result<Vec<TableRef>, CatalogError> {
        self.tables
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.parse())
            .collect()
    }

    /// `(database, schema, stage)` parsed from `SEMANTIC_STAGE`
    pub fn stage_location(&self) -> Result<Option<(String, String, String)>, CatalogError> {
        self.stage
            .as_deref()
            .map(|stage| {
                stage
                    .parse::<TableRef>()
                    .map(|stage| (stage.database, stage.schema, stage.table))
            })
            .transpose()
    }
}

#[derive(Envconfig, Clone)]
pub struct ChatConfig {
    /// `database.schema.stage/file.yaml` of an uploaded semantic model
    #[envconfig(from = "SEMANTIC_MODEL_FILE")]
    pub semantic_model_file: String,
}

impl ChatConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "ChatConfig loaded: semantic_model_file={}",
            config.semantic_model_file
        );
        Ok(config)
    }
}
