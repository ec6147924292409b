use chrono::Local;
use log::{error, info, warn};
use std::process;

use eqtble_semantic::{
    config::{BuilderConfig, LocalStageConfig, S3Config, SnowflakeConfig},
    data_store::{Catalog, SnowflakeCatalog},
    describer::CortexComplete,
    semantic_model::{
        local_store::LocalStageStore, s3_store::S3StageStore, SemanticModelError, TableGenerator,
    },
    session::SessionError,
    Session,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = BuilderConfig::new().map_err(|e| {
        error!("Failed to initialize builder config: {}", e);
        e
    })?;

    let snowflake_config = SnowflakeConfig::new().map_err(|e| {
        error!("Failed to initialize Snowflake config: {}", e);
        e
    })?;

    let local_config = LocalStageConfig::new().map_err(|e| {
        error!("Failed to initialize local stage config: {}", e);
        e
    })?;

    let tables = config.table_refs().map_err(|e| {
        error!("Invalid SEMANTIC_TABLES: {}", e);
        e
    })?;
    let stage = config.stage_location().map_err(|e| {
        error!("Invalid SEMANTIC_STAGE: {}", e);
        e
    })?;

    let catalog = SnowflakeCatalog::connect(snowflake_config)
        .await
        .map_err(|e| {
            error!("Failed to create SnowflakeCatalog: {}", e);
            e
        })?;

    if let Some((database, schema, stage)) = &stage {
        let stages = catalog.list_stages(database, schema).await?;
        if !stages.iter().any(|s| s == stage) {
            error!("Stage {} not found in {}.{}", stage, database, schema);
            process::exit(1);
        }
    }

    let generator = TableGenerator::new(
        &catalog,
        CortexComplete::new(catalog.clone(), &config.cortex_model),
    )
    .with_concurrency(config.describe_concurrency)
    .with_sample_values(config.sample_values);

    let mut session = Session::new();
    session.start(&config.semantic_name, &config.description);

    for table in &tables {
        match session.add_table(&generator, table).await {
            Ok(report) if !report.skipped.is_empty() => {
                warn!(
                    "{} column(s) of {} were left out of the model",
                    report.skipped.len(),
                    table
                );
            }
            Ok(_) => {}
            Err(SessionError::SemanticModel(SemanticModelError::TableLimit(limit))) => {
                warn!("Table limit of {} reached, ignoring remaining tables", limit);
                break;
            }
            Err(e) => {
                error!("Failed to add table {}: {}", table, e);
                process::exit(1);
            }
        }
    }

    let local_store = LocalStageStore::new(&local_config.output_dir);
    let path = session.download(&local_store).await?;
    info!("Semantic model written to {}", path.display());

    if let Some((database, schema, stage)) = stage {
        let s3_config = S3Config::new().map_err(|e| {
            error!("Failed to initialize S3 config: {}", e);
            e
        })?;
        let store = S3StageStore::new(s3_config).await;
        let file = session
            .upload(&store, &database, &schema, &stage, Local::now().naive_local())
            .await?;
        println!("{}", file.reference());
    }

    print!("{}", session.yaml());
    Ok(())
}
