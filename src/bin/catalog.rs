use log::error;
use std::env;

use eqtble_semantic::{
    config::SnowflakeConfig,
    data_store::{Catalog, SnowflakeCatalog},
};

/// `catalog` lists databases, `catalog DB` its schemas,
/// `catalog DB SCHEMA` its tables and stages.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let snowflake_config = SnowflakeConfig::new().map_err(|e| {
        error!("Failed to initialize Snowflake config: {}", e);
        e
    })?;

    let catalog = SnowflakeCatalog::connect(snowflake_config)
        .await
        .map_err(|e| {
            error!("Failed to create SnowflakeCatalog: {}", e);
            e
        })?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            for database in catalog.list_databases().await? {
                println!("{}", database);
            }
        }
        [database] => {
            for schema in catalog.list_schemas(database).await? {
                println!("{}", schema);
            }
        }
        [database, schema, ..] => {
            for table in catalog.list_tables(database, schema).await? {
                println!("table\t{}", table);
            }
            for stage in catalog.list_stages(database, schema).await? {
                println!("stage\t{}", stage);
            }
        }
    }

    Ok(())
}
