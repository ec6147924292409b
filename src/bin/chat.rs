use log::error;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};

use eqtble_semantic::{
    analyst::{ContentBlock, Reply, RestAnalystClient},
    config::{AnalystConfig, ChatConfig, SnowflakeConfig},
    data_store::{QueryResult, SnowflakeCatalog},
    semantic_model::StageFile,
    Session,
};

fn print_result(result: &QueryResult) {
    println!("{}", result.columns.join("\t"));
    for row in &result.rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("NULL"))
            .collect();
        println!("{}", cells.join("\t"));
    }
    if let Some(index) = result.chart_index() {
        println!("(chartable by {})", index);
    }
}

fn print_reply(reply: &Reply) {
    for block in &reply.content {
        match block {
            ContentBlock::Text { text } => println!("{}", text),
            ContentBlock::Suggestions { suggestions } => {
                for (i, suggestion) in suggestions.iter().enumerate() {
                    println!("  :{} {}", i + 1, suggestion);
                }
            }
            ContentBlock::Sql { statement } => println!("```sql\n{}\n```", statement),
            ContentBlock::Unknown => {}
        }
    }
    for result in &reply.results {
        print_result(&result.result);
    }
}

/// Reads one question per line from stdin. `:N` asks suggestion N of the last answer.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let chat_config = ChatConfig::new().map_err(|e| {
        error!("Failed to initialize chat config: {}", e);
        e
    })?;

    let analyst_config = AnalystConfig::new().map_err(|e| {
        error!("Failed to initialize analyst config: {}", e);
        e
    })?;

    let snowflake_config = SnowflakeConfig::new().map_err(|e| {
        error!("Failed to initialize Snowflake config: {}", e);
        e
    })?;

    let semantic_file: StageFile = chat_config.semantic_model_file.parse().map_err(|e| {
        error!("Invalid SEMANTIC_MODEL_FILE: {}", e);
        e
    })?;

    let client = RestAnalystClient::new(&analyst_config)?;
    let catalog = SnowflakeCatalog::connect(snowflake_config).await?;

    let mut session = Session::new();
    session.use_semantic_file(semantic_file);
    println!("Semantic Model: `{}`", chat_config.semantic_model_file);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match line.strip_prefix(':').and_then(|n| n.parse::<usize>().ok()) {
            Some(n) => {
                let last = session.conversation().messages().len().saturating_sub(1);
                if session
                    .conversation_mut()
                    .select_suggestion(last, n.saturating_sub(1))
                    .is_none()
                {
                    println!("No suggestion {}", n);
                    continue;
                }
                session.ask_active_suggestion(&client, &catalog).await
            }
            None => session.ask(line, &client, &catalog).await.map(Some),
        };

        match reply {
            Ok(Some(reply)) => print_reply(&reply),
            Ok(None) => {}
            Err(e) => {
                error!("Request failed: {}", e);
                process::exit(1);
            }
        }
    }

    Ok(())
}
