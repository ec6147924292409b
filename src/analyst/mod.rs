pub mod conversation;

use crate::config::AnalystConfig;
use crate::data_store::CatalogError;
use crate::sql_parser::SqlParserError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use conversation::{Conversation, Reply, StatementResult};

pub const MESSAGE_PATH: &str = "/api/v2/cortex/analyst/message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Analyst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
    Suggestions { suggestions: Vec<String> },
    Sql { statement: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: &str) -> Self {
        Message {
            role: Role::User,
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    pub fn suggestions(&self) -> impl Iterator<Item = &String> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Suggestions { suggestions } => Some(suggestions),
                _ => None,
            })
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub messages: Vec<Message>,
    /// Stage reference of the semantic model, `@db.schema.stage/file.yaml`
    pub semantic_model_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Conversational query service answering questions about a semantic model
#[async_trait]
pub trait AnalystClient: Send + Sync {
    async fn send(&self, request: &MessageRequest) -> Result<MessageResponse, AnalystError>;
}

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed request with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No semantic model has been uploaded")]
    NoSemanticModel,

    #[error("Rejected SQL: {0}")]
    Sql(#[from] SqlParserError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// [`AnalystClient`] calling the REST endpoint with a bearer token
pub struct RestAnalystClient {
    client: Client,
    url: String,
    token: String,
    token_type: String,
}

impl RestAnalystClient {
    pub fn new(config: &AnalystConfig) -> Result<Self, AnalystError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(RestAnalystClient {
            client,
            url: format!("{}{}", config.url(), MESSAGE_PATH),
            token: config.token.clone(),
            token_type: config.token_type.clone(),
        })
    }
}

#[async_trait]
impl AnalystClient for RestAnalystClient {
    async fn send(&self, request: &MessageRequest) -> Result<MessageResponse, AnalystError> {
        debug!(
            "Sending {} message(s) for {}",
            request.messages.len(),
            request.semantic_model_file
        );
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header("X-Snowflake-Authorization-Token-Type", &self.token_type)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status.as_u16() >= 400 {
            return Err(AnalystError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
