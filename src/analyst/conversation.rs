use super::{AnalystClient, AnalystError, ContentBlock, Message, MessageRequest};
use crate::data_store::{Catalog, QueryResult};
use crate::semantic_model::StageFile;
use crate::sql_parser::SqlParser;
use log::{debug, info};

/// Result of running one SQL block returned by the analyst
#[derive(Debug, Clone, PartialEq)]
pub struct StatementResult {
    pub statement: String,
    pub result: QueryResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: Vec<ContentBlock>,
    pub results: Vec<StatementResult>,
}

impl Reply {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Chat history with the analyst service for one session
#[derive(Default)]
pub struct Conversation {
    messages: Vec<Message>,
    active_suggestion: Option<String>,
    sql_parser: SqlParser,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Pick a suggestion offered in an earlier message to ask next
    pub fn select_suggestion(&mut self, message_index: usize, suggestion_index: usize) -> Option<&str> {
        let suggestion = self
            .messages
            .get(message_index)?
            .suggestions()
            .nth(suggestion_index)?
            .clone();
        self.active_suggestion = Some(suggestion);
        self.active_suggestion.as_deref()
    }

    pub fn take_suggestion(&mut self) -> Option<String> {
        self.active_suggestion.take()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.active_suggestion = None;
    }

    /// Ask `prompt` about the uploaded semantic model and run any SQL in the answer.
    ///
    /// Only the new question is sent; earlier turns stay local.
    pub async fn process_message<A, C>(
        &mut self,
        prompt: &str,
        semantic_file: Option<&StageFile>,
        client: &A,
        catalog: &C,
    ) -> Result<Reply, AnalystError>
    where
        A: AnalystClient,
        C: Catalog,
    {
        let semantic_file = semantic_file.ok_or(AnalystError::NoSemanticModel)?;

        let question = Message::user_text(prompt);
        self.messages.push(question.clone());

        info!("Asking analyst about {}: {}", semantic_file, prompt);
        let response = client
            .send(&MessageRequest {
                messages: vec![question],
                semantic_model_file: semantic_file.reference(),
            })
            .await?;

        let content = response.message.content.clone();
        self.messages.push(response.message);

        let mut results = Vec::new();
        for block in &content {
            if let ContentBlock::Sql { statement } = block {
                let statement = self.sql_parser.validate_read_only(statement)?;
                debug!("Running analyst SQL: {}", statement);
                let result = catalog.execute(statement).await?;
                results.push(StatementResult {
                    statement: statement.to_string(),
                    result,
                });
            }
        }

        Ok(Reply { content, results })
    }
}
