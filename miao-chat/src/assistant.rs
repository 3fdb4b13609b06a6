use crate::client::ChatCompletion;
use crate::error::Result;
use crate::message::{ChatMessage, MessageSource};
use crate::prompt::PromptBuilder;
use crate::session::Session;
use miao_knowledge::{DEFAULT_THRESHOLD, KnowledgeMatch, KnowledgeSearch, find_best_match};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_TOP_K: usize = 3;

/// The result of one question.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub reply: ChatMessage,
    /// The knowledge entry the reply was grounded on, if any
    pub knowledge: Option<KnowledgeMatch>,
}

/// Knowledge lookup, prompt assembly and completion for one session at a time.
#[derive(Clone)]
pub struct Assistant {
    search: Arc<dyn KnowledgeSearch>,
    completion: Arc<dyn ChatCompletion>,
    prompt: PromptBuilder,
    threshold: f64,
    top_k: usize,
}

impl Assistant {
    pub fn new(search: Arc<dyn KnowledgeSearch>, completion: Arc<dyn ChatCompletion>) -> Self {
        Self {
            search,
            completion,
            prompt: PromptBuilder::default(),
            threshold: DEFAULT_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn prompt(&self) -> &PromptBuilder {
        &self.prompt
    }

    pub fn set_multi_turn(&mut self, multi_turn: bool) {
        self.prompt = self.prompt.clone().with_multi_turn(multi_turn);
    }

    /// Look up knowledge for `query` without calling the LLM.
    pub async fn lookup(&self, query: &str) -> Option<KnowledgeMatch> {
        find_best_match(self.search.as_ref(), query, self.top_k, self.threshold).await
    }

    /// Ask a question within `session`.
    ///
    /// Returns `Ok(None)` for blank input. The user message is recorded before
    /// the completion call, so it stays in the session even when that call
    /// fails; the reply is appended only on success.
    pub async fn ask(&self, session: &mut Session, input: &str) -> Result<Option<AskOutcome>> {
        let content = normalize_whitespace(input);
        if content.is_empty() {
            return Ok(None);
        }

        session.push(ChatMessage::user(content.clone()));

        let knowledge = self.lookup(&content).await;
        match &knowledge {
            Some(matched) => info!("Knowledge hit: {}", matched.question),
            None => debug!("No knowledge match for '{}'", content),
        }

        let messages = self.prompt.build(session.messages(), knowledge.as_ref());
        let reply_text = self.completion.complete(&messages).await?;

        let source = if knowledge.is_some() {
            MessageSource::KnowledgeBase
        } else {
            MessageSource::Llm
        };
        let reply = ChatMessage::assistant(reply_text, source);
        session.push(reply.clone());

        Ok(Some(AskOutcome { reply, knowledge }))
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
