use crate::error::{ChatError, Result};
use crate::message::{ChatMessage, MessageSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "新对话";
pub const TITLE_CHARS: usize = 10;
pub const GREETING: &str =
    "你好喵！本喵是你的知识助手。输入问题后我会结合本地知识库的内容回答你的问题喵！";

/// One conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// A new session opened by the assistant's greeting.
    pub fn with_greeting() -> Self {
        let mut session = Self::new();
        session.push(ChatMessage::assistant(GREETING, MessageSource::Llm));
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message. The first user message names an untitled session.
    pub fn push(&mut self, message: ChatMessage) {
        if self.title == DEFAULT_TITLE && message.is_user() {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.title = DEFAULT_TITLE.to_string();
    }
}

/// First [`TITLE_CHARS`] characters of `content`, with `...` when truncated.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// In-memory list of sessions, newest first, with one current session.
///
/// The list is never empty: deleting the last session opens a fresh one.
#[derive(Debug, Clone)]
pub struct SessionList {
    sessions: Vec<Session>,
    current: usize,
}

impl Default for SessionList {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionList {
    pub fn new() -> Self {
        Self {
            sessions: vec![Session::with_greeting()],
            current: 0,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current(&self) -> &Session {
        &self.sessions[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Session {
        &mut self.sessions[self.current]
    }

    /// Open a new session at the top of the list and make it current.
    pub fn create(&mut self) -> &mut Session {
        self.sessions.insert(0, Session::with_greeting());
        self.current = 0;
        &mut self.sessions[0]
    }

    pub fn select(&mut self, id: &str) -> Result<&mut Session> {
        let index = self.position(id)?;
        self.current = index;
        Ok(&mut self.sessions[index])
    }

    /// Remove a session. Deleting the current one selects the first remaining.
    pub fn delete(&mut self, id: &str) -> Result<Session> {
        let index = self.position(id)?;
        let current_id = self.current().id.clone();
        let removed = self.sessions.remove(index);

        if self.sessions.is_empty() {
            self.sessions.push(Session::with_greeting());
            self.current = 0;
        } else if removed.id == current_id {
            self.current = 0;
        } else {
            self.current = self.position(&current_id)?;
        }
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ChatError::SessionNotFound { id: id.to_string() })
    }
}
