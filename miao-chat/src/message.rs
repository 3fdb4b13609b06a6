use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an assistant reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageSource {
    /// LLM reply grounded on a knowledge base hit
    KnowledgeBase,
    /// LLM reply without knowledge augmentation
    Llm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MessageSource>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            source: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>, source: MessageSource) -> Self {
        Self {
            source: Some(source),
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let user = ChatMessage::user("你好");
        assert!(user.is_user());
        assert!(user.source.is_none());

        let reply = ChatMessage::assistant("你好喵", MessageSource::Llm);
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.source, Some(MessageSource::Llm));
        assert_ne!(user.id, reply.id);
    }

    #[test]
    fn test_serialization_shape() {
        let reply = ChatMessage::assistant("hi", MessageSource::KnowledgeBase);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["source"], "knowledge-base");

        let user = serde_json::to_value(ChatMessage::user("q")).unwrap();
        assert!(user.get("source").is_none());
    }
}
