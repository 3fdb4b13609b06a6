//! Prompt assembly for knowledge-augmented completions.
//!
//! A prompt is laid out as:
//!
//! ```text
//! system   SYSTEM_PROMPT
//! ...      history window (last N messages, or only the latest one)
//! user     knowledge hit / miss instruction
//! user     merge instruction
//! ```

use crate::message::{ChatMessage, Role};
use miao_knowledge::KnowledgeMatch;
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "你是一名耐心的智能聊天助手，会参考用户提供的对话历史，使用清晰、友好以及少量的傲娇猫娘的语气回答。若问题涉及用户本地知识库提供的答案，应优先沿用该答案的表述。每句话结尾都要有喵。";

pub const KNOWLEDGE_HIT_PREFIX: &str = "知识库命中答案：";
pub const KNOWLEDGE_MISS: &str = "知识库未命中：未找到相关内容。";
pub const MERGE_INSTRUCTION: &str = "请输出一条合并后的最终回复：\n1) 若提供了知识库命中答案，请优先复用其表述，并在必要处进行简洁补充；\n2) 若知识库未命中，请先用一句话说明未命中，然后直接给出回答；\n3) 全文语气保持清晰友好并带一点傲娇猫娘风，整段话必须以喵结尾。";

/// A message in the wire format of OpenAI-compatible chat APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptMessage {
    /// Only assistant messages keep their role; everything else is sent as user.
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            Role::Assistant => Role::Assistant,
            Role::User | Role::System => Role::User,
        };
        Self::new(role, message.content.clone())
    }
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    multi_turn: bool,
    history_window: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            multi_turn: false,
            history_window: crate::config::DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_multi_turn(mut self, multi_turn: bool) -> Self {
        self.multi_turn = multi_turn;
        self
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window.max(1);
        self
    }

    pub fn multi_turn(&self) -> bool {
        self.multi_turn
    }

    /// The messages of `history` that go into the prompt.
    pub fn window<'a>(&self, history: &'a [ChatMessage]) -> &'a [ChatMessage] {
        let keep = if self.multi_turn { self.history_window } else { 1 };
        &history[history.len().saturating_sub(keep)..]
    }

    pub fn build(
        &self,
        history: &[ChatMessage],
        knowledge: Option<&KnowledgeMatch>,
    ) -> Vec<PromptMessage> {
        let window = self.window(history);
        let mut messages = Vec::with_capacity(window.len() + 3);

        messages.push(PromptMessage::new(Role::System, self.system_prompt.clone()));
        messages.extend(window.iter().map(PromptMessage::from));
        messages.push(PromptMessage::new(Role::User, knowledge_instruction(knowledge)));
        messages.push(PromptMessage::new(Role::User, MERGE_INSTRUCTION));
        messages
    }
}

pub fn knowledge_instruction(knowledge: Option<&KnowledgeMatch>) -> String {
    match knowledge {
        Some(matched) => format!("{KNOWLEDGE_HIT_PREFIX}{}", matched.answer),
        None => KNOWLEDGE_MISS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageSource;
    use std::collections::BTreeSet;

    fn history(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("q{i}"))
                } else {
                    ChatMessage::assistant(format!("a{i}"), MessageSource::Llm)
                }
            })
            .collect()
    }

    fn knowledge() -> KnowledgeMatch {
        KnowledgeMatch {
            question: "什么是人工智能？".to_string(),
            answer: "人工智能是计算机科学的一个分支。".to_string(),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn test_single_turn_keeps_last_message() {
        let prompt = PromptBuilder::new().build(&history(5), None);
        assert_eq!(prompt.len(), 4);
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[0].content, SYSTEM_PROMPT);
        assert_eq!(prompt[1].content, "q4");
        assert_eq!(prompt[2].content, KNOWLEDGE_MISS);
        assert_eq!(prompt[3].content, MERGE_INSTRUCTION);
    }

    #[test]
    fn test_multi_turn_window() {
        let builder = PromptBuilder::new().with_multi_turn(true);
        let prompt = builder.build(&history(14), None);
        assert_eq!(prompt.len(), 1 + 10 + 2);
        assert_eq!(prompt[1].content, "q4");
        assert_eq!(prompt[1].role, Role::User);
        assert_eq!(prompt[2].role, Role::Assistant);
        assert_eq!(prompt[10].content, "a13");

        let short = builder.build(&history(3), None);
        assert_eq!(short.len(), 1 + 3 + 2);
    }

    #[test]
    fn test_knowledge_hit_instruction() {
        let matched = knowledge();
        let prompt = PromptBuilder::new().build(&history(1), Some(&matched));
        assert_eq!(
            prompt[2].content,
            "知识库命中答案：人工智能是计算机科学的一个分支。"
        );
        assert_eq!(prompt[2].role, Role::User);
    }

    #[test]
    fn test_empty_history() {
        let prompt = PromptBuilder::new().with_multi_turn(true).build(&[], None);
        assert_eq!(prompt.len(), 3);
    }

    #[test]
    fn test_custom_system_prompt_and_window() {
        let builder = PromptBuilder::new()
            .with_system_prompt("be brief")
            .with_multi_turn(true)
            .with_history_window(2);
        let prompt = builder.build(&history(6), None);
        assert_eq!(prompt[0].content, "be brief");
        assert_eq!(prompt.len(), 1 + 2 + 2);
        assert_eq!(prompt[1].content, "q4");
    }

    #[test]
    fn test_system_history_is_sent_as_user() {
        let message = ChatMessage::new(Role::System, "note");
        assert_eq!(PromptMessage::from(&message).role, Role::User);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(PromptMessage::new(Role::Assistant, "hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }
}
