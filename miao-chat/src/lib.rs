//! # miao-chat
//!
//! The chat side of miao: every question is first matched against the local
//! knowledge base, then sent to an OpenAI-compatible completion API together
//! with either the matched answer or a "no match" note.
//!
//! ## Features
//!
//! - **Knowledge Augmentation**: Hits from any `miao-knowledge` backend are
//!   injected into the prompt; misses and retrieval failures are not errors
//! - **Multi-Turn Mode**: Optionally send the last ten messages of history
//! - **Sessions**: In-memory conversations titled after their first question
//!
//! ## Quick Start
//!
//! ```no_run
//! use miao_chat::{Assistant, ChatClient, ChatConfig, Session};
//! use miao_knowledge::{KnowledgeBase, LexicalSearch};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let search = Arc::new(LexicalSearch::new(Arc::new(KnowledgeBase::sample())));
//! let client = Arc::new(ChatClient::new(&ChatConfig::from_env())?);
//! let assistant = Assistant::new(search, client);
//!
//! let mut session = Session::with_greeting();
//! if let Some(outcome) = assistant.ask(&mut session, "什么是人工智能？").await? {
//!     println!("{}", outcome.reply.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod prompt;
pub mod session;

pub use assistant::{AskOutcome, Assistant};
pub use client::{ChatClient, ChatCompletion};
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use message::{ChatMessage, MessageSource, Role};
pub use prompt::{PromptBuilder, PromptMessage};
pub use session::{Session, SessionList};
