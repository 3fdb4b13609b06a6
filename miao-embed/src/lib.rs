//! # miao-embed
//!
//! Text embeddings for the semantic variant of miao's knowledge search. The
//! lexical scorer in `miao-knowledge` needs no model at all; this crate is only
//! pulled in when a deployment wants to rank knowledge entries by embedding
//! similarity instead.
//!
//! ## Features
//!
//! - **Local ONNX Models**: Run embedding models locally through FastEmbed
//! - **Async-First Design**: Inference runs on tokio's blocking pool
//! - **Model Caching**: Loaded models are shared between providers with the same config
//! - **Half-Precision**: Embeddings are stored as f16 to keep memory small
//!
//! ## Quick Start
//!
//! ```no_run
//! use miao_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider, cosine_similarity};
//!
//! # async fn example() -> miao_embed::Result<()> {
//! let provider = FastEmbedProvider::create(EmbedConfig::bge_small_zh("models")).await?;
//!
//! let a = provider.embed_text("什么是人工智能？").await?;
//! let b = provider.embed_text("人工智能的定义").await?;
//! println!("similarity = {:.3}", cosine_similarity(&a, &b));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`]: Model selection and batching configuration
//! - [`provider`]: The [`EmbeddingProvider`] trait and the FastEmbed implementation
//! - [`error`]: Error types and result handling

pub mod config;
pub mod error;
pub mod provider;

// Re-export main types for easy access
pub use config::{EmbedConfig, EmbedConfigBuilder};
pub use error::{EmbedError, Result};
pub use provider::{EmbeddingProvider, EmbeddingResult, FastEmbedProvider, cosine_similarity};
