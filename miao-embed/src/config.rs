//! Configuration for embedding models

use crate::error::{EmbedError, Result};
use derive_builder::Builder;
use fastembed::EmbeddingModel;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Model used when nothing else is configured; small, English-centric.
pub const DEFAULT_MODEL: &str = "all-minilm-l6-v2";

/// Chinese-optimised alternative, suited to CJK knowledge bases.
pub const CHINESE_MODEL: &str = "bge-small-zh-v1.5";

/// Multilingual alternative for mixed-language knowledge bases.
pub const MULTILINGUAL_MODEL: &str = "multilingual-e5-small";

/// Configuration for embedding models
#[derive(Debug, Clone, Builder, Serialize)]
#[builder(setter(into))]
pub struct EmbedConfig {
    /// Name of the embedding model to use (see [`EmbedConfig::fastembed_model`])
    pub model_name: String,
    /// Directory where downloaded ONNX models are cached
    #[builder(default = r#"PathBuf::from("models")"#)]
    pub cache_dir: PathBuf,
    /// Maximum batch size for embedding generation
    #[builder(default = "16")]
    pub batch_size: usize,
    /// Whether to L2-normalize embeddings after conversion to f16
    #[builder(default = "true")]
    pub normalize: bool,
    /// Show a progress bar while fastembed downloads model files
    #[builder(default = "false")]
    pub show_download_progress: bool,
}

impl EmbedConfig {
    /// Create a new embedding configuration using the builder
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder::default()
    }

    /// Create a configuration for the named model with default settings
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            cache_dir: PathBuf::from("models"),
            batch_size: 16,
            normalize: true,
            show_download_progress: false,
        }
    }

    /// Create the default configuration with a specific cache directory
    pub fn default_with_path<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self::new(DEFAULT_MODEL).with_cache_dir(cache_dir)
    }

    /// Create a configuration for the Chinese BGE small model
    pub fn bge_small_zh<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self::new(CHINESE_MODEL).with_cache_dir(cache_dir)
    }

    /// Set the batch size for embedding generation (builder style)
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Set whether to normalize embeddings (builder style)
    pub fn with_normalize(self, normalize: bool) -> Self {
        Self { normalize, ..self }
    }

    /// Set the model cache directory (builder style)
    pub fn with_cache_dir<P: AsRef<Path>>(self, cache_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Map the configured model name to a fastembed model.
    ///
    /// Names are matched case-insensitively and accept `_` in place of `-`.
    pub fn fastembed_model(&self) -> Result<EmbeddingModel> {
        let key = self.model_name.to_lowercase().replace('_', "-");
        match key.as_str() {
            "all-minilm-l6-v2" | "allminilml6v2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "bge-small-zh-v1.5" | "bge-small-zh" => Ok(EmbeddingModel::BGESmallZHV15),
            "multilingual-e5-small" | "e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
            _ => Err(EmbedError::unknown_model(&self.model_name)),
        }
    }

    /// Validate the configuration without loading any model
    pub fn validate(&self) -> Result<()> {
        self.fastembed_model()?;
        if self.batch_size == 0 {
            return Err(EmbedError::invalid_config("batch_size must be at least 1"));
        }
        tracing::debug!("Embedding config validation successful for: {}", self.model_name);
        Ok(())
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_creation() {
        let temp_dir = tempdir().unwrap();
        let config = EmbedConfig::default_with_path(temp_dir.path());

        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.batch_size, 16);
        assert!(config.normalize);
        assert_eq!(config.cache_dir, temp_dir.path());
    }

    #[test]
    fn test_config_builder_methods() {
        let config = EmbedConfig::default()
            .with_batch_size(64)
            .with_normalize(false)
            .with_cache_dir("/tmp/miao-models");

        assert_eq!(config.batch_size, 64);
        assert!(!config.normalize);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/miao-models"));
    }

    #[test]
    fn test_derive_builder_pattern() {
        let temp_dir = tempdir().unwrap();

        let config = EmbedConfig::builder()
            .cache_dir(temp_dir.path())
            .model_name(CHINESE_MODEL)
            .batch_size(4usize)
            .normalize(false)
            .build()
            .unwrap();

        assert_eq!(config.model_name, CHINESE_MODEL);
        assert_eq!(config.batch_size, 4);
        assert!(!config.normalize);
        assert!(!config.show_download_progress);
    }

    #[test]
    fn test_builder_defaults() {
        let config = EmbedConfig::builder()
            .model_name("all-minilm-l6-v2")
            .build()
            .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("models"));
        assert_eq!(config.batch_size, 16);
        assert!(config.normalize);
    }

    #[test]
    fn test_builder_requires_model_name() {
        assert!(EmbedConfig::builder().build().is_err());
    }

    #[test]
    fn test_fastembed_model_mapping() {
        assert!(matches!(
            EmbedConfig::new("All_MiniLM_L6_v2").fastembed_model(),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            EmbedConfig::bge_small_zh("models").fastembed_model(),
            Ok(EmbeddingModel::BGESmallZHV15)
        ));
        assert!(matches!(
            EmbedConfig::new(MULTILINGUAL_MODEL).fastembed_model(),
            Ok(EmbeddingModel::MultilingualE5Small)
        ));
        assert!(matches!(
            EmbedConfig::new("word2vec").fastembed_model(),
            Err(EmbedError::UnknownModel { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(EmbedConfig::default().validate().is_ok());
        assert!(EmbedConfig::default().with_batch_size(0).validate().is_err());
        assert!(EmbedConfig::new("nope").validate().is_err());
    }
}
