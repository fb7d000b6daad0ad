use std::path::Path;

use serde::Deserialize;

use crate::domain::agent::WorkflowConfig;
use crate::domain::ingestion::IngestionConfig;
use crate::domain::DomainError;
use crate::infrastructure::llm::GROQ_BASE_URL;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::vector_store::StoresConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub stores: StoresConfig,
    pub workflow: WorkflowConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat model used by the classifier, validator and generator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

/// OpenAI-compatible embeddings endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            api_key: None,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default.*`, `config/local.*`, an optional explicit file,
    /// then `APP__*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.workflow.top_k == 0 {
            return Err(DomainError::configuration("workflow.top_k must be greater than 0"));
        }

        if self.workflow.step_timeout_ms == 0 {
            return Err(DomainError::configuration(
                "workflow.step_timeout_ms must be greater than 0",
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding.dimensions must be greater than 0",
            ));
        }

        self.ingestion
            .chunking()
            .validate()
            .map_err(|e| DomainError::configuration(format!("ingestion: {}", e)))?;

        if self.ingestion.classify_sample_chars == 0 {
            return Err(DomainError::configuration(
                "ingestion.classify_sample_chars must be greater than 0",
            ));
        }

        Ok(())
    }

    /// API key for the chat model, failing when unset
    pub fn llm_api_key(&self) -> Result<&str, DomainError> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("llm.api_key is not set (APP__LLM__API_KEY)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vector_store::StoreId;
    use crate::infrastructure::vector_store::StoreBackendConfig;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.workflow.max_iterations, 3);
        assert_eq!(config.workflow.top_k, 3);
        assert_eq!(config.ingestion.chunk_size, 500);
        assert_eq!(config.ingestion.chunk_overlap, 50);
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.base_url, GROQ_BASE_URL);
        assert_eq!(config.stores.for_slot(StoreId::A).backend_name(), "qdrant");
        assert_eq!(
            config.stores.for_slot(StoreId::B),
            &StoreBackendConfig::chroma("http://localhost:8000", "engineering")
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.workflow.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ingestion.chunk_overlap = config.ingestion.chunk_size;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ingestion.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.embedding.dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.llm_api_key(),
            Err(DomainError::Configuration { .. })
        ));

        config.llm.api_key = Some("gsk_test".to_string());
        assert_eq!(config.llm_api_key().unwrap(), "gsk_test");
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[workflow]
max_iterations = 5

[stores.a]
backend = "in_memory"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.workflow.max_iterations, 5);
        assert_eq!(config.workflow.top_k, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.stores.for_slot(StoreId::A), &StoreBackendConfig::InMemory);
        assert_eq!(config.stores.for_slot(StoreId::B).backend_name(), "chroma");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/agentic-rag.toml")));
        assert!(result.is_err());
    }
}
