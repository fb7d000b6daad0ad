//! Per-slot store backend configuration

use serde::{Deserialize, Serialize};

use crate::domain::vector_store::StoreId;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";
pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";

/// Backend serving one store slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreBackendConfig {
    Qdrant {
        url: String,
        collection: String,
        #[serde(default)]
        api_key: Option<String>,
    },
    Chroma {
        url: String,
        collection: String,
        #[serde(default)]
        token: Option<String>,
    },
    InMemory,
}

impl StoreBackendConfig {
    pub fn qdrant(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::Qdrant {
            url: url.into(),
            collection: collection.into(),
            api_key: None,
        }
    }

    pub fn chroma(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::Chroma {
            url: url.into(),
            collection: collection.into(),
            token: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Qdrant { .. } => "qdrant",
            Self::Chroma { .. } => "chroma",
            Self::InMemory => "in_memory",
        }
    }
}

/// Backends for both slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoresConfig {
    #[serde(default = "default_store_a")]
    pub a: StoreBackendConfig,
    #[serde(default = "default_store_b")]
    pub b: StoreBackendConfig,
}

impl StoresConfig {
    pub fn for_slot(&self, id: StoreId) -> &StoreBackendConfig {
        match id {
            StoreId::A => &self.a,
            StoreId::B => &self.b,
        }
    }
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            a: default_store_a(),
            b: default_store_b(),
        }
    }
}

fn default_store_a() -> StoreBackendConfig {
    StoreBackendConfig::qdrant(DEFAULT_QDRANT_URL, "healthcare")
}

fn default_store_b() -> StoreBackendConfig {
    StoreBackendConfig::chroma(DEFAULT_CHROMA_URL, "engineering")
}
