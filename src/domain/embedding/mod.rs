//! Embedding domain - text to fixed-size vectors

mod provider;

pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
