//! Vector store domain - retrieved documents, store slots and the store contract

mod document;
mod registry;
mod store;

pub use document::{Document, ScoreOrientation, SOURCE_KEY, UNKNOWN_SOURCE};
pub use registry::{StaticStoreRegistry, StoreRegistry};
pub use store::{StoreId, UpsertBatch, VectorStore};

#[cfg(test)]
pub use store::mock::MockVectorStore;
