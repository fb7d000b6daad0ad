//! HTTP request and response types

pub mod error;
pub mod json;
pub mod rag;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::{Json, ValidatedJson};
pub use rag::{AskRequest, AskResponse, IngestTextRequest, RetrievedDocument};
