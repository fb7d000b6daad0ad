//! LLM provider implementations

mod openai;

pub use openai::{OpenAiProvider, GROQ_BASE_URL};
