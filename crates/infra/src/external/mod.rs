//! External service clients/adapters.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiGenerator};
