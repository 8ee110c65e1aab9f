//! Infrastructure layer: database, model provider, configuration.
//!
//! Implements the seams declared by `salesadvisor-ai`:
//! - [`read_model`]: `SalesDataSource` over PostgreSQL or in memory.
//! - [`external`]: `TextGenerator` over an OpenAI-compatible chat API.
//! - [`config`]: process settings loaded from the environment.

pub mod config;
pub mod external;
pub mod read_model;

pub use config::{ConfigError, Settings};
pub use external::{OpenAiConfig, OpenAiGenerator};
pub use read_model::{InMemorySalesSource, PostgresSalesSource};
