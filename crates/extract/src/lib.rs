pub mod config;
pub mod error;
pub mod llm;
pub mod normalizer;
pub mod prompt;
pub mod schema;
pub mod workflow;

pub use config::{ModelConfig, ModelEndpoint};
pub use error::{ConfigError, LlmError, WorkflowError};
pub use llm::{ChatBackend, ChatMessage, ChatRequest, OllamaClient, Role};
pub use normalizer::OutputNormalizer;
pub use schema::{ExtractionRecord, FieldSpec};
pub use workflow::{Envelope, Extraction, IncidentWorkflow, Status};
