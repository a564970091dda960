//! Language model collaborators
//!
//! Generation client, classifier client and the retry policy they share.

pub mod generator;
pub mod client;
pub mod retry;
pub mod classifier;

// Re-export commonly used types
pub use generator::TextGenerator;
pub use client::{OllamaClient, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use retry::RetryManager;
pub use classifier::{normalize_label, Classifier, Label};
