//! taskrouter - command interpretation and dispatch pipeline
//!
//! Routes a free-text request to an agent, then to one deterministic tool
//! that acts on content memory, an employee database or a mail transport.
//!
//! # Architecture
//!
//! - **llm**: generation client, classifier, retry
//! - **extraction**: free text to `(field, identifier, value)` commands
//! - **memory**: single-slot content store
//! - **tools**: tool registry and the five handlers
//! - **agent**: routing state machine, agents, orchestrator
//! - **server** / **cli**: HTTP and console front ends

pub mod errors;
pub mod deadline;
pub mod extraction;
pub mod memory;
pub mod llm;
pub mod storage;
pub mod mail;
pub mod tools;
pub mod agent;
pub mod server;
pub mod config;
pub mod cli;

// Re-export commonly used types
pub use errors::{DispatchError, Result};
pub use agent::{DispatchResponse, Orchestrator};
