//! CLI module for taskrouter
//!
//! Handles command-line argument parsing and the interactive console.

pub mod args;
pub mod chat;

pub use args::{Args, ChatTarget, Commands};
pub use chat::{ChatLine, ChatSession};
