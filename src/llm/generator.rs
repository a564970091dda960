//! Text generation collaborator seam

use crate::errors::Result;
use async_trait::async_trait;

/// Opaque text-in / text-out generation service
///
/// Used both for label classification and for answer composition.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;
}
