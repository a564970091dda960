//! Single-slot content store
//!
//! Holds at most one text blob. `store` replaces it in full (no merge, no
//! history), `read` returns a copy, `reset` empties the slot. The slot sits
//! behind an `RwLock` so concurrent requests serialize on it; the last writer
//! still wins.

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Stored blob with its arrival time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    pub text: String,
    pub stored_at: DateTime<Utc>,
}

/// Process-wide (or per-session) content memory
#[derive(Debug, Default)]
pub struct ContentMemory {
    slot: RwLock<Option<StoredContent>>,
}

impl ContentMemory {
    /// Create an empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty memory ready to be shared between handlers
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Overwrite the slot with `text`
    pub fn store(&self, text: impl Into<String>) {
        let content = StoredContent {
            text: text.into(),
            stored_at: Utc::now(),
        };
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(content);
    }

    /// Current text, `None` when nothing has been stored
    pub fn read(&self) -> Option<String> {
        self.snapshot().map(|content| content.text)
    }

    /// Current text with metadata
    pub fn snapshot(&self) -> Option<StoredContent> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Empty the slot
    pub fn reset(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Whether nothing (or only empty text) is stored
    pub fn is_empty(&self) -> bool {
        self.read().map_or(true, |text| text.is_empty())
    }
}
