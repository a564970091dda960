//! Classifier client
//!
//! Turns a decision prompt into one label from a closed set. A model reply
//! that matches no label is a value (`Label::Unrecognized`), never an error;
//! only transport failures surface as `ClassifierUnavailable`.

use crate::deadline::with_deadline;
use crate::errors::{DispatchError, Result};
use crate::llm::generator::TextGenerator;
use crate::llm::retry::RetryManager;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-call classification deadline
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(20);

/// Classification outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Canonical member of the label set
    Recognized(String),

    /// Raw model text that matched nothing
    Unrecognized(String),
}

impl Label {
    pub fn is_recognized(&self) -> bool {
        matches!(self, Label::Recognized(_))
    }
}

/// Normalize raw model text against the label set
///
/// Only the whole reply counts: it is trimmed, stripped of surrounding quotes
/// and trailing punctuation, then compared case-folded against each label.
/// Prose that merely mentions a label stays unrecognized.
pub fn normalize_label(raw: &str, labels: &[String]) -> Label {
    let candidate = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*'))
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | ',' | ':'))
        .trim()
        .to_lowercase();

    if candidate.is_empty() {
        return Label::Unrecognized(raw.to_string());
    }

    match labels.iter().find(|l| l.to_lowercase() == candidate) {
        Some(label) => Label::Recognized(label.clone()),
        None => Label::Unrecognized(raw.to_string()),
    }
}

/// Stateless classifier over a text generator
#[derive(Clone)]
pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
    retry: RetryManager,
    timeout: Duration,
}

impl Classifier {
    /// Create classifier with default retry and deadline
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_config(generator, RetryManager::new(), DEFAULT_CLASSIFY_TIMEOUT)
    }

    pub fn with_config(
        generator: Arc<dyn TextGenerator>,
        retry: RetryManager,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            retry,
            timeout,
        }
    }

    /// Classify `prompt` into one of `labels`
    pub async fn classify(&self, prompt: &str, labels: &[String]) -> Result<Label> {
        let raw = self
            .retry
            .execute_with_retry(|| {
                with_deadline("classification", self.timeout, self.generator.generate(prompt))
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "classifier unavailable");
                DispatchError::ClassifierUnavailable(e.to_string())
            })?;

        let label = normalize_label(&raw, labels);
        debug!(raw = %raw.trim(), label = ?label, "classified");
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quickcheck_macros::quickcheck;
    use std::sync::Mutex;

    fn labels() -> Vec<String> {
        vec!["StoreContent".into(), "SendMail".into(), "Answer".into()]
    }

    struct Replies(Mutex<Vec<Result<String>>>);

    #[async_trait]
    impl TextGenerator for Replies {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn classifier(replies: Vec<Result<String>>) -> Classifier {
        Classifier::with_config(
            Arc::new(Replies(Mutex::new(replies))),
            RetryManager::with_config(2, 1),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_exact_match_is_case_folded() {
        assert_eq!(
            normalize_label("  sendmail\n", &labels()),
            Label::Recognized("SendMail".into())
        );
    }

    #[test]
    fn test_quotes_and_punctuation_stripped() {
        assert_eq!(
            normalize_label("\"Answer\".", &labels()),
            Label::Recognized("Answer".into())
        );
    }

    #[test]
    fn test_prose_mentioning_a_label_is_unrecognized() {
        for raw in [
            "Sorry, I cannot answer that request.",
            "I would pick StoreContent for this",
            "either SendMail or Answer",
        ] {
            assert_eq!(
                normalize_label(raw, &labels()),
                Label::Unrecognized(raw.to_string())
            );
        }
    }

    #[test]
    fn test_gibberish_unrecognized_keeps_raw_text() {
        assert_eq!(
            normalize_label("qwzx blorp", &labels()),
            Label::Unrecognized("qwzx blorp".to_string())
        );
    }

    #[quickcheck]
    fn prop_label_always_in_set_or_unrecognized(raw: String) -> bool {
        match normalize_label(&raw, &labels()) {
            Label::Recognized(label) => labels().contains(&label),
            Label::Unrecognized(text) => text == raw,
        }
    }

    #[tokio::test]
    async fn test_classify_retries_transport_failure_once() {
        let classifier = classifier(vec![
            Err(DispatchError::LlmApi("HTTP 503".into())),
            Ok("Answer".into()),
        ]);
        let label = classifier.classify("prompt", &labels()).await.unwrap();
        assert_eq!(label, Label::Recognized("Answer".into()));
    }

    #[tokio::test]
    async fn test_classify_surfaces_unavailable_after_retry() {
        let classifier = classifier(vec![
            Err(DispatchError::LlmApi("HTTP 503".into())),
            Err(DispatchError::LlmApi("HTTP 503".into())),
        ]);
        let err = classifier.classify("prompt", &labels()).await.unwrap_err();
        assert!(matches!(err, DispatchError::ClassifierUnavailable(_)));
    }

    #[tokio::test]
    async fn test_mismatch_is_not_an_error() {
        let classifier = classifier(vec![Ok("no idea".into())]);
        let label = classifier.classify("prompt", &labels()).await.unwrap();
        assert!(!label.is_recognized());
    }
}
