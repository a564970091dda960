//! Shared fakes for the integration suites

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskrouter::agent::{Collaborators, DispatchSettings, Orchestrator};
use taskrouter::errors::{DispatchError, Result};
use taskrouter::llm::TextGenerator;
use taskrouter::mail::MailTransport;
use taskrouter::memory::ContentMemory;
use taskrouter::storage::{Employee, SqliteEmployeeStore};

/// Generator that replays a script and records every prompt
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: &str) {
        self.replies.lock().unwrap().push(Ok(reply.to_string()));
    }

    pub fn push_error(&self, err: DispatchError) {
        self.replies.lock().unwrap().push(Err(err));
    }

    /// Hold every reply back by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(DispatchError::LlmApi("script exhausted".to_string()));
        }
        replies.remove(0)
    }
}

/// Mail transport that records deliveries
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, reason: &str) {
        *self.fail_with.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if let Some(reason) = self.fail_with.lock().unwrap().take() {
            return Err(DispatchError::Mail(reason));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// In-memory store with three employees
pub fn seeded_store() -> Arc<SqliteEmployeeStore> {
    let store = SqliteEmployeeStore::in_memory().unwrap();

    let mut sujoy = Employee::new(1, "Sujoy");
    sujoy.address = Some("Pune".to_string());
    sujoy.office = Some("Salt Lake".to_string());
    store.insert(&sujoy).unwrap();

    let mut sunita = Employee::new(2, "Sunita");
    sunita.phone_number = Some("9876543210".to_string());
    sunita.skill_set = Some("Rust, SQL".to_string());
    store.insert(&sunita).unwrap();

    let mut raktim = Employee::new(3, "Raktim");
    raktim.experience = Some("4 years".to_string());
    store.insert(&raktim).unwrap();

    Arc::new(store)
}

pub fn fast_settings() -> DispatchSettings {
    DispatchSettings {
        classify_timeout: Duration::from_secs(2),
        retry_base_delay_ms: 1,
        generation_timeout: Duration::from_secs(2),
        db_timeout: Duration::from_secs(2),
        mail_timeout: Duration::from_secs(2),
        ..DispatchSettings::default()
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub generator: Arc<ScriptedGenerator>,
    pub mailer: Arc<RecordingMailer>,
    pub store: Arc<SqliteEmployeeStore>,
    pub memory: Arc<ContentMemory>,
}

pub fn harness() -> Harness {
    let generator = ScriptedGenerator::new();
    let mailer = RecordingMailer::new();
    let store = seeded_store();
    let memory = ContentMemory::shared();

    let collaborators = Collaborators {
        generator: generator.clone(),
        store: store.clone(),
        mailer: mailer.clone(),
        memory: memory.clone(),
    };
    let orchestrator = Orchestrator::standard(collaborators, &fast_settings()).unwrap();

    Harness {
        orchestrator,
        generator,
        mailer,
        store,
        memory,
    }
}
