//! Runtime configuration
//!
//! Loaded from defaults, then an optional TOML file, then `TASKROUTER_*`
//! environment variables. `validate` must pass before any request is served.

use crate::agent::DispatchSettings;
use crate::llm::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use crate::mail::SmtpSettings;
use crate::server::DEFAULT_BIND;
use crate::tools::DEFAULT_SUBJECT;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MASK: &str = "********";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Generation / classification service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub classify_timeout_secs: u64,
    /// Attempts per classification, including the first
    pub classify_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout_secs: 60,
            classify_timeout_secs: 20,
            classify_attempts: 2,
            retry_base_delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path
    pub path: String,
    pub pool_size: u32,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::home_dir()
            .map(|home| home.join(".taskrouter").join("employees.db"))
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            pool_size: 4,
            connect_timeout_secs: 5,
            query_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    /// STARTTLS instead of implicit TLS
    pub starttls: bool,
    pub subject: String,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 465,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            starttls: false,
            subject: DEFAULT_SUBJECT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Tool calls allowed per employee-agent request
    pub max_tool_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_tool_steps: 4 }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".taskrouter").join("config.toml"))
    }

    /// Apply `TASKROUTER_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set(&mut self.llm.base_url, "TASKROUTER_LLM_BASE_URL");
        set(&mut self.llm.model, "TASKROUTER_LLM_MODEL");
        set(&mut self.database.path, "TASKROUTER_DATABASE_PATH");
        set(&mut self.mail.smtp_host, "TASKROUTER_MAIL_SMTP_HOST");
        set(&mut self.mail.username, "TASKROUTER_MAIL_USERNAME");
        set(&mut self.mail.password, "TASKROUTER_MAIL_PASSWORD");
        set(&mut self.mail.from, "TASKROUTER_MAIL_FROM");
        set(&mut self.server.bind, "TASKROUTER_SERVER_BIND");

        if let Some(key) = lookup("TASKROUTER_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(port) = lookup("TASKROUTER_MAIL_SMTP_PORT") {
            self.mail.smtp_port = port
                .parse()
                .with_context(|| format!("TASKROUTER_MAIL_SMTP_PORT is not a port: '{}'", port))?;
        }

        Ok(())
    }

    /// Required keys that are empty
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let required = [
            ("llm.base_url", &self.llm.base_url),
            ("llm.model", &self.llm.model),
            ("database.path", &self.database.path),
            ("mail.smtp_host", &self.mail.smtp_host),
            ("mail.username", &self.mail.username),
            ("mail.password", &self.mail.password),
            ("mail.from", &self.mail.from),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    /// Fail fast listing every missing required key
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            bail!("Missing required configuration: {}", missing.join(", "));
        }
        if self.database.pool_size == 0 {
            bail!("database.pool_size must be at least 1");
        }
        Ok(())
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            classify_timeout: Duration::from_secs(self.llm.classify_timeout_secs),
            classify_attempts: self.llm.classify_attempts,
            retry_base_delay_ms: self.llm.retry_base_delay_ms,
            generation_timeout: Duration::from_secs(self.llm.request_timeout_secs),
            db_timeout: Duration::from_secs(self.database.query_timeout_secs),
            mail_timeout: Duration::from_secs(self.mail.timeout_secs),
            mail_subject: self.mail.subject.clone(),
            max_tool_steps: self.agent.max_tool_steps,
        }
    }

    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.mail.smtp_host.clone(),
            port: self.mail.smtp_port,
            username: self.mail.username.clone(),
            password: self.mail.password.clone(),
            from: self.mail.from.clone(),
            starttls: self.mail.starttls,
        }
    }

    /// Copy with secrets replaced, for display
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if !masked.mail.password.is_empty() {
            masked.mail.password = MASK.to_string();
        }
        if masked.llm.api_key.is_some() {
            masked.llm.api_key = Some(MASK.to_string());
        }
        masked
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
