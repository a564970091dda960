//! taskrouter - main CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use taskrouter::{
    agent::{Collaborators, Orchestrator},
    cli::{Args, ChatSession, Commands},
    config::Config,
    llm::OllamaClient,
    mail::SmtpMailer,
    memory::ContentMemory,
    server::HttpServer,
    storage::SqliteEmployeeStore,
    tools::ToolStatus,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> Result<SqliteEmployeeStore> {
    SqliteEmployeeStore::open(
        &config.database.path,
        config.database.pool_size,
        Duration::from_secs(config.database.connect_timeout_secs),
    )
    .with_context(|| format!("Failed to open database {}", config.database.path))
}

fn llm_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::with_config(
        &config.llm.base_url,
        &config.llm.model,
        config.llm.api_key.clone(),
        Duration::from_secs(config.llm.request_timeout_secs),
    )
    .context("Failed to create LLM client")
}

/// Build the standard pipeline from validated configuration
fn build_orchestrator(config: &Config, memory: Arc<ContentMemory>) -> Result<Orchestrator> {
    config.validate()?;

    let generator = llm_client(config)?;
    let mailer = SmtpMailer::new(&config.smtp_settings()).context("Failed to create SMTP transport")?;
    let store = open_store(config)?;

    let collaborators = Collaborators {
        generator: Arc::new(generator),
        store: Arc::new(store),
        mailer: Arc::new(mailer),
        memory,
    };

    Orchestrator::standard(collaborators, &config.dispatch_settings())
        .context("Failed to build orchestrator")
}

fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|home| home.join(".taskrouter").join("history"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let mut config = Config::load(args.config.as_deref())?;

    match &args.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
            let orchestrator = Arc::new(build_orchestrator(&config, ContentMemory::shared())?);

            let llm = llm_client(&config)?;
            if llm.health_check().await? {
                info!(base_url = llm.base_url(), model = llm.model(), "generation service reachable");
            } else {
                warn!(
                    base_url = llm.base_url(),
                    model = llm.model(),
                    "generation service unreachable, requests will report classifier errors"
                );
            }

            let server = HttpServer::bind(
                &config.server.bind,
                orchestrator,
                tokio::runtime::Handle::current(),
            )?;

            let stopper = server.stopper();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("shutdown requested");
                    stopper.stop();
                }
            });

            tokio::task::spawn_blocking(move || server.serve())
                .await
                .context("Server thread failed")?;
        }

        Commands::Run { prompt } => {
            let orchestrator = build_orchestrator(&config, ContentMemory::shared())?;
            let response = orchestrator.run(prompt).await;
            let status = match response.status {
                ToolStatus::Success => response.status.to_string().green(),
                ToolStatus::NotFound => response.status.to_string().yellow(),
                ToolStatus::Error => response.status.to_string().red(),
            };
            println!("{} {}", "Agent:".bold(), response.agent);
            println!("{} {}", "Status:".bold(), status);
            println!("{}", response.result);
        }

        Commands::Chat { agent } => {
            let memory = ContentMemory::shared();
            let orchestrator = Arc::new(build_orchestrator(&config, memory.clone())?);
            let mut session = ChatSession::new(orchestrator, memory, *agent, history_path())?;
            session.run().await?;
        }

        Commands::InitDb => {
            let store = open_store(&config)?;
            println!(
                "{} {} ({} employees)",
                "Database ready:".green(),
                config.database.path,
                store.count()?
            );
        }

        Commands::Config => {
            let path = match &args.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            println!("{} {}", "Config file:".bold(), path.display());
            println!("{}", config.masked().to_toml()?);

            let missing = config.missing_keys();
            if !missing.is_empty() {
                println!("{} {}", "Missing:".yellow(), missing.join(", "));
            }
        }
    }

    Ok(())
}
