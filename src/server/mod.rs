//! HTTP front end
//!
//! `GET /` is a liveness probe, `POST /run` dispatches `{"prompt": ...}`.
//! The accept loop runs on its own thread; each request is read there and
//! dispatched as a task on the tokio runtime. Stopping the loop waits for
//! in-flight dispatches so every accepted request gets its response.

use crate::agent::orchestrator::NO_AGENT;
use crate::agent::{DispatchResponse, Orchestrator};
use crate::errors::{DispatchError, Result};
use crate::tools::ToolStatus;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

pub const LIVENESS_MESSAGE: &str = "taskrouter is running. Use POST /run";

/// `POST /run` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
}

/// Route target of an incoming request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Liveness,
    Run,
    NotFound,
    MethodNotAllowed,
}

/// Map method and URL to an endpoint; query strings are ignored
pub fn resolve_endpoint(method: &Method, url: &str) -> Endpoint {
    let path = url.split('?').next().unwrap_or(url);
    match (path, method) {
        ("/", Method::Get) => Endpoint::Liveness,
        ("/run", Method::Post) => Endpoint::Run,
        ("/" | "/run", _) => Endpoint::MethodNotAllowed,
        _ => Endpoint::NotFound,
    }
}

/// Parse a `POST /run` body
pub fn parse_run_body(body: &str) -> std::result::Result<RunRequest, String> {
    serde_json::from_str::<RunRequest>(body).map_err(|e| format!("Invalid request body: {}", e))
}

fn error_response(message: impl Into<String>) -> DispatchResponse {
    DispatchResponse {
        agent: NO_AGENT.to_string(),
        result: message.into(),
        status: ToolStatus::Error,
    }
}

fn respond_json<T: Serialize>(request: Request, status: u16, body: &T) {
    let payload = serde_json::to_string(body).unwrap_or_else(|e| {
        format!(r#"{{"agent":"{}","result":"serialization failed: {}","status":"error"}}"#, NO_AGENT, e)
    });

    let mut response = Response::from_string(payload).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }

    if let Err(e) = request.respond(response) {
        error!(error = %e, "failed to send response");
    }
}

/// Stops a running server from another thread
#[derive(Clone)]
pub struct Stopper(Arc<Server>);

impl Stopper {
    pub fn stop(&self) {
        self.0.unblock();
    }
}

pub struct HttpServer {
    server: Arc<Server>,
    orchestrator: Arc<Orchestrator>,
    runtime: Handle,
    tasks: Mutex<JoinSet<()>>,
}

impl HttpServer {
    /// Bind the listener; requests are dispatched on `runtime`
    pub fn bind(addr: &str, orchestrator: Arc<Orchestrator>, runtime: Handle) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| {
            DispatchError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("cannot bind {}: {}", addr, e),
            ))
        })?;

        Ok(Self {
            server: Arc::new(server),
            orchestrator,
            runtime,
            tasks: Mutex::new(JoinSet::new()),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn stopper(&self) -> Stopper {
        Stopper(self.server.clone())
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Accept requests until stopped, then wait for in-flight dispatches
    ///
    /// Blocks the calling thread, which must not be a runtime worker.
    pub fn serve(&self) {
        if let Some(addr) = self.local_addr() {
            info!(%addr, "listening");
        }

        for request in self.server.incoming_requests() {
            self.handle(request);
        }

        let mut pending = std::mem::take(&mut *self.lock_tasks());
        if !pending.is_empty() {
            info!(pending = pending.len(), "draining in-flight requests");
        }
        self.runtime.block_on(async {
            while let Some(joined) = pending.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "dispatch task failed");
                }
            }
        });

        info!("server stopped");
    }

    fn handle(&self, mut request: Request) {
        let endpoint = resolve_endpoint(request.method(), request.url());
        debug!(method = %request.method(), url = %request.url(), ?endpoint, "http request");

        match endpoint {
            Endpoint::Liveness => {
                respond_json(request, 200, &serde_json::json!({ "message": LIVENESS_MESSAGE }));
            }
            Endpoint::NotFound => {
                let path = request.url().to_string();
                respond_json(request, 404, &error_response(format!("No route for {}", path)));
            }
            Endpoint::MethodNotAllowed => {
                let method = request.method().to_string();
                respond_json(request, 405, &error_response(format!("Method {} not allowed", method)));
            }
            Endpoint::Run => {
                let mut body = String::new();
                if let Err(e) = request.as_reader().read_to_string(&mut body) {
                    warn!(error = %e, "failed to read request body");
                    respond_json(request, 400, &error_response(format!("Invalid request body: {}", e)));
                    return;
                }

                let run = match parse_run_body(&body) {
                    Ok(run) => run,
                    Err(message) => {
                        warn!(error = %message, "rejected request body");
                        respond_json(request, 400, &error_response(message));
                        return;
                    }
                };

                let orchestrator = self.orchestrator.clone();
                let mut tasks = self.lock_tasks();
                // Reap finished dispatches so the set only holds live ones
                while tasks.try_join_next().is_some() {}
                tasks.spawn_on(
                    async move {
                        let response = orchestrator.run(&run.prompt).await;
                        let sent =
                            tokio::task::spawn_blocking(move || respond_json(request, 200, &response)).await;
                        if let Err(e) = sent {
                            error!(error = %e, "response writer failed");
                        }
                    },
                    &self.runtime,
                );
            }
        }
    }
}
