/// Synchronous HTTP client for the scenario runner.
///
/// Uses `ureq` with one shared agent, so connections are pooled across the
/// panel's request workers. A request succeeds only on a 2xx status whose
/// body decodes as the expected JSON; anything else is an error naming the
/// request.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Backend;
use crate::config::schema::BackendConfig;
use crate::scenario::{CommandOutput, CommandRequest, Module, Params, Scenario, Status};

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // "localhost" may resolve to ::1 first while runners often bind IPv4 only.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url,
            timeout,
            agent,
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .agent
            .get(&self.url(path))
            .call()
            .with_context(|| format!("GET {path} failed"))?;
        resp.into_json()
            .with_context(|| format!("GET {path} returned an unreadable body"))
    }

    /// GET whose response body is read and discarded.
    fn get_ignored(&self, path: &str) -> Result<()> {
        let resp = self
            .agent
            .get(&self.url(path))
            .call()
            .with_context(|| format!("GET {path} failed"))?;
        resp.into_string()
            .with_context(|| format!("GET {path} response could not be read"))?;
        Ok(())
    }

    fn post_json<B: serde::Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self
            .agent
            .post(&self.url(path))
            .send_json(body)
            .with_context(|| format!("POST {path} failed"))?;
        resp.into_json()
            .with_context(|| format!("POST {path} returned an unreadable body"))
    }
}

impl Backend for HttpBackend {
    fn get_conf(&self) -> Result<Scenario> {
        self.get_json("/api/get_conf")
    }

    fn status(&self) -> Result<Status> {
        self.get_json("/api/status")
    }

    fn start(&self) -> Result<()> {
        self.get_ignored("/api/start")
    }

    fn stop(&self) -> Result<()> {
        self.get_ignored("/api/stop")
    }

    fn help(&self, module: &str) -> Result<Module> {
        self.get_json(&format!("/api/help/{module}"))
    }

    fn cmd(&self, module: &str, cmd: &str) -> Result<CommandOutput> {
        let body = CommandRequest {
            cmd: cmd.to_string(),
        };
        self.post_json(&format!("/api/cmd/{module}"), &body)
    }

    fn edit(&self, index: usize, params: &Params) -> Result<Value> {
        self.post_json(&format!("/api/edit/{index}"), params)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
