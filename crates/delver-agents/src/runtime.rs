//! HTTP-backed agent runtime.

use crate::{AgentKind, AgentOutput, AgentRuntime};
use delver_core::{DelverError, DelverResult};
use serde::Deserialize;
use tracing::debug;

/// Connection settings for a hosted agent runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the runtime, e.g. `https://agents.example.com`.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
}

/// An [`AgentRuntime`] that runs agents on a hosted runtime over HTTP.
///
/// Each call POSTs `{"agent": ..., "input": ...}` to `<base_url>/agents/run`
/// and decodes the `output` field of the JSON response: an object becomes
/// [`AgentOutput::Structured`], a string becomes [`AgentOutput::Text`].
pub struct HttpAgentRuntime {
    config: RuntimeConfig,
    http: reqwest::Client,
}

impl HttpAgentRuntime {
    /// Create a runtime client for the given connection settings.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AgentRuntime for HttpAgentRuntime {
    async fn run(&self, agent: AgentKind, input: &str) -> DelverResult<AgentOutput> {
        let url = format!("{}/agents/run", self.config.base_url.trim_end_matches('/'));

        debug!(agent = %agent, input_len = input.len(), "Dispatching agent request");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&serde_json::json!({
                "agent": agent,
                "input": input,
            }))
            .send()
            .await
            .map_err(|e| DelverError::Agent(e.to_string()))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| DelverError::Agent(e.to_string()))?;

        if !status.is_success() {
            return Err(DelverError::Agent(format!(
                "runtime error {status} for agent {agent}: {body}"
            )));
        }

        match body.get("output") {
            Some(serde_json::Value::String(text)) => Ok(AgentOutput::Text(text.clone())),
            Some(value) if value.is_object() || value.is_array() => {
                Ok(AgentOutput::Structured(value.clone()))
            }
            _ => Err(DelverError::Agent(format!(
                "runtime response for agent {agent} carried no output: {body}"
            ))),
        }
    }
}
