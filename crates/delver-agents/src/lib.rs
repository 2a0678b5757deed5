//! The collaborator contract between the research pipeline and the
//! hosted agent runtime.
//!
//! Every "hard" step of a research run (query planning, web search,
//! report synthesis, email composition) is delegated to an opaque agent
//! reached through one request/response call: text in, structured or
//! free-text output back. This crate defines that seam as the
//! [`AgentRuntime`] trait plus the [`HttpAgentRuntime`] implementation
//! that talks to a hosted runtime over HTTP.

mod runtime;

pub use runtime::{HttpAgentRuntime, RuntimeConfig};

use delver_core::{DelverError, DelverResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The agents a research run can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Turns a user query into a [`delver_core::SearchPlan`].
    Planner,
    /// Performs one web search and summarizes the findings.
    Search,
    /// Synthesizes search results into a Markdown report.
    Writer,
    /// Converts report markdown into a downloadable PDF.
    Downloader,
    /// Sends the report by email.
    Email,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Planner => write!(f, "planner"),
            AgentKind::Search => write!(f, "search"),
            AgentKind::Writer => write!(f, "writer"),
            AgentKind::Downloader => write!(f, "downloader"),
            AgentKind::Email => write!(f, "email"),
        }
    }
}

/// The output of one agent request.
///
/// The runtime's output shape is not strictly guaranteed: agents that
/// declare an output schema return a structured payload, others return
/// free text. Consumers that need a typed result go through
/// [`AgentOutput::decode`]; consumers that only need text go through
/// [`AgentOutput::into_text`].
#[derive(Debug, Clone)]
pub enum AgentOutput {
    /// A structured (JSON) payload.
    Structured(serde_json::Value),
    /// Free-form text.
    Text(String),
}

impl AgentOutput {
    /// Coerce this output into `T`.
    ///
    /// A structured payload is deserialized directly; a text payload is
    /// parsed as JSON first. Failure to coerce is a hard error for the
    /// requesting stage.
    pub fn decode<T: DeserializeOwned>(self) -> DelverResult<T> {
        let value = match self {
            AgentOutput::Structured(value) => value,
            AgentOutput::Text(text) => serde_json::from_str(&text)
                .map_err(|e| DelverError::Decode(format!("agent returned non-JSON text: {e}")))?,
        };
        serde_json::from_value(value)
            .map_err(|e| DelverError::Decode(format!("unexpected agent output shape: {e}")))
    }

    /// This output rendered as plain text.
    pub fn into_text(self) -> String {
        match self {
            AgentOutput::Structured(value) => value.to_string(),
            AgentOutput::Text(text) => text,
        }
    }
}

/// A request/response capability for running one agent to completion.
///
/// Implementations are opaque to the pipeline: the hosted HTTP runtime
/// in production, scripted runtimes in tests, and wrappers like
/// `delver-export`'s local downloader all satisfy this trait.
#[async_trait::async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run `agent` with `input`, blocking until its final output arrives.
    async fn run(&self, agent: AgentKind, input: &str) -> DelverResult<AgentOutput>;
}
