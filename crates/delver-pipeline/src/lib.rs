//! The Delver research pipeline.
//!
//! A run moves through a fixed sequence of stages — plan, search,
//! write, export, email — delegating each to the agent runtime and
//! emitting one status event per transition. The caller consumes the
//! run as a lazy event stream; the full report markdown is surfaced on
//! that stream as soon as writing finishes, before export and email
//! complete.
//!
//! Failure policy: a planning, writing, export, or email failure aborts
//! the remaining stages and surfaces one `Error` event; individual
//! search failures are logged and dropped. Nothing is retried. Every
//! run, failed or not, closes with exactly one `Complete` event.

mod worker;

use delver_agents::AgentRuntime;
use delver_core::RunStatusEvent;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use uuid::Uuid;

fn default_export_file_name() -> String {
    "report.pdf".to_string()
}
fn default_fallback_export_url() -> String {
    delver_export::DEFAULT_EXPORT_URL.to_string()
}
fn default_max_results_chars() -> usize {
    64_000
}

/// Tunable pipeline behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// File name requested from the downloader agent.
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    /// URL reported when the downloader response yields none.
    #[serde(default = "default_fallback_export_url")]
    pub fallback_export_url: String,
    /// Upper bound on the combined search-results payload handed to the
    /// writer, in characters.
    #[serde(default = "default_max_results_chars")]
    pub max_results_chars: usize,
    /// Suffix export file names with a short per-run id so concurrent
    /// runs cannot overwrite each other.
    #[serde(default)]
    pub unique_file_names: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_file_name: default_export_file_name(),
            fallback_export_url: default_fallback_export_url(),
            max_results_chars: default_max_results_chars(),
            unique_file_names: false,
        }
    }
}

/// The research pipeline: turns a query into a stream of status events.
///
/// Each [`ResearchPipeline::run`] call creates fresh run state; runs
/// are not restartable and each event stream has exactly one consumer.
pub struct ResearchPipeline {
    runtime: Arc<dyn AgentRuntime>,
    config: PipelineConfig,
}

impl ResearchPipeline {
    /// Create a pipeline over the given agent runtime.
    pub fn new(runtime: Arc<dyn AgentRuntime>, config: PipelineConfig) -> Self {
        Self { runtime, config }
    }

    /// Start a research run for `query`.
    ///
    /// The run executes on its own task and communicates only through
    /// the returned stream. Dropping the stream disconnects the run:
    /// the task stops at its next emission and any still-pending search
    /// fan-out is cancelled with it.
    pub fn run(&self, query: &str) -> ReceiverStream<RunStatusEvent> {
        let (tx, rx) = mpsc::channel(16);
        let worker = worker::RunWorker::new(self.runtime.clone(), self.config.clone(), tx);
        let query = query.to_string();
        let trace_id = Uuid::new_v4();

        info!(%trace_id, query = %query, "Starting research run");

        tokio::spawn(async move {
            worker.run(trace_id, &query).await;
        });

        ReceiverStream::new(rx)
    }
}
