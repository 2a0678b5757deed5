//! Core types and error definitions for the Delver research service.
//!
//! This crate provides the foundational types shared across all Delver
//! crates: the unified error enum, the research data model produced and
//! consumed by the pipeline stages, and the status events a run streams
//! back to its client.
//!
//! # Main types
//!
//! - [`DelverError`] — Unified error enum for all Delver subsystems.
//! - [`DelverResult`] — Convenience alias for `Result<T, DelverError>`.
//! - [`SearchPlan`] / [`SearchItem`] — Output of the planning stage.
//! - [`Report`] — Output of the writing stage.
//! - [`ExportArtifact`] — A generated PDF on disk plus its public URL.
//! - [`RunStatusEvent`] — One entry in the status stream of a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

// --- Error types ---

/// Top-level error type for the Delver service.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum DelverError {
    /// An error from an agent-runtime request (transport or remote failure).
    #[error("Agent error: {0}")]
    Agent(String),

    /// A structured agent response that could not be coerced to the
    /// expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An error from the research pipeline itself.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An error while rendering or persisting an export artifact.
    #[error("Export error: {0}")]
    Export(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`DelverError`].
pub type DelverResult<T> = Result<T, DelverError>;

// --- Research data model ---

/// A single planned web search: what to search for and why.
///
/// Produced by the planning stage; immutable once planned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    /// The search term to submit.
    pub query: String,
    /// Why this search contributes to answering the user's query.
    pub reason: String,
}

/// The ordered set of searches the planner decided to perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlan {
    /// The planned searches, in planner order.
    pub searches: Vec<SearchItem>,
}

/// The synthesized research report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// The full report body as Markdown.
    pub markdown_report: String,
}

/// A generated export file on disk, plus the URL it is served under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportArtifact {
    /// File name of the artifact (always `.pdf`-suffixed).
    pub file_name: String,
    /// Absolute path of the artifact on disk.
    pub file_path: PathBuf,
    /// Public URL the gateway serves the artifact under.
    pub url: String,
}

// --- Run status events ---

/// Events emitted during a research run.
///
/// A run emits these in a fixed order (minus any tail skipped after an
/// error) and always closes with exactly one [`RunStatusEvent::Complete`],
/// even when an [`RunStatusEvent::Error`] was emitted earlier: error and
/// completion are distinct signals to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunStatusEvent {
    /// The run started and was assigned a trace id.
    TraceStarted {
        /// Trace id for correlating this run across logs.
        trace_id: Uuid,
    },

    /// Planning finished; searching is about to start.
    PlanningDone {
        /// Number of searches the planner scheduled.
        searches: usize,
    },

    /// All searches were drained; report writing is about to start.
    SearchingDone {
        /// Number of searches that produced a result.
        completed: usize,
    },

    /// The full report markdown, surfaced before export and email finish.
    ReportText {
        /// The report body as Markdown.
        markdown: String,
    },

    /// The PDF export is ready for download.
    PdfReady {
        /// URL the PDF is served under.
        url: String,
    },

    /// The email stage completed.
    EmailSent,

    /// A stage failed and the remaining pipeline was skipped.
    Error {
        /// Human-readable failure description.
        message: String,
    },

    /// The run is over; no further events follow.
    Complete,
}

impl RunStatusEvent {
    /// The human-readable progress line for this event, as streamed to
    /// the web client.
    pub fn message(&self) -> String {
        match self {
            RunStatusEvent::TraceStarted { trace_id } => {
                format!("View trace: https://traces.delver.dev/trace?trace_id={trace_id}")
            }
            RunStatusEvent::PlanningDone { .. } => {
                "Searches planned, starting to search...".to_string()
            }
            RunStatusEvent::SearchingDone { .. } => {
                "Searches complete, generating report...".to_string()
            }
            RunStatusEvent::ReportText { markdown } => markdown.clone(),
            RunStatusEvent::PdfReady { url } => format!("PDF ready: {url}"),
            RunStatusEvent::EmailSent => "Email sent, research complete".to_string(),
            RunStatusEvent::Error { message } => message.clone(),
            RunStatusEvent::Complete => String::new(),
        }
    }

    /// Whether this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatusEvent::Complete)
    }
}
