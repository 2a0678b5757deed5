//! Per-run execution of the pipeline stages.

use crate::PipelineConfig;
use delver_agents::{AgentKind, AgentOutput, AgentRuntime};
use delver_core::{DelverError, Report, RunStatusEvent, SearchItem, SearchPlan};
use delver_export::extract_pdf_url;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Why a run stopped before reaching the email stage.
enum RunError {
    /// A stage failed; surfaced to the client as an `Error` event.
    Stage(DelverError),
    /// The client dropped the stream; nothing left to tell anyone.
    ClientGone,
}

impl From<DelverError> for RunError {
    fn from(err: DelverError) -> Self {
        RunError::Stage(err)
    }
}

/// One research run: owns the event channel and fresh per-run state.
pub(crate) struct RunWorker {
    runtime: Arc<dyn AgentRuntime>,
    config: PipelineConfig,
    tx: mpsc::Sender<RunStatusEvent>,
}

impl RunWorker {
    pub(crate) fn new(
        runtime: Arc<dyn AgentRuntime>,
        config: PipelineConfig,
        tx: mpsc::Sender<RunStatusEvent>,
    ) -> Self {
        Self {
            runtime,
            config,
            tx,
        }
    }

    /// Drive the run to its terminal event.
    ///
    /// `Complete` is emitted unconditionally, after an `Error` too:
    /// error and completion are distinct signals to the client.
    pub(crate) async fn run(self, trace_id: Uuid, query: &str) {
        match self.execute(trace_id, query).await {
            Ok(()) => {}
            Err(RunError::ClientGone) => {
                debug!(%trace_id, "Client disconnected mid-run");
                return;
            }
            Err(RunError::Stage(err)) => {
                error!(%trace_id, error = %err, "Research run failed");
                let _ = self
                    .emit(RunStatusEvent::Error {
                        message: format!("Research error: {err}"),
                    })
                    .await;
            }
        }
        let _ = self.emit(RunStatusEvent::Complete).await;
    }

    async fn execute(&self, trace_id: Uuid, query: &str) -> Result<(), RunError> {
        self.emit(RunStatusEvent::TraceStarted { trace_id }).await?;

        let plan = self.plan_searches(query).await?;
        self.emit(RunStatusEvent::PlanningDone {
            searches: plan.searches.len(),
        })
        .await?;

        let results = self.perform_searches(&plan).await?;
        self.emit(RunStatusEvent::SearchingDone {
            completed: results.len(),
        })
        .await?;

        let report = self.write_report(query, &results).await?;
        self.emit(RunStatusEvent::ReportText {
            markdown: report.markdown_report.clone(),
        })
        .await?;

        let url = self.export_report(&report, trace_id).await?;
        self.emit(RunStatusEvent::PdfReady { url }).await?;

        self.send_email(&report).await?;
        self.emit(RunStatusEvent::EmailSent).await?;

        Ok(())
    }

    async fn emit(&self, event: RunStatusEvent) -> Result<(), RunError> {
        self.tx.send(event).await.map_err(|_| RunError::ClientGone)
    }

    async fn plan_searches(&self, query: &str) -> Result<SearchPlan, RunError> {
        info!("Planning searches");
        let output = self
            .runtime
            .run(AgentKind::Planner, &format!("Query: {query}"))
            .await?;
        let plan: SearchPlan = output.decode()?;
        info!(searches = plan.searches.len(), "Search plan ready");
        Ok(plan)
    }

    /// Fan out one search per planned item and drain them in completion
    /// order. Individual failures are logged and contribute nothing; a
    /// non-empty plan whose searches all fail aborts the run.
    async fn perform_searches(&self, plan: &SearchPlan) -> Result<Vec<String>, RunError> {
        let total = plan.searches.len();
        let mut pending: FuturesUnordered<_> = plan
            .searches
            .iter()
            .map(|item| self.search(item))
            .collect();

        let mut results = Vec::new();
        let mut completed = 0usize;
        while let Some(result) = pending.next().await {
            completed += 1;
            match result {
                Ok(text) => results.push(text),
                Err(err) => warn!(error = %err, "Search failed, dropping its result"),
            }
            debug!(completed, total, "Searching");
        }

        if total > 0 && results.is_empty() {
            return Err(DelverError::Pipeline("all planned searches failed".to_string()).into());
        }

        info!(
            succeeded = results.len(),
            total, "Finished searching"
        );
        Ok(results)
    }

    async fn search(&self, item: &SearchItem) -> Result<String, DelverError> {
        let input = format!(
            "Search term: {}\nReason for searching: {}",
            item.query, item.reason
        );
        let output = self.runtime.run(AgentKind::Search, &input).await?;
        Ok(output.into_text())
    }

    async fn write_report(&self, query: &str, results: &[String]) -> Result<Report, RunError> {
        info!("Writing report");
        let summary = truncate_chars(
            serde_json::to_string(results).map_err(DelverError::from)?,
            self.config.max_results_chars,
        );
        let input = format!("Original query: {query}\nSummarized search results: {summary}");
        let output = self.runtime.run(AgentKind::Writer, &input).await?;
        let report: Report = output.decode()?;
        info!(
            report_chars = report.markdown_report.len(),
            "Finished writing report"
        );
        Ok(report)
    }

    /// Ask the downloader agent to produce the PDF and make sense of
    /// whatever shape it answers in.
    async fn export_report(&self, report: &Report, trace_id: Uuid) -> Result<String, RunError> {
        let file_name = self.export_file_name(trace_id);
        let input = format!("Filename: {file_name}\n\n{}", report.markdown_report);
        let output = self.runtime.run(AgentKind::Downloader, &input).await?;

        let url = match output {
            AgentOutput::Structured(value) => value
                .get("url")
                .and_then(|u| u.as_str())
                .or_else(|| value.get("path").and_then(|p| p.as_str()))
                .map(str::to_string),
            AgentOutput::Text(text) => extract_pdf_url(&text),
        };

        Ok(url.unwrap_or_else(|| self.config.fallback_export_url.clone()))
    }

    fn export_file_name(&self, trace_id: Uuid) -> String {
        if !self.config.unique_file_names {
            return self.config.export_file_name.clone();
        }
        let run_id = trace_id.simple().to_string();
        let stem = self
            .config
            .export_file_name
            .strip_suffix(".pdf")
            .unwrap_or(&self.config.export_file_name);
        format!("{stem}-{}.pdf", &run_id[..8])
    }

    /// Success is the absence of an error; the email agent's output is
    /// not further parsed.
    async fn send_email(&self, report: &Report) -> Result<(), RunError> {
        info!("Sending report email");
        self.runtime
            .run(AgentKind::Email, &report.markdown_report)
            .await?;
        info!("Email sent");
        Ok(())
    }
}

/// Truncate at a char boundary, never mid-scalar.
fn truncate_chars(s: String, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s;
    }
    s.chars().take(max_chars).collect()
}
