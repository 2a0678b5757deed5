//! A runtime wrapper that services the downloader agent locally.

use crate::export::PdfExporter;
use delver_core::{DelverError, DelverResult};
use delver_agents::{AgentKind, AgentOutput, AgentRuntime};
use std::sync::Arc;
use tracing::info;

/// Wraps an inner [`AgentRuntime`] and intercepts
/// [`AgentKind::Downloader`] requests, rendering the PDF locally with a
/// [`PdfExporter`] instead of a hosted agent. All other agents are
/// delegated untouched.
///
/// The downloader input follows the pipeline's convention: an optional
/// `Filename: <name>` first line, a blank line, then the report
/// markdown. The structured response mirrors a hosted downloader's
/// shape so the pipeline's parsing path stays identical.
pub struct ExportingRuntime<R> {
    inner: R,
    exporter: Arc<PdfExporter>,
}

impl<R> ExportingRuntime<R> {
    /// Wrap `inner`, exporting downloader requests through `exporter`.
    pub fn new(inner: R, exporter: Arc<PdfExporter>) -> Self {
        Self { inner, exporter }
    }
}

#[async_trait::async_trait]
impl<R: AgentRuntime> AgentRuntime for ExportingRuntime<R> {
    async fn run(&self, agent: AgentKind, input: &str) -> DelverResult<AgentOutput> {
        if agent != AgentKind::Downloader {
            return self.inner.run(agent, input).await;
        }

        let (file_name, markdown) = split_filename_header(input);
        info!(file_name = ?file_name, "Exporting report locally");

        let exporter = self.exporter.clone();
        let markdown = markdown.to_string();
        let artifact = tokio::task::spawn_blocking(move || {
            exporter.export(&markdown, file_name.as_deref(), None)
        })
        .await
        .map_err(|e| DelverError::Export(format!("export task failed: {e}")))??;

        Ok(AgentOutput::Structured(serde_json::json!({
            "status": "success",
            "filename": artifact.file_name,
            "path": artifact.file_path,
            "url": artifact.url,
        })))
    }
}

/// Split an optional `Filename: <name>` header off the input, returning
/// the name (if any) and the remaining body.
fn split_filename_header(input: &str) -> (Option<String>, &str) {
    let Some(rest) = input.strip_prefix("Filename:") else {
        return (None, input);
    };
    let (name_line, body) = rest.split_once('\n').unwrap_or((rest, ""));
    let name = name_line.trim();
    let name = (!name.is_empty()).then(|| name.to_string());
    (name, body.trim_start_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_header_is_split_off() {
        let (name, body) = split_filename_header("Filename: report.pdf\n\n# Report\nbody");
        assert_eq!(name.as_deref(), Some("report.pdf"));
        assert_eq!(body, "# Report\nbody");
    }

    #[test]
    fn missing_header_leaves_the_body_untouched() {
        let (name, body) = split_filename_header("# Report\nbody");
        assert_eq!(name, None);
        assert_eq!(body, "# Report\nbody");
    }

    #[test]
    fn empty_header_name_counts_as_missing() {
        let (name, body) = split_filename_header("Filename:\n\nbody");
        assert_eq!(name, None);
        assert_eq!(body, "body");
    }
}
