#![allow(clippy::unwrap_used, clippy::expect_used)]

use delver_agents::{AgentKind, AgentOutput, AgentRuntime};
use delver_core::DelverResult;
use delver_export::{ExportConfig, ExportingRuntime, PdfExporter};
use std::sync::Arc;

/// Inner runtime that records nothing and answers every agent with a
/// recognizable text payload.
struct StubRuntime;

#[async_trait::async_trait]
impl AgentRuntime for StubRuntime {
    async fn run(&self, agent: AgentKind, _input: &str) -> DelverResult<AgentOutput> {
        Ok(AgentOutput::Text(format!("stub:{agent}")))
    }
}

fn exporting_runtime(root: &std::path::Path) -> ExportingRuntime<StubRuntime> {
    let exporter = Arc::new(PdfExporter::new(ExportConfig {
        export_root: root.to_path_buf(),
        ..ExportConfig::default()
    }));
    ExportingRuntime::new(StubRuntime, exporter)
}

#[tokio::test]
async fn non_downloader_agents_are_delegated() {
    let tmp = tempfile::tempdir().unwrap();
    let runtime = exporting_runtime(tmp.path());

    let out = runtime.run(AgentKind::Planner, "Query: x").await.unwrap();
    assert_eq!(out.into_text(), "stub:planner");

    let out = runtime.run(AgentKind::Email, "report body").await.unwrap();
    assert_eq!(out.into_text(), "stub:email");
}

// Rendering needs a body font on the host, so the full downloader path
// is exercised only where one is installed.
#[tokio::test]
#[ignore = "requires a system TTF font for genpdf"]
async fn downloader_requests_are_exported_locally() {
    let tmp = tempfile::tempdir().unwrap();
    let runtime = exporting_runtime(tmp.path());

    let out = runtime
        .run(
            AgentKind::Downloader,
            "Filename: tariffs.pdf\n\n# Report\n\nCoffee prices rose.",
        )
        .await
        .unwrap();

    let AgentOutput::Structured(payload) = out else {
        panic!("expected structured downloader output");
    };
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["filename"], "tariffs.pdf");
    assert_eq!(payload["url"], "/static/exports/tariffs.pdf");
    assert!(tmp.path().join("tariffs.pdf").exists());
}
