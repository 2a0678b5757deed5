#![allow(clippy::unwrap_used, clippy::expect_used)]

use delver_agents::{AgentKind, AgentOutput, AgentRuntime};
use delver_core::{DelverError, DelverResult, RunStatusEvent};
use delver_pipeline::{PipelineConfig, ResearchPipeline};
use std::sync::{Arc, Mutex};
use tokio_stream::StreamExt;

/// Scripted stand-in for the hosted agent runtime.
struct ScriptedRuntime {
    plan_items: Vec<(&'static str, &'static str)>,
    fail_planner: bool,
    failing_terms: Vec<&'static str>,
    downloader_output: AgentOutput,
    writer_inputs: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    fn happy() -> Self {
        Self {
            plan_items: vec![
                ("coffee tariffs 2025", "recent policy changes"),
                ("arabica price index", "price baseline"),
                ("coffee import volumes", "trade flows"),
            ],
            fail_planner: false,
            failing_terms: vec![],
            downloader_output: AgentOutput::Structured(serde_json::json!({
                "status": "success",
                "url": "/static/exports/report.pdf",
            })),
            writer_inputs: Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn run(&self, agent: AgentKind, input: &str) -> DelverResult<AgentOutput> {
        match agent {
            AgentKind::Planner => {
                if self.fail_planner {
                    return Err(DelverError::Agent("planner unavailable".to_string()));
                }
                let searches: Vec<_> = self
                    .plan_items
                    .iter()
                    .map(|(query, reason)| serde_json::json!({"query": query, "reason": reason}))
                    .collect();
                Ok(AgentOutput::Structured(
                    serde_json::json!({"searches": searches}),
                ))
            }
            AgentKind::Search => {
                if self.failing_terms.iter().any(|term| input.contains(term)) {
                    return Err(DelverError::Agent("search backend timeout".to_string()));
                }
                Ok(AgentOutput::Text(format!("summary of {input}")))
            }
            AgentKind::Writer => {
                self.writer_inputs.lock().unwrap().push(input.to_string());
                Ok(AgentOutput::Structured(serde_json::json!({
                    "markdown_report": "# Report\nCoffee prices rose because of tariffs."
                })))
            }
            AgentKind::Downloader => Ok(self.downloader_output.clone()),
            AgentKind::Email => Ok(AgentOutput::Text("queued".to_string())),
        }
    }
}

async fn collect_events(runtime: ScriptedRuntime) -> (Vec<RunStatusEvent>, Arc<ScriptedRuntime>) {
    let runtime = Arc::new(runtime);
    let pipeline = ResearchPipeline::new(runtime.clone(), PipelineConfig::default());
    let events: Vec<RunStatusEvent> = pipeline
        .run("impact of tariffs on coffee prices")
        .collect()
        .await;
    (events, runtime)
}

fn assert_single_terminal_complete(events: &[RunStatusEvent]) {
    let completes = events
        .iter()
        .filter(|e| matches!(e, RunStatusEvent::Complete))
        .count();
    assert_eq!(completes, 1, "expected exactly one Complete: {events:?}");
    assert!(matches!(events.last(), Some(RunStatusEvent::Complete)));
}

#[tokio::test]
async fn happy_path_emits_the_full_event_sequence() {
    let (events, _) = collect_events(ScriptedRuntime::happy()).await;

    assert!(matches!(events[0], RunStatusEvent::TraceStarted { .. }));
    assert!(matches!(
        events[1],
        RunStatusEvent::PlanningDone { searches: 3 }
    ));
    assert!(matches!(
        events[2],
        RunStatusEvent::SearchingDone { completed: 3 }
    ));
    match &events[3] {
        RunStatusEvent::ReportText { markdown } => {
            assert!(markdown.starts_with("# Report"));
        }
        other => panic!("expected report text, got {other:?}"),
    }
    assert!(matches!(
        &events[4],
        RunStatusEvent::PdfReady { url } if url == "/static/exports/report.pdf"
    ));
    assert!(matches!(events[5], RunStatusEvent::EmailSent));
    assert_single_terminal_complete(&events);
    assert_eq!(events.len(), 7);
}

#[tokio::test]
async fn partial_search_failure_still_reaches_the_writer() {
    let runtime = ScriptedRuntime {
        failing_terms: vec!["coffee tariffs 2025", "arabica price index"],
        ..ScriptedRuntime::happy()
    };
    let (events, runtime) = collect_events(runtime).await;

    assert!(matches!(
        events[2],
        RunStatusEvent::SearchingDone { completed: 1 }
    ));
    assert!(events
        .iter()
        .any(|e| matches!(e, RunStatusEvent::EmailSent)));
    assert_single_terminal_complete(&events);

    let writer_inputs = runtime.writer_inputs.lock().unwrap();
    assert_eq!(writer_inputs.len(), 1);
    assert!(writer_inputs[0].contains("coffee import volumes"));
    assert!(!writer_inputs[0].contains("summary of Search term: coffee tariffs 2025"));
}

#[tokio::test]
async fn planner_failure_aborts_with_error_then_complete() {
    let runtime = ScriptedRuntime {
        fail_planner: true,
        ..ScriptedRuntime::happy()
    };
    let (events, runtime) = collect_events(runtime).await;

    assert!(matches!(events[0], RunStatusEvent::TraceStarted { .. }));
    assert!(matches!(&events[1], RunStatusEvent::Error { message } if message.contains("planner")));
    assert_single_terminal_complete(&events);
    assert_eq!(events.len(), 3);
    assert!(runtime.writer_inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn total_search_failure_aborts_instead_of_writing_from_nothing() {
    let runtime = ScriptedRuntime {
        failing_terms: vec![
            "coffee tariffs 2025",
            "arabica price index",
            "coffee import volumes",
        ],
        ..ScriptedRuntime::happy()
    };
    let (events, runtime) = collect_events(runtime).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, RunStatusEvent::Error { message } if message.contains("searches"))));
    assert!(!events
        .iter()
        .any(|e| matches!(e, RunStatusEvent::ReportText { .. })));
    assert_single_terminal_complete(&events);
    assert!(runtime.writer_inputs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unparseable_downloader_output_falls_back_to_the_default_url() {
    let runtime = ScriptedRuntime {
        downloader_output: AgentOutput::Text("all done, enjoy".to_string()),
        ..ScriptedRuntime::happy()
    };
    let (events, _) = collect_events(runtime).await;

    assert!(events.iter().any(|e| matches!(
        e,
        RunStatusEvent::PdfReady { url } if url == "/static/exports/report.pdf"
    )));
    assert_single_terminal_complete(&events);
}

#[tokio::test]
async fn empty_plan_proceeds_with_an_empty_result_set() {
    let runtime = ScriptedRuntime {
        plan_items: vec![],
        ..ScriptedRuntime::happy()
    };
    let (events, runtime) = collect_events(runtime).await;

    assert!(matches!(
        events[1],
        RunStatusEvent::PlanningDone { searches: 0 }
    ));
    assert!(matches!(
        events[2],
        RunStatusEvent::SearchingDone { completed: 0 }
    ));
    assert!(events
        .iter()
        .any(|e| matches!(e, RunStatusEvent::ReportText { .. })));
    assert_single_terminal_complete(&events);
    assert_eq!(runtime.writer_inputs.lock().unwrap().len(), 1);
}
