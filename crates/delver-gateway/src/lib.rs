//! Axum HTTP gateway for the Delver research service.
//!
//! Adapts a [`delver_pipeline::ResearchPipeline`] to the web: each
//! `POST /research` request gets its own pipeline run whose status
//! events are streamed back as newline-delimited `data:` frames over a
//! `text/event-stream` response. Also serves the health endpoint and
//! the generated export artifacts.

mod server;

pub use server::{build, AppState, GatewayConfig};
