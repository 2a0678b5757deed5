//! Markdown-to-PDF export for Delver research reports.
//!
//! The report exporter is the one non-trivial piece of the pipeline that
//! runs locally instead of on the hosted agent runtime. It renders report
//! markdown as plain text: a pure paginator word-wraps the input against
//! a font metrics function and splits it into pages, and a thin genpdf
//! layer draws those pages to disk.
//!
//! The crate also provides [`extract_pdf_url`], the fallback parser the
//! pipeline applies to loosely-shaped downloader responses, and
//! [`ExportingRuntime`], a runtime wrapper that services the downloader
//! agent locally while delegating everything else to an inner runtime.

mod export;
mod extract;
mod metrics;
mod paginate;
mod pdf;
mod runtime;

pub use export::{ExportConfig, PdfExporter};
pub use extract::{extract_pdf_url, DEFAULT_EXPORT_URL};
pub use metrics::text_width;
pub use paginate::{paginate, Page, PageMetrics};
pub use runtime::ExportingRuntime;
