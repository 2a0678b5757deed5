//! The file-system exporter: paginate, render, persist, describe.

use crate::metrics::text_width;
use crate::paginate::{paginate, PageMetrics};
use crate::pdf;
use delver_core::{DelverError, DelverResult, ExportArtifact};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

fn default_export_root() -> PathBuf {
    PathBuf::from("static/exports")
}
fn default_public_base() -> String {
    "/static/exports".to_string()
}
fn default_file_name() -> String {
    "report.pdf".to_string()
}

/// Where exports are written and how they are addressed.
///
/// Injected at construction rather than read from a process-wide
/// constant, so concurrent runs and tests can each own an isolated
/// export root.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory PDFs are written to. Created on first export.
    #[serde(default = "default_export_root")]
    pub export_root: PathBuf,
    /// URL prefix the gateway serves `export_root` under.
    #[serde(default = "default_public_base")]
    pub public_base: String,
    /// File name used when the caller does not supply one.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_root: default_export_root(),
            public_base: default_public_base(),
            file_name: default_file_name(),
        }
    }
}

/// Renders report markdown to a PDF under the configured export root.
pub struct PdfExporter {
    config: ExportConfig,
}

impl PdfExporter {
    /// Create an exporter writing under `config.export_root`.
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export `markdown` as a paginated plain-text PDF.
    ///
    /// `file_name` falls back to the configured default and is
    /// normalized to a `.pdf` suffix either way. Returns the artifact's
    /// on-disk location and public URL.
    pub fn export(
        &self,
        markdown: &str,
        file_name: Option<&str>,
        title: Option<&str>,
    ) -> DelverResult<ExportArtifact> {
        let file_name = normalize_file_name(file_name.unwrap_or(&self.config.file_name))?;

        std::fs::create_dir_all(&self.config.export_root)?;
        let out_path = self.config.export_root.join(&file_name);

        let metrics = PageMetrics {
            title_advance: if title.is_some() { 24.0 } else { 0.0 },
            ..PageMetrics::default()
        };
        let pages = paginate(markdown, &metrics, |s| text_width(s, 11.0));
        pdf::render_pdf(&pages, title, &out_path)?;

        let file_path = out_path.canonicalize().unwrap_or(out_path);
        let url = format!(
            "{}/{}",
            self.config.public_base.trim_end_matches('/'),
            file_name
        );

        info!(file = %file_name, pages = pages.len(), "Export written");

        Ok(ExportArtifact {
            file_name,
            file_path,
            url,
        })
    }
}

/// Strip any directory components and force a `.pdf` extension.
fn normalize_file_name(name: &str) -> DelverResult<String> {
    let stem = Path::new(name.trim())
        .file_name()
        .ok_or_else(|| DelverError::Export(format!("invalid export file name: {name:?}")))?;
    let mut normalized = PathBuf::from(stem);
    normalized.set_extension("pdf");
    normalized
        .into_os_string()
        .into_string()
        .map_err(|_| DelverError::Export(format!("non-UTF8 export file name: {name:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_normalized_to_pdf() {
        assert_eq!(normalize_file_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(normalize_file_name("summary.txt").unwrap(), "summary.pdf");
        assert_eq!(normalize_file_name("notes").unwrap(), "notes.pdf");
        assert_eq!(
            normalize_file_name("../../escape.pdf").unwrap(),
            "escape.pdf"
        );
    }

    #[test]
    fn directory_only_names_are_rejected() {
        assert!(normalize_file_name("..").is_err());
        assert!(normalize_file_name("/").is_err());
    }

    #[test]
    fn artifact_url_joins_public_base_and_file_name() {
        let config = ExportConfig {
            public_base: "/static/exports/".to_string(),
            ..ExportConfig::default()
        };
        let url = format!(
            "{}/{}",
            config.public_base.trim_end_matches('/'),
            "report.pdf"
        );
        assert_eq!(url, "/static/exports/report.pdf");
    }
}
