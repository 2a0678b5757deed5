//! Fallback parsing for loosely-shaped downloader responses.

use regex::Regex;
use std::sync::OnceLock;

/// Process-wide default used when every extraction layer comes up empty.
pub const DEFAULT_EXPORT_URL: &str = "/static/exports/report.pdf";

// Compile-time literal pattern.
#[allow(clippy::unwrap_used)]
fn pdf_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:https?://\S+\.pdf|/static/\S+\.pdf)").unwrap())
}

/// Best-effort extraction of a PDF URL or path from a downloader's
/// free-text response.
///
/// The downloader agent's output shape is not strictly guaranteed, so
/// this layers two attempts: parse the text as a JSON object and read
/// its `url` (or `path`) field; otherwise scan the raw text for an
/// embedded `.pdf`-suffixed URL or `/static/` path. `None` means the
/// caller should fall back to its configured default.
pub fn extract_pdf_url(raw: &str) -> Option<String> {
    if let Ok(serde_json::Value::Object(payload)) = serde_json::from_str(raw) {
        // A JSON object wins outright; one without a usable field
        // yields None rather than falling through to pattern matching.
        return payload
            .get("url")
            .and_then(|u| u.as_str())
            .or_else(|| payload.get("path").and_then(|p| p.as_str()))
            .map(str::to_string);
    }

    pdf_url_regex().find(raw).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_url_field_is_preferred() {
        let raw = r#"{"url": "/static/exports/report.pdf", "path": "/tmp/report.pdf"}"#;
        assert_eq!(
            extract_pdf_url(raw).as_deref(),
            Some("/static/exports/report.pdf")
        );
    }

    #[test]
    fn json_path_field_is_used_when_url_is_missing() {
        let raw = r#"{"path": "/data/exports/report.pdf"}"#;
        assert_eq!(extract_pdf_url(raw).as_deref(), Some("/data/exports/report.pdf"));
    }

    #[test]
    fn json_without_usable_fields_yields_none() {
        assert_eq!(extract_pdf_url(r#"{"status": "success"}"#), None);
    }

    #[test]
    fn embedded_pdf_link_is_pattern_matched() {
        let raw = "The file is at https://cdn.example.com/out/report.pdf for download.";
        assert_eq!(
            extract_pdf_url(raw).as_deref(),
            Some("https://cdn.example.com/out/report.pdf")
        );
    }

    #[test]
    fn embedded_static_path_is_pattern_matched() {
        let raw = "Saved to /static/exports/tariffs.pdf just now";
        assert_eq!(
            extract_pdf_url(raw).as_deref(),
            Some("/static/exports/tariffs.pdf")
        );
    }

    #[test]
    fn bare_json_string_payloads_still_get_pattern_matched() {
        let raw = "\"saved to /static/exports/a.pdf\"";
        assert_eq!(
            extract_pdf_url(raw).as_deref(),
            Some("/static/exports/a.pdf")
        );
        // Same for other non-object JSON shapes.
        assert_eq!(
            extract_pdf_url("[\"https://cdn.example.com/b.pdf\"]").as_deref(),
            Some("https://cdn.example.com/b.pdf")
        );
    }

    #[test]
    fn unparseable_text_without_a_pdf_reference_yields_none() {
        assert_eq!(extract_pdf_url("the export went fine, probably"), None);
        assert_eq!(extract_pdf_url("   "), None);
    }
}
