//! genpdf-backed drawing of paginated pages.

use crate::paginate::Page;
use delver_core::{DelverError, DelverResult};
use genpdf::elements::{Break, PageBreak, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};
use std::path::Path;

const BODY_FONT_SIZE: u8 = 11;
const TITLE_FONT_SIZE: u8 = 16;
// 1-inch margins, expressed in millimeters for genpdf.
const MARGIN_MM: i32 = 25;

/// Candidate font locations, tried in order. The first entry resolves
/// fonts already on the search path of the running process.
const FONT_SOURCES: &[(&str, &str)] = &[
    ("", "LiberationSans"),
    ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
    ("/usr/share/fonts/TTF", "DejaVuSans"),
    ("/System/Library/Fonts", "Helvetica"),
    ("/Library/Fonts", "Arial"),
];

fn load_font_family() -> DelverResult<genpdf::fonts::FontFamily<genpdf::fonts::FontData>> {
    for (dir, name) in FONT_SOURCES {
        if let Ok(family) = genpdf::fonts::from_files(dir, name, None) {
            return Ok(family);
        }
    }
    Err(DelverError::Export(
        "no usable body font found on this system".to_string(),
    ))
}

/// Draw `pages` to a PDF at `out_path`.
///
/// Each page's lines are drawn top to bottom at fixed line height; the
/// optional title is set bold at the top of page 1 only. Page geometry
/// matches what the pages were paginated for (US Letter, 1-inch margins).
pub fn render_pdf(pages: &[Page], title: Option<&str>, out_path: &Path) -> DelverResult<()> {
    let family = load_font_family()?;

    let mut doc = Document::new(family);
    doc.set_title(title.unwrap_or("Research report"));
    doc.set_paper_size(genpdf::PaperSize::Letter);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    if let Some(title) = title {
        let title_style = Style::new().bold().with_font_size(TITLE_FONT_SIZE);
        doc.push(Paragraph::new(StyledString::new(
            title.to_string(),
            title_style,
        )));
        doc.push(Break::new(1));
    }

    let body = Style::new().with_font_size(BODY_FONT_SIZE);
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            doc.push(PageBreak::new());
        }
        for line in &page.lines {
            if line.is_empty() {
                doc.push(Break::new(1));
            } else {
                doc.push(Paragraph::new(StyledString::new(line.clone(), body)));
            }
        }
    }

    doc.render_to_file(out_path)
        .map_err(|e| DelverError::Export(format!("failed to render PDF: {e}")))
}
