//! Plain-text pagination: soft wrap, measured re-split, page breaks.

/// Page geometry and wrapping knobs, in PDF points (1/72 inch).
#[derive(Debug, Clone)]
pub struct PageMetrics {
    /// Full page width.
    pub page_width: f32,
    /// Full page height.
    pub page_height: f32,
    /// Margin applied on all four sides.
    pub margin: f32,
    /// Vertical advance per body line.
    pub line_height: f32,
    /// Character budget for the fast pre-split before width measuring.
    pub soft_wrap_cols: usize,
    /// Extra vertical space consumed by a title at the top of page 1.
    /// Zero when no title is drawn.
    pub title_advance: f32,
}

impl Default for PageMetrics {
    /// US Letter, 1-inch margins, 11pt body at 14pt leading.
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 72.0,
            line_height: 14.0,
            soft_wrap_cols: 95,
            title_advance: 0.0,
        }
    }
}

/// One output page: an ordered sequence of lines, each fitting within
/// `page_width - 2 * margin` under the measurement function it was
/// paginated with (unbreakable fragments excepted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The page's lines, top to bottom. An empty string is a blank line.
    pub lines: Vec<String>,
}

/// Split `text` into pages of wrapped lines.
///
/// The input is treated as plain text: lines are processed independently
/// and blank lines are preserved as empty page lines. Code fences and
/// Markdown headers get no special treatment. `measure` returns the
/// rendered width of a string in the same unit as `metrics`.
///
/// Wrapping happens in two passes per line: a fast soft wrap at
/// `soft_wrap_cols` characters, then a measured re-split of any fragment
/// still wider than the text area, backing off to the last word boundary
/// each time. A fragment with no usable word boundary is emitted as-is
/// rather than hyphenated.
///
/// Empty input produces a single page holding one empty line. Pagination
/// itself never fails.
pub fn paginate<F>(text: &str, metrics: &PageMetrics, measure: F) -> Vec<Page>
where
    F: Fn(&str) -> f32,
{
    let max_width = metrics.page_width - 2.0 * metrics.margin;

    let mut lines: Vec<String> = Vec::new();
    let source: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    };

    for raw in source {
        if raw.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        for fragment in soft_wrap(raw, metrics.soft_wrap_cols) {
            split_measured(fragment, max_width, &measure, &mut lines);
        }
    }

    // Accumulate lines into pages against the bottom margin. The title,
    // when present, consumes extra space on page 1 only.
    let top = metrics.page_height - metrics.margin;
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut y = top - metrics.title_advance;

    for line in lines {
        if y < metrics.margin {
            pages.push(Page { lines: current });
            current = Vec::new();
            y = top;
        }
        current.push(line);
        y -= metrics.line_height;
    }
    pages.push(Page { lines: current });

    pages
}

/// Greedy word wrap at a fixed character budget.
///
/// Runs of whitespace collapse to single spaces; a word longer than the
/// budget is broken at exactly `cols` characters.
fn soft_wrap(line: &str, cols: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let mut word = word.to_string();
        let mut word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= cols {
            current.push(' ');
            current.push_str(&word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }

        while word_len > cols {
            let split: usize = word.chars().take(cols).map(char::len_utf8).sum();
            let rest = word.split_off(split);
            out.push(word);
            word = rest;
            word_len -= cols;
        }
        current = word;
        current_len = word_len;
    }

    if current_len > 0 {
        out.push(current);
    }
    if out.is_empty() {
        out.push(line.to_string());
    }
    out
}

/// Re-split one soft-wrapped fragment against the measured text width,
/// appending finished lines to `lines`.
fn split_measured<F>(fragment: String, max_width: f32, measure: &F, lines: &mut Vec<String>)
where
    F: Fn(&str) -> f32,
{
    let mut remainder = fragment;

    while measure(&remainder) > max_width && remainder.contains(' ') {
        let chars: Vec<char> = remainder.chars().collect();

        // Largest prefix that fits the width budget.
        let mut cut = chars.len();
        let mut prefix: String = chars.iter().collect();
        while cut > 0 && measure(&prefix) > max_width {
            cut -= 1;
            prefix = chars[..cut].iter().collect();
        }

        // Back off to the last word boundary inside the fitting prefix.
        // Without one, emit the over-width remainder as-is below.
        match prefix.rfind(' ') {
            None | Some(0) => break,
            Some(sp) => {
                lines.push(remainder[..sp].to_string());
                remainder = remainder[sp + 1..].to_string();
            }
        }
    }

    lines.push(remainder);
}
