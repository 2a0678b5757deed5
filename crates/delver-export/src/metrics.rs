//! Width measurement for the paginator.
//!
//! Pagination needs a deterministic answer to "how wide does this line
//! render" before any font file is touched. The standard Helvetica
//! advance widths (in 1/1000 em) cover printable ASCII; everything else
//! falls back to the digit width, which over-estimates and therefore
//! never lets a line overflow the text area.

/// Helvetica advance widths for code points 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

/// Rendered width of `text` at `font_size` points, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let em_thousandths: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(FALLBACK_WIDTH)
            }
        })
        .sum();
    em_thousandths as f32 * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_zero_width() {
        assert_eq!(text_width("", 11.0), 0.0);
    }

    #[test]
    fn width_scales_with_font_size() {
        let narrow = text_width("report", 11.0);
        let wide = text_width("report", 22.0);
        assert!((wide - 2.0 * narrow).abs() < 1e-3);
    }

    #[test]
    fn proportional_widths_are_applied() {
        // 'i' (222) is narrower than 'm' (833) in Helvetica.
        assert!(text_width("iiii", 11.0) < text_width("mmmm", 11.0));
        // A space is 278/1000 em.
        assert!((text_width(" ", 10.0) - 2.78).abs() < 1e-3);
    }

    #[test]
    fn non_ascii_falls_back_to_a_safe_width() {
        assert_eq!(text_width("é", 11.0), text_width("0", 11.0));
    }
}
