//! Greedy word wrap against the static font metrics.

use crate::layout::font_metrics::{FontMetricTable, MM_PER_PT};

/// Splits `text` into lines no wider than `max_width_mm` at `font_size_pt`.
///
/// Explicit newlines start a new line; blank paragraphs are kept as empty
/// lines. A single word wider than the line is broken between characters.
/// Text that is empty or whitespace-only yields no lines.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    font_size_pt: f32,
    max_width_mm: f32,
) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let max_width = max_width_mm / (font_size_pt * MM_PER_PT);
    let mut lines = Vec::new();
    for paragraph in text.trim().lines() {
        wrap_paragraph(paragraph, metrics, max_width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, metrics: &FontMetricTable, max_width: f32, out: &mut Vec<String>) {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    if words.is_empty() {
        out.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let word_w = metrics.measure_str(word);
        let space_w = if current.is_empty() { 0.0 } else { metrics.space_width };

        if current_width + space_w + word_w <= max_width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width += space_w + word_w;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if word_w <= max_width {
            current.push_str(word);
            current_width = word_w;
        } else {
            // Over-long token: break it where it overflows.
            for c in word.chars() {
                let c_w = metrics.char_width(c);
                if !current.is_empty() && current_width + c_w > max_width {
                    out.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += c_w;
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, FontStyle};

    fn metrics() -> &'static FontMetricTable {
        get_metrics(FontStyle::Normal)
    }

    #[test]
    fn test_wrap_empty_returns_no_lines() {
        assert!(wrap_text("", metrics(), 10.0, 170.0).is_empty());
        assert!(wrap_text("   \n ", metrics(), 10.0, 170.0).is_empty());
    }

    #[test]
    fn test_wrap_single_word_one_line() {
        assert_eq!(wrap_text("Rust", metrics(), 10.0, 170.0), vec!["Rust"]);
    }

    #[test]
    fn test_wrap_long_text_respects_width() {
        let text = "Led a team of six engineers rebuilding the ingestion pipeline ".repeat(8);
        let lines = wrap_text(&text, metrics(), 10.0, 170.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics().measure_mm(line, 10.0) <= 170.0 + 1e-3, "line too wide: {line}");
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("first\n\nthird", metrics(), 10.0, 170.0);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, metrics(), 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(metrics().measure_mm(line, 10.0) <= 50.0 + 1e-3);
        }
    }

    #[test]
    fn test_wide_win_ansi_glyphs_wrap_at_afm_width() {
        // Helvetica em dash is 1000/1000 em: 3.53 mm at 10 pt, so 14 fit in 50 mm.
        let dashes = "—".repeat(60);
        let lines = wrap_text(&dashes, metrics(), 10.0, 50.0);
        assert_eq!(lines.len(), 5);
        for line in &lines {
            let true_width_mm = line.chars().count() as f32 * 10.0 * MM_PER_PT;
            assert!(true_width_mm <= 50.0 + 1e-3, "line too wide: {true_width_mm} mm");
        }
    }
}
