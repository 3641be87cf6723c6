//! # Text Measurement and Line Breaking
//!
//! Width measurement is a pluggable collaborator: the layout algorithm asks
//! `measure(text, font_family, font_size_pt)` for a width in millimeters and
//! never looks at glyphs itself. Any implementation with consistent metrics
//! produces a valid (and deterministic) layout; `BuiltinMetrics` ships
//! Helvetica AFM advance widths so the crate works without font files.
//!
//! Line breaking is the greedy word rule: append the next word to the current
//! line unless that would exceed the available width, in which case the line
//! is closed and the word starts the next one. This exact rule must be
//! preserved for visual fidelity across implementations.

const PT_TO_MM: f64 = 25.4 / 72.0;

/// Width-measurement collaborator.
///
/// Contract: given a string, a font family name, and a font size in points,
/// return the rendered width in millimeters. Must be deterministic for equal
/// inputs within one render.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_family: &str, font_size_pt: f64) -> f64;
}

/// Built-in Helvetica metrics. Advance widths in 1/1000 em for the WinAnsi
/// range that rental documents actually use; everything else falls back to
/// the Helvetica default advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    /// Advance width of one character in 1/1000 em (Helvetica regular).
    fn advance(ch: char) -> u32 {
        match ch {
            ' ' => 278,
            '!' => 278,
            '"' => 355,
            '#' | '$' => 556,
            '%' => 889,
            '&' => 667,
            '\'' => 191,
            '(' | ')' => 333,
            '*' => 389,
            '+' => 584,
            ',' | '.' => 278,
            '-' => 333,
            '/' => 278,
            '0'..='9' => 556,
            ':' | ';' => 278,
            '<' | '=' | '>' => 584,
            '?' => 556,
            '@' => 1015,
            'A' | 'B' | 'C' | 'D' => 667,
            'E' | 'F' => 611,
            'G' | 'H' => 722,
            'I' => 278,
            'J' => 500,
            'K' => 667,
            'L' => 556,
            'M' => 833,
            'N' | 'O' => 722,
            'P' => 667,
            'Q' | 'R' => 722,
            'S' => 667,
            'T' => 611,
            'U' => 722,
            'V' => 667,
            'W' => 944,
            'X' | 'Y' => 667,
            'Z' => 611,
            '[' | ']' => 278,
            '\\' => 278,
            '_' => 556,
            'a' => 556,
            'b' => 556,
            'c' => 500,
            'd' | 'e' => 556,
            'f' => 278,
            'g' | 'h' => 556,
            'i' | 'j' => 222,
            'k' => 500,
            'l' => 222,
            'm' => 833,
            'n' | 'o' | 'p' | 'q' => 556,
            'r' => 333,
            's' => 500,
            't' => 278,
            'u' => 556,
            'v' => 500,
            'w' => 722,
            'x' | 'y' => 500,
            'z' => 500,
            'ä' | 'ö' | 'ü' | 'à' | 'é' | 'è' => 556,
            'Ä' | 'Ö' | 'Ü' => 722,
            'ß' => 611,
            '€' => 556,
            '§' => 556,
            '²' | '³' => 333,
            _ => 556,
        }
    }
}

impl TextMeasurer for BuiltinMetrics {
    fn measure(&self, text: &str, _font_family: &str, font_size_pt: f64) -> f64 {
        let units: u32 = text.chars().map(Self::advance).sum();
        units as f64 / 1000.0 * font_size_pt * PT_TO_MM
    }
}

/// Break `text` into lines not exceeding `max_width_mm`, using the greedy
/// word rule. A single word wider than the line stands alone on its own
/// line (it is never split). Empty text yields one empty line.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    max_width_mm: f64,
    font_family: &str,
    font_size_pt: f64,
) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measurer.measure(&candidate, font_family, font_size_pt) > max_width_mm {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
