//! Text measurement and line breaking.
//!
//! Layout only needs to know how wide a run of text is in a given font. The
//! [`TextMetrics`] trait hides where that answer comes from: real glyph
//! advances ([`crate::fonts::FontMetrics`]) or a fixed per-character width
//! ([`FixedWidthMetrics`]) for headless layout and tests.

use crate::style::{pt_to_mm, FontSpec};

/// Measures the advance width of text.
pub trait TextMetrics {
    /// Width of `text` set in `font`, in millimetres.
    fn text_width(&self, font: &FontSpec, text: &str) -> f64;
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        (**self).text_width(font, text)
    }
}

/// Metrics that assume every character advances by a fixed fraction of the em.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedWidthMetrics {
    em_fraction: f64,
}

impl FixedWidthMetrics {
    /// Every character is `em_fraction × font size` wide.
    pub fn new(em_fraction: f64) -> Self {
        Self { em_fraction }
    }
}

impl Default for FixedWidthMetrics {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextMetrics for FixedWidthMetrics {
    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        let advance = pt_to_mm(f64::from(font.size())) * self.em_fraction;
        text.chars().count() as f64 * advance
    }
}

/// Breaks `text` into lines no wider than `max_width`.
///
/// Explicit `\n` characters always start a new line. Words are separated by
/// whitespace and filled greedily; a word that is wider than a full line on its
/// own is split between characters. An empty paragraph yields a single empty
/// line so it still occupies vertical space.
pub fn wrap_lines<M>(metrics: &M, font: &FontSpec, text: &str, max_width: f64) -> Vec<String>
where
    M: TextMetrics + ?Sized,
{
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let before = lines.len();
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if metrics.text_width(font, &candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if metrics.text_width(font, word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = split_word(metrics, font, word, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current.is_empty() || lines.len() == before {
            lines.push(current);
        }
    }
    lines
}

fn split_word<M>(metrics: &M, font: &FontSpec, word: &str, max_width: f64) -> Vec<String>
where
    M: TextMetrics + ?Sized,
{
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && metrics.text_width(font, &current) > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, ch.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
