//! Line wrapping and pagination for exported documents.

use serde::{Deserialize, Serialize};

use crate::export::metrics::FontMetricTable;

/// Page geometry, all in points. Defaults: A4 portrait, 40pt margins,
/// 12pt text on 16pt lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            margin_pt: 40.0,
            font_size_pt: 12.0,
            line_height_pt: 16.0,
        }
    }
}

impl ExportConfig {
    pub fn usable_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_pt * 2.0
    }
}

/// A line placed on a page. `y` is measured from the top edge to the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub y: f32,
}

pub type Page = Vec<PlacedLine>;

/// Splits `text` into lines no wider than the usable width.
///
/// Each source line is wrapped greedily on whitespace; blank source lines are
/// kept as empty lines. A single word wider than the line is broken by
/// characters.
pub fn wrap_text(text: &str, metrics: &FontMetricTable, config: &ExportConfig) -> Vec<String> {
    let max_width_em = config.usable_width_pt() / config.font_size_pt;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in words {
            let word_w = metrics.measure_str(word);
            let space_w = if current.is_empty() {
                0.0
            } else {
                metrics.space_width
            };

            if !current.is_empty() && current_width + space_w + word_w > max_width_em {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_w > max_width_em {
                // Overlong word: fill lines character by character.
                for c in word.chars() {
                    let c_w = metrics.char_width(c);
                    if !current.is_empty() && current_width + c_w > max_width_em {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += c_w;
                }
                continue;
            }

            if !current.is_empty() {
                current.push(' ');
                current_width += metrics.space_width;
            }
            current.push_str(word);
            current_width += word_w;
        }
        lines.push(current);
    }

    lines
}

/// Places lines top to bottom, starting a new page whenever the next line
/// would run past the bottom margin.
pub fn paginate(lines: Vec<String>, config: &ExportConfig) -> Vec<Page> {
    let bottom = config.page_height_pt - config.margin_pt;
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Page = Vec::new();
    let mut y = config.margin_pt;

    for text in lines {
        if y + config.line_height_pt > bottom {
            pages.push(std::mem::take(&mut current));
            y = config.margin_pt;
        }
        current.push(PlacedLine { text, y });
        y += config.line_height_pt;
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}
