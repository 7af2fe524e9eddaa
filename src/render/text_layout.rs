//! Wrapping and placement of the text blocks drawn on a post image.
//!
//! Line width is estimated from a character-width heuristic
//! (`font_size * char_width_ratio` per character) so that wrapping does not
//! depend on the font being available. Horizontal centering uses a
//! [`TextMeasure`], which is backed by real font metrics when fonts are loaded.

use spdlog::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Title,
    Body,
    Author,
}

pub trait TextMeasure {
    /// Width in pixels of `text` rendered at `font_size` for the given block.
    fn measure(&self, role: BlockRole, text: &str, font_size: f32) -> f32;
}

/// Width estimate used when no font metrics are available.
pub struct HeuristicMeasure {
    pub char_width_ratio: f32,
}

impl TextMeasure for HeuristicMeasure {
    fn measure(&self, _role: BlockRole, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.char_width_ratio
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub role: BlockRole,
    pub text: String,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub role: BlockRole,
    pub text: String,
    pub font_size: f32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone)]
pub struct LayoutSettings {
    pub canvas_size: u32,
    pub margin: u32,
    pub char_width_ratio: f32,
    pub line_spacing: f32,
    pub block_gap: u32,
}

impl LayoutSettings {
    pub fn max_text_width(&self) -> u32 {
        self.canvas_size.saturating_sub(self.margin * 2)
    }

    pub fn line_height(&self, font_size: f32) -> u32 {
        (font_size * self.line_spacing).round().max(1.0) as u32
    }

    /// Pixels a stack starting at `top` runs past the bottom margin. 0 when it fits.
    pub fn overflow(&self, top: u32, total_height: u32) -> u32 {
        let bottom = self.canvas_size.saturating_sub(self.margin);
        (top + total_height).saturating_sub(bottom)
    }
}

/// How many characters fit in `max_width` pixels. Never less than 1.
pub fn max_chars_per_line(max_width: u32, font_size: f32, char_width_ratio: f32) -> usize {
    let char_width = font_size * char_width_ratio;
    if char_width <= 0.0 {
        return max_width.max(1) as usize;
    }
    ((max_width as f32 / char_width).floor() as usize).max(1)
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Greedy word wrap. Newlines in `text` start a new paragraph, and words longer
/// than `max_chars` are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = vec![];

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let mut pieces = split_long_word(word, max_chars);
                if let Some(last) = pieces.pop() {
                    lines.extend(pieces);
                    current_len = last.chars().count();
                    current = last;
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Wraps every block, stacks the non-empty ones with `block_gap` between them and
/// centers the whole stack vertically. Each line is centered horizontally.
pub fn layout_blocks(blocks: &[TextBlock], settings: &LayoutSettings, measure: &dyn TextMeasure) -> Vec<PlacedLine> {
    let max_width = settings.max_text_width();

    let wrapped: Vec<(&TextBlock, Vec<String>)> = blocks.iter()
        .map(|b| (b, wrap_text(&b.text, max_chars_per_line(max_width, b.font_size, settings.char_width_ratio))))
        .filter(|(_, lines)| !lines.is_empty())
        .collect();

    if wrapped.is_empty() {
        return vec![];
    }

    let total_height: u32 = wrapped.iter()
        .map(|(b, lines)| settings.line_height(b.font_size) * lines.len() as u32)
        .sum::<u32>()
        + settings.block_gap * (wrapped.len() as u32 - 1);

    let top = (settings.canvas_size.saturating_sub(total_height) / 2).max(settings.margin);
    let overflow = settings.overflow(top, total_height);
    if overflow > 0 {
        warn!("Text is {}px taller than the image allows, the last lines will be cut", overflow);
    }

    let mut placed = vec![];
    let mut y = top;
    for (i, (block, lines)) in wrapped.iter().enumerate() {
        if i > 0 {
            y += settings.block_gap;
        }
        let line_height = settings.line_height(block.font_size);
        for line in lines {
            let width = measure.measure(block.role, line, block.font_size).round().max(0.0) as u32;
            let x = (settings.canvas_size.saturating_sub(width) / 2).max(settings.margin.min(settings.canvas_size.saturating_sub(width)));
            placed.push(PlacedLine {
                role: block.role,
                text: line.clone(),
                font_size: block.font_size,
                x: x as i32,
                y: y as i32,
            });
            y += line_height;
        }
    }

    placed
}
