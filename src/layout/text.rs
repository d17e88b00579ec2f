use super::TextBlock;

/// Approximate glyph advance as a fraction of the font size. Calibrated
/// against common sans stacks; diacritic-heavy names fall back to the
/// default bucket, which errs slightly wide.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | '\'' | '.' | ',' | ':' | ';' | '|' | '!' => 0.27,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' => 0.35,
        'm' | 'w' => 0.85,
        'M' | 'W' | '@' | '%' | '&' => 0.93,
        'I' | 'J' => 0.31,
        'A'..='Z' => 0.67,
        '0'..='9' => 0.6,
        _ => 0.57,
    }
}

pub(crate) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Greedy word wrap against a pixel budget. A single word wider than the
/// budget gets its own line rather than being split mid-word.
pub(crate) fn wrap_line(line: &str, max_width: f32, font_size: f32) -> Vec<String> {
    if text_width(line, font_size) <= max_width {
        return vec![line.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub(crate) fn measure_label(
    text: &str,
    font_size: f32,
    line_height: f32,
    max_width: f32,
) -> TextBlock {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        lines.extend(wrap_line(raw.trim(), max_width, font_size));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| text_width(line, font_size))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}
