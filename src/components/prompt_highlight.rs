use crate::services::find_wildcards;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

fn wildcard_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// Split one line into spans, styling `__wildcard__` tokens
pub fn highlight_line(line: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for (start, end) in find_wildcards(line) {
        if start > last {
            spans.push(Span::styled(line[last..start].to_string(), base));
        }
        spans.push(Span::styled(line[start..end].to_string(), wildcard_style()));
        last = end;
    }
    if last < line.len() {
        spans.push(Span::styled(line[last..].to_string(), base));
    }
    spans
}

/// Highlight a prompt, one `Line` per text line
pub fn highlight_prompt(text: &str, base: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(highlight_line(line, base)))
        .collect()
}
