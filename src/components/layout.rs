//! Layout calculations and text fitting for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Main screen layout areas
pub struct MainLayout {
    pub tabs: Rect,
    pub settings: Rect,
    pub rows: Rect,
    pub prompt: Rect,
    pub status: Option<Rect>,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Calculate main screen layout
pub fn calculate_main_layout(area: Rect, has_status: bool) -> MainLayout {
    // Main vertical layout: content + (optional status) + help bar
    let main_chunks = if has_status {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area)
    };

    // Horizontal split: deck (55%) and composed prompt (45%)
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[0]);

    // Left panel: deck tabs + settings + rows
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(horizontal_chunks[0]);

    let (status_area, help_area) = if has_status {
        (Some(main_chunks[1]), main_chunks[2])
    } else {
        (None, main_chunks[1])
    };

    MainLayout {
        tabs: left_chunks[0],
        settings: left_chunks[1],
        rows: left_chunks[2],
        prompt: horizontal_chunks[1],
        status: status_area,
        help: help_area,
    }
}

/// Cut `text` to at most `width` display columns, ending with `…` when cut
pub fn ellipsize(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// First line of `text`, marked when more lines follow
pub fn first_line(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("").to_string();
    if lines.next().is_some() {
        format!("{} ⏎", first)
    } else {
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipsize_respects_display_width() {
        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("abcdefgh", 5), "abcd…");
        // Wide characters take two columns each
        assert_eq!(ellipsize("日本語テキスト", 5), "日本…");
        assert_eq!(ellipsize("abc", 0), "");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one"), "one");
        assert_eq!(first_line("one\ntwo"), "one ⏎");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_centered_popup_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_popup(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_popup(area, 40, 40), Rect::new(0, 0, 20, 10));
    }
}
