//! Help dialog component
//!
//! Displays all keyboard shortcuts available in the application.

use crate::action::Action;
use crate::component::Component;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Clear the area
        frame.render_widget(Clear, area);

        let margin = 4;
        let dialog_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        // Render scrollbar if content exceeds visible area
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Helper to add a section header
    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    // Helper to add a shortcut line
    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:12}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Rows");
    add_shortcut(&mut lines, "j / ↓", "Select next row");
    add_shortcut(&mut lines, "k / ↑", "Select previous row");
    add_shortcut(&mut lines, "Home / End", "First / last row");
    add_shortcut(&mut lines, "J / K", "Move row down / up");
    add_shortcut(&mut lines, "a", "Pick CSV files for the deck");
    add_shortcut(&mut lines, "x", "Add an additional prompt row");
    add_shortcut(&mut lines, "Enter / e", "Edit labels or text of the row");
    add_shortcut(&mut lines, "f", "Replace the file of the row");
    add_shortcut(&mut lines, "d / Del", "Remove the row");

    add_section(&mut lines, "Mouse");
    add_shortcut(&mut lines, "Drag", "Grab a row and drop it elsewhere");
    add_shortcut(&mut lines, "Release out", "Releasing outside the list cancels");
    add_shortcut(&mut lines, "Esc", "Cancel the drag in progress");
    add_shortcut(&mut lines, "Wheel", "Select next / previous row");

    add_section(&mut lines, "Decks");
    add_shortcut(&mut lines, "Tab", "Next deck");
    add_shortcut(&mut lines, "Shift+Tab", "Previous deck");
    add_shortcut(&mut lines, "n", "New deck");
    add_shortcut(&mut lines, "X", "Remove deck");
    add_shortcut(&mut lines, "p", "Edit pre-text");
    add_shortcut(&mut lines, "c", "Toggle trailing comma");

    add_section(&mut lines, "Generate");
    add_shortcut(&mut lines, "g", "Compose the prompt");
    add_shortcut(&mut lines, "m", "Cycle seed control");
    add_shortcut(&mut lines, "+ / -", "Adjust seed");

    add_section(&mut lines, "Dialogs");
    add_shortcut(&mut lines, "s / /", "Search labels and outputs");
    add_shortcut(&mut lines, "w", "Insert a wildcard");
    add_shortcut(&mut lines, "i", "Import a CSV file");
    add_shortcut(&mut lines, "v", "Look up model previews");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");

    add_section(&mut lines, "Text Editor");
    add_shortcut(&mut lines, "Ctrl+S", "Save");
    add_shortcut(&mut lines, "Ctrl+W", "Insert a wildcard");
    add_shortcut(&mut lines, "Esc", "Discard changes");

    add_section(&mut lines, "Wildcard Picker");
    add_shortcut(&mut lines, "Ctrl+R", "Rescan the wildcard directory");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_scroll_and_close() {
        let mut dialog = HelpDialog::default();
        let key = |c| KeyEvent::new(c, KeyModifiers::NONE);
        dialog.handle_key_event(key(KeyCode::PageDown)).unwrap();
        dialog.handle_key_event(key(KeyCode::Up)).unwrap();
        assert_eq!(dialog.scroll_offset, 9);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('?'))).unwrap(),
            Some(Action::CloseModal)
        );
    }

    #[test]
    fn test_help_lists_drag_cancel() {
        let text: String = build_help_content()
            .iter()
            .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("Releasing outside the list cancels"));
    }
}
