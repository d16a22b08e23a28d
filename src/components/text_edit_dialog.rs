//! Multiline text editor for the pre-text and extra rows

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::filter_list::{key_hint, render_help_bar};
use crate::components::prompt_highlight::highlight_line;
use crate::model::TextTarget;
use crate::services::insert_wildcard;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Text editor dialog
pub struct TextEditDialog {
    pub target: TextTarget,
    lines: Vec<String>,
    /// Cursor line
    row: usize,
    /// Cursor position in chars within the line
    col: usize,
    scroll: usize,
}

impl TextEditDialog {
    pub fn new(target: TextTarget, text: &str) -> Self {
        let mut dialog = Self {
            target,
            lines: Vec::new(),
            row: 0,
            col: 0,
            scroll: 0,
        };
        dialog.set_text(text);
        dialog
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the buffer and put the cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].chars().count();
    }

    /// Append a wildcard token the same way the main screen does
    pub fn insert_token(&mut self, token: &str) {
        let text = insert_wildcard(&self.text(), token);
        self.set_text(&text);
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn byte_offset(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.row];
        let at = Self::byte_offset(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = Self::byte_offset(line, self.col);
        let rest = line.split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = Self::byte_offset(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let line = &mut self.lines[self.row];
            let at = Self::byte_offset(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.line_len(self.row);
                }
            }
            KeyCode::Right => {
                if self.col < self.line_len(self.row) {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up if self.row > 0 => {
                self.row -= 1;
                self.col = self.col.min(self.line_len(self.row));
            }
            KeyCode::Down if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = self.col.min(self.line_len(self.row));
            }
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(self.row),
            _ => {}
        }
    }
}

impl Component for TextEditDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Char('s') if ctrl => Some(Action::TextEdited {
                target: self.target,
                text: self.text(),
            }),
            KeyCode::Char('w') if ctrl => Some(Action::OpenWildcards),
            KeyCode::Char(c) if !ctrl => {
                self.insert_char(c);
                None
            }
            KeyCode::Enter => {
                self.newline();
                None
            }
            KeyCode::Backspace => {
                self.backspace();
                None
            }
            KeyCode::Delete => {
                self.delete();
                None
            }
            code => {
                self.move_cursor(code);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_width = 76u16.min(area.width.saturating_sub(4));
        let popup_height = 18u16.min(area.height.saturating_sub(2));
        let popup_area = centered_popup(area, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(popup_area);

        let title = match self.target {
            TextTarget::PreText => " Pre-text ",
            TextTarget::Extra(_) => " Additional prompt ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(chunks[0]);

        let visible = inner.height.max(1) as usize;
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + visible {
            self.scroll = self.row + 1 - visible;
        }

        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(visible)
            .map(|l| Line::from(highlight_line(l, Style::default().fg(Color::White))))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        // No wrapping, so the cursor column is the display width before it
        let line = &self.lines[self.row];
        let before = &line[..Self::byte_offset(line, self.col)];
        let x = inner.x + (before.width() as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (self.row - self.scroll) as u16;
        frame.set_cursor_position(Position::new(x, y));

        render_help_bar(
            frame,
            chunks[1],
            vec![
                key_hint("Ctrl+S", Color::Green),
                Span::raw("Save  "),
                key_hint("Ctrl+W", Color::Magenta),
                Span::raw("Wildcard  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Discard"),
            ],
        );

        Ok(())
    }
}
