//! Library file picker dialog
//!
//! Two modes:
//! - deck mode (`row == None`): toggle any number of files, Enter syncs the
//!   deck's CSV rows to the picked set
//! - row mode: Enter replaces the file of one row

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::filter_list::{key_hint, render_filter_input, render_help_bar, FilterList};
use crate::model::RowId;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// File picker dialog
#[derive(Default)]
pub struct FilePickerDialog {
    /// Row being re-pointed; `None` picks files for the whole deck
    pub row: Option<RowId>,
    pub list: FilterList,
    /// Picked files in pick order
    pub picked: Vec<String>,
}

impl FilePickerDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the dialog for a new invocation
    ///
    /// `current` is the deck's file set in deck mode, or the row's file in
    /// row mode.
    pub fn open(&mut self, row: Option<RowId>, files: Vec<String>, current: Vec<String>) {
        self.row = row;
        self.list.set_items(files);
        self.picked = current;
        if let (Some(_), Some(file)) = (row, self.picked.first().cloned()) {
            self.list.select_item(&file);
        }
    }

    pub fn is_picked(&self, file: &str) -> bool {
        self.picked.iter().any(|f| f == file)
    }

    fn toggle_highlighted(&mut self) {
        let Some(file) = self.list.selected_item().map(str::to_string) else {
            return;
        };
        if let Some(pos) = self.picked.iter().position(|f| *f == file) {
            self.picked.remove(pos);
        } else {
            self.picked.push(file);
        }
    }
}

impl Component for FilePickerDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => match self.row {
                Some(row) => self
                    .list
                    .selected_item()
                    .map(|file| Action::FilesPicked {
                        row: Some(row),
                        files: vec![file.to_string()],
                    }),
                None => Some(Action::FilesPicked {
                    row: None,
                    files: self.picked.clone(),
                }),
            },
            KeyCode::Char(' ') if self.row.is_none() => {
                self.toggle_highlighted();
                None
            }
            _ => {
                self.list.handle_key(key);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_width = 64u16.min(area.width.saturating_sub(4));
        let popup_height = 24u16.min(area.height.saturating_sub(2));
        let popup_area = centered_popup(area, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Filter
                Constraint::Min(3),    // File list
                Constraint::Length(3), // Help bar
            ])
            .split(popup_area);

        let title = match self.row {
            Some(_) => "Replace File".to_string(),
            None => format!("CSV Files ({} picked)", self.picked.len()),
        };
        render_filter_input(frame, chunks[0], &title, &self.list.filter);

        if self.list.items().is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No CSV files in the library",
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(Span::styled(
                    "Press i on the main screen to import one",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
            frame.render_widget(empty, chunks[1]);
        } else {
            let items: Vec<ListItem> = self
                .list
                .visible()
                .map(|file| {
                    let marker = if self.row.is_some() {
                        "  "
                    } else if self.is_picked(file) {
                        "● "
                    } else {
                        "○ "
                    };
                    // Directory part dimmed so files group visually
                    let (dir, name) = match file.rfind('/') {
                        Some(pos) => (&file[..=pos], &file[pos + 1..]),
                        None => ("", file),
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(marker, Style::default().fg(Color::Green)),
                        Span::styled(dir.to_string(), Style::default().fg(Color::DarkGray)),
                        Span::styled(name.to_string(), Style::default().fg(Color::White)),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(list, chunks[1], &mut self.list.list_state);
        }

        let help = if self.row.is_some() {
            vec![
                key_hint("Enter", Color::Yellow),
                Span::raw("Use file  "),
                key_hint("↑/↓", Color::Cyan),
                Span::raw("Navigate  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Cancel"),
            ]
        } else {
            vec![
                key_hint("Space", Color::Green),
                Span::raw("Toggle  "),
                key_hint("Enter", Color::Yellow),
                Span::raw("Apply  "),
                key_hint("↑/↓", Color::Cyan),
                Span::raw("Navigate  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Cancel"),
            ]
        };
        render_help_bar(frame, chunks[2], help);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn files() -> Vec<String> {
        vec!["a.csv".to_string(), "b.csv".to_string(), "sub/c.csv".to_string()]
    }

    #[test]
    fn test_deck_mode_toggles_in_pick_order() {
        let mut dialog = FilePickerDialog::new();
        dialog.open(None, files(), vec!["b.csv".to_string()]);

        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        dialog.handle_key_event(key(KeyCode::Home)).unwrap();
        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();

        let action = dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            action,
            Some(Action::FilesPicked {
                row: None,
                files: vec![
                    "b.csv".to_string(),
                    "sub/c.csv".to_string(),
                    "a.csv".to_string()
                ],
            })
        );
    }

    #[test]
    fn test_row_mode_picks_highlighted_file() {
        let mut dialog = FilePickerDialog::new();
        dialog.open(Some(RowId(4)), files(), vec!["b.csv".to_string()]);
        // Starts on the row's current file
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();

        let action = dialog.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            action,
            Some(Action::FilesPicked {
                row: Some(RowId(4)),
                files: vec!["sub/c.csv".to_string()],
            })
        );
    }
}
