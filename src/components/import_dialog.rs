//! Import dialogs
//!
//! `ImportDialog` asks for the path of a CSV file to copy into the library.
//! `ConflictDialog` asks what to do when the name is already taken by
//! different content.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::services::ConflictChoice;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Import Path Prompt
// ═══════════════════════════════════════════════════════════════════════════════

/// Path prompt for importing a file
#[derive(Default)]
pub struct ImportDialog {
    pub path: String,
}

impl ImportDialog {
    pub fn reset(&mut self) {
        self.path.clear();
    }
}

impl Component for ImportDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => {
                let path = self.path.trim();
                (!path.is_empty()).then(|| Action::ImportPath(path.to_string()))
            }
            KeyCode::Backspace => {
                self.path.pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.path.clear();
                None
            }
            KeyCode::Char(c) => {
                self.path.push(c);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 64, 8);
        frame.render_widget(Clear, popup_area);

        let content = vec![
            Line::from(Span::styled(
                "Path of the CSV file to import:",
                Style::default().fg(Color::White),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(self.path.clone(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Enter ", Style::default().fg(Color::Green)),
                Span::raw("Import  "),
                Span::styled(" Ctrl+U ", Style::default().fg(Color::Cyan)),
                Span::raw("Clear  "),
                Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("Cancel"),
            ]),
        ];

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Import CSV ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Name Conflict
// ═══════════════════════════════════════════════════════════════════════════════

/// Conflict resolution dialog
pub struct ConflictDialog {
    pub filename: String,
    pub suggested: String,
    /// Editing the replacement name
    pub renaming: bool,
    pub name: String,
}

impl ConflictDialog {
    pub fn new(filename: impl Into<String>, suggested: impl Into<String>) -> Self {
        let suggested = suggested.into();
        Self {
            filename: filename.into(),
            name: suggested.clone(),
            suggested,
            renaming: false,
        }
    }

    fn handle_rename_input(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.renaming = false;
                None
            }
            KeyCode::Enter => Some(Action::ResolveConflict(ConflictChoice::Rename(
                self.name.clone(),
            ))),
            KeyCode::Backspace => {
                self.name.pop();
                None
            }
            KeyCode::Char(c) => {
                self.name.push(c);
                None
            }
            _ => None,
        }
    }
}

impl Component for ConflictDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.renaming {
            return Ok(self.handle_rename_input(key));
        }
        let action = match key.code {
            KeyCode::Char('o') | KeyCode::Char('O') => {
                Some(Action::ResolveConflict(ConflictChoice::Overwrite))
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.renaming = true;
                self.name = self.suggested.clone();
                None
            }
            KeyCode::Esc | KeyCode::Char('c') => {
                Some(Action::ResolveConflict(ConflictChoice::Cancel))
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 60, 10);
        frame.render_widget(Clear, popup_area);

        let mut content = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    self.filename.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" already exists with different content"),
            ]),
            Line::from(""),
        ];

        if self.renaming {
            content.push(Line::from(vec![
                Span::styled("New name: ", Style::default().fg(Color::DarkGray)),
                Span::styled(self.name.clone(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]));
            content.push(Line::from(""));
            content.push(Line::from(vec![
                Span::styled(" Enter ", Style::default().fg(Color::Green)),
                Span::raw("Import as  "),
                Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("Back"),
            ]));
        } else {
            content.push(Line::from(vec![
                Span::styled("Suggested: ", Style::default().fg(Color::DarkGray)),
                Span::styled(self.suggested.clone(), Style::default().fg(Color::Cyan)),
            ]));
            content.push(Line::from(""));
            content.push(Line::from(vec![
                Span::styled(
                    " o ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw("Overwrite  "),
                Span::styled(
                    " r ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("Rename  "),
                Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
                Span::raw("Cancel"),
            ]));
        }

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Name Conflict ")
                    .title_style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_import_path_is_trimmed() {
        let mut dialog = ImportDialog::default();
        assert_eq!(dialog.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
        for c in " /tmp/a.csv ".chars() {
            dialog.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::ImportPath("/tmp/a.csv".to_string()))
        );
    }

    #[test]
    fn test_conflict_rename_starts_from_suggestion() {
        let mut dialog = ConflictDialog::new("a.csv", "a (1).csv");
        assert_eq!(dialog.handle_key_event(key(KeyCode::Char('r'))).unwrap(), None);
        assert!(dialog.renaming);

        for _ in 0.."(1).csv".len() {
            dialog.handle_key_event(key(KeyCode::Backspace)).unwrap();
        }
        for c in "new.csv".chars() {
            dialog.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::ResolveConflict(ConflictChoice::Rename(
                "a new.csv".to_string()
            )))
        );
    }

    #[test]
    fn test_conflict_overwrite_and_cancel() {
        let mut dialog = ConflictDialog::new("a.csv", "a (1).csv");
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('o'))).unwrap(),
            Some(Action::ResolveConflict(ConflictChoice::Overwrite))
        );
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::ResolveConflict(ConflictChoice::Cancel))
        );
    }
}
