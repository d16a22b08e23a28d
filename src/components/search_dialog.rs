//! Content search dialog
//!
//! Type a query and press Enter to search the deck's CSV files. Hits are
//! grouped by file; Space toggles a (file, label) pair and Enter on the
//! results writes every file's selection back to its rows.

use crate::action::Action;
use crate::component::Component;
use crate::components::filter_list::{key_hint, render_help_bar};
use crate::services::{FileHits, SearchSelections};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Which part of the dialog receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFocus {
    #[default]
    Query,
    Results,
}

/// Search dialog
#[derive(Default)]
pub struct SearchDialog {
    pub query: String,
    pub focus: SearchFocus,
    pub results: Vec<FileHits>,
    pub selections: SearchSelections,
    /// CSV files of the deck, for the bulk actions
    pub files: Vec<String>,
    /// Index into the flattened (file, key) hits
    pub cursor: usize,
    /// Whether a search has run since opening
    pub searched: bool,
    list_state: ListState,
}

impl SearchDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a new invocation from the deck's current state
    pub fn open(&mut self, files: Vec<String>, selections: SearchSelections) {
        self.query.clear();
        self.focus = SearchFocus::Query;
        self.results.clear();
        self.selections = selections;
        self.files = files;
        self.cursor = 0;
        self.searched = false;
        self.list_state.select(None);
    }

    /// Show the hits of the last query
    pub fn set_results(&mut self, results: Vec<FileHits>) {
        self.results = results;
        self.searched = true;
        self.cursor = 0;
        if self.hit_count() > 0 {
            self.focus = SearchFocus::Results;
        }
    }

    pub fn hit_count(&self) -> usize {
        self.results.iter().map(|r| r.keys.len()).sum()
    }

    /// The (file, key) pair under the cursor
    pub fn current_hit(&self) -> Option<(&str, &str)> {
        self.results
            .iter()
            .flat_map(|r| r.keys.iter().map(move |k| (r.file.as_str(), k.as_str())))
            .nth(self.cursor)
    }

    fn handle_query_input(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let query = self.query.trim();
                (!query.is_empty()).then(|| Action::SearchQuery(query.to_string()))
            }
            KeyCode::Backspace => {
                self.query.pop();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_results_input(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => Some(Action::SearchApplied(self.selections.clone())),
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.hit_count() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Char(' ') => {
                if let Some((file, key)) = self
                    .current_hit()
                    .map(|(f, k)| (f.to_string(), k.to_string()))
                {
                    self.selections.toggle(&file, &key);
                }
                None
            }
            _ => None,
        }
    }

    /// Position of the cursor in the rendered list, which has file headers
    fn display_index(&self) -> Option<usize> {
        let mut remaining = self.cursor;
        let mut index = 0;
        for group in &self.results {
            index += 1; // header
            if remaining < group.keys.len() {
                return Some(index + remaining);
            }
            remaining -= group.keys.len();
            index += group.keys.len();
        }
        None
    }
}

impl Component for SearchDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    SearchFocus::Query => SearchFocus::Results,
                    SearchFocus::Results => SearchFocus::Query,
                };
                None
            }
            KeyCode::Char('r') if ctrl => {
                self.selections
                    .random_all(self.files.iter().map(String::as_str));
                None
            }
            KeyCode::Char('x') if ctrl => {
                self.selections
                    .clear_all(self.files.iter().map(String::as_str));
                None
            }
            _ => match self.focus {
                SearchFocus::Query => self.handle_query_input(key),
                SearchFocus::Results => self.handle_results_input(key),
            },
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let popup_width = 72u16.min(area.width.saturating_sub(4));
        let popup_height = 28u16.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Query
                Constraint::Min(3),    // Results
                Constraint::Length(3), // Selected summary
                Constraint::Length(3), // Help bar
            ])
            .split(popup_area);

        let query_border = if self.focus == SearchFocus::Query {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let mut query_line = vec![Span::styled(
            self.query.clone(),
            Style::default().fg(Color::White),
        )];
        if self.focus == SearchFocus::Query {
            query_line.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        let query = Paragraph::new(Line::from(query_line)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search labels and outputs ")
                .title_style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )
                .border_style(Style::default().fg(query_border)),
        );
        frame.render_widget(query, chunks[0]);

        let results_border = if self.focus == SearchFocus::Results {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        if self.hit_count() == 0 {
            let message = if self.searched { "No matches" } else { "Press Enter to search" };
            let empty = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(results_border)),
            );
            frame.render_widget(empty, chunks[1]);
        } else {
            let mut items = Vec::new();
            for group in &self.results {
                items.push(ListItem::new(Line::from(Span::styled(
                    group.file.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))));
                for key in &group.keys {
                    let marker = if self.selections.is_selected(&group.file, key) {
                        "  ● "
                    } else {
                        "  ○ "
                    };
                    items.push(ListItem::new(Line::from(vec![
                        Span::styled(marker, Style::default().fg(Color::Green)),
                        Span::styled(key.clone(), Style::default().fg(Color::White)),
                    ])));
                }
            }

            let selected = if self.focus == SearchFocus::Results {
                self.display_index()
            } else {
                None
            };
            self.list_state.select(selected);

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} hits ", self.hit_count()))
                        .border_style(Style::default().fg(results_border)),
                )
                .highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
        }

        let summary: Vec<String> = self
            .selections
            .selected_groups()
            .iter()
            .map(|g| format!("{}: {}", g.file, g.keys.join(", ")))
            .collect();
        let summary_text = if summary.is_empty() {
            "nothing selected".to_string()
        } else {
            summary.join("  |  ")
        };
        let summary = Paragraph::new(Line::from(Span::styled(
            summary_text,
            Style::default().fg(Color::Cyan),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Selected ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(summary, chunks[2]);

        let help = match self.focus {
            SearchFocus::Query => vec![
                key_hint("Enter", Color::Yellow),
                Span::raw("Search  "),
                key_hint("Tab", Color::Cyan),
                Span::raw("Results  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Close"),
            ],
            SearchFocus::Results => vec![
                key_hint("Space", Color::Green),
                Span::raw("Toggle  "),
                key_hint("Enter", Color::Yellow),
                Span::raw("Apply  "),
                key_hint("^R", Color::Magenta),
                Span::raw("All random  "),
                key_hint("^X", Color::Magenta),
                Span::raw("Clear all  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Close"),
            ],
        };
        render_help_bar(frame, chunks[3], help);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RANDOM_KEY;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn results() -> Vec<FileHits> {
        vec![
            FileHits {
                file: "a.csv".to_string(),
                keys: vec!["red".to_string(), "dark red".to_string()],
            },
            FileHits {
                file: "b.csv".to_string(),
                keys: vec!["red hair".to_string()],
            },
        ]
    }

    #[test]
    fn test_query_then_toggle_and_apply() {
        let mut dialog = SearchDialog::new();
        dialog.open(vec!["a.csv".to_string(), "b.csv".to_string()], SearchSelections::default());

        for c in "red".chars() {
            dialog.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::SearchQuery("red".to_string()))
        );

        dialog.set_results(results());
        assert_eq!(dialog.focus, SearchFocus::Results);
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        dialog.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(dialog.current_hit(), Some(("b.csv", "red hair")));
        assert_eq!(dialog.display_index(), Some(4));
        dialog.handle_key_event(key(KeyCode::Char(' '))).unwrap();

        let Some(Action::SearchApplied(selections)) =
            dialog.handle_key_event(key(KeyCode::Enter)).unwrap()
        else {
            panic!("expected SearchApplied");
        };
        assert!(selections.is_selected("b.csv", "red hair"));
        assert!(!selections.is_selected("a.csv", "red"));
    }

    #[test]
    fn test_bulk_random_covers_deck_files() {
        let mut dialog = SearchDialog::new();
        dialog.open(vec!["a.csv".to_string(), "c.csv".to_string()], SearchSelections::default());
        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(dialog.selections.is_selected("a.csv", RANDOM_KEY));
        assert!(dialog.selections.is_selected("c.csv", RANDOM_KEY));

        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(dialog.selections.selected_groups().is_empty());
    }
}
