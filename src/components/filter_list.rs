//! Filterable list state shared by the picker dialogs
//!
//! Holds the full item list, the typed filter and the highlighted match.
//! Rendering stays in each dialog; this only tracks what is visible.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListState, Paragraph},
    Frame,
};

/// Items narrowed by a case-insensitive substring filter
#[derive(Debug, Default)]
pub struct FilterList {
    items: Vec<String>,
    pub filter: String,
    /// Indexes into `items` that match the filter
    matches: Vec<usize>,
    selected: usize,
    pub list_state: ListState,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items and clear the filter
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.filter.clear();
        self.refilter();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|&i| self.items[i].as_str())
    }

    pub fn visible_len(&self) -> usize {
        self.matches.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.matches
            .get(self.selected)
            .map(|&i| self.items[i].as_str())
    }

    /// Highlight the first visible item equal to `item`
    pub fn select_item(&mut self, item: &str) {
        if let Some(pos) = self.matches.iter().position(|&i| self.items[i] == item) {
            self.selected = pos;
            self.sync_state();
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.matches.len() {
            self.selected += 1;
            self.sync_state();
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.sync_state();
        }
    }

    /// Apply a navigation or filter-editing key
    ///
    /// Returns true when the key was consumed. Plain spaces are left to the
    /// caller, which uses them for toggling.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(10);
                self.sync_state();
            }
            KeyCode::PageDown => {
                self.selected = (self.selected + 10).min(self.matches.len().saturating_sub(1));
                self.sync_state();
            }
            KeyCode::Home => {
                self.selected = 0;
                self.sync_state();
            }
            KeyCode::End => {
                self.selected = self.matches.len().saturating_sub(1);
                self.sync_state();
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter();
            }
            KeyCode::Char(c) if !ctrl && c != ' ' => {
                self.filter.push(c);
                self.refilter();
            }
            _ => return false,
        }
        true
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.matches = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.selected = 0;
        self.sync_state();
    }

    fn sync_state(&mut self) {
        if self.matches.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(self.selected));
        }
    }
}

/// Draw a one-line filter input inside a bordered box
pub fn render_filter_input(frame: &mut Frame, area: Rect, title: &str, filter: &str) {
    let content = if filter.is_empty() {
        Line::from(Span::styled(
            "type to filter",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(filter.to_string(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Cyan)),
        ])
    };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(input, area);
}

/// Draw a centered help bar inside a bordered box
pub fn render_help_bar(frame: &mut Frame, area: Rect, spans: Vec<Span<'static>>) {
    let help = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, area);
}

/// Key hint span in the help bar style
pub fn key_hint(key: &str, color: Color) -> Span<'static> {
    Span::styled(format!(" {} ", key), Style::default().fg(color))
}
