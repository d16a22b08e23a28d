//! Label picker for one CSV row
//!
//! Lists `(None)`, `Random` and the file's labels. Single mode picks one
//! label with Enter; multi mode toggles labels with Space. `Random` and
//! `(None)` never mix with concrete labels.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::filter_list::{key_hint, render_filter_input, render_help_bar, FilterList};
use crate::model::{RowId, NONE_KEY, RANDOM_KEY};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

/// Key picker dialog
pub struct KeyPickerDialog {
    pub row: RowId,
    pub file: String,
    pub list: FilterList,
    /// Chosen labels, in choice order
    pub chosen: Vec<String>,
    pub multi: bool,
}

impl KeyPickerDialog {
    pub fn new(row: RowId, file: impl Into<String>, labels: &[String], current: &[String]) -> Self {
        let mut options = vec![NONE_KEY.to_string(), RANDOM_KEY.to_string()];
        options.extend(
            labels
                .iter()
                .filter(|l| l.as_str() != NONE_KEY && l.as_str() != RANDOM_KEY)
                .cloned(),
        );

        let mut list = FilterList::new();
        list.set_items(options);
        match current.first() {
            Some(first) => list.select_item(first),
            None => list.select_item(NONE_KEY),
        }

        Self {
            row,
            file: file.into(),
            list,
            chosen: current.to_vec(),
            multi: current.len() > 1,
        }
    }

    pub fn is_chosen(&self, key: &str) -> bool {
        if key == NONE_KEY {
            return self.chosen.is_empty();
        }
        self.chosen.iter().any(|k| k == key)
    }

    fn toggle(&mut self, key: &str) {
        if key == NONE_KEY {
            self.chosen.clear();
            return;
        }
        if let Some(pos) = self.chosen.iter().position(|k| k == key) {
            self.chosen.remove(pos);
            return;
        }
        if key == RANDOM_KEY {
            self.chosen.clear();
        } else {
            self.chosen.retain(|k| k != RANDOM_KEY);
        }
        self.chosen.push(key.to_string());
    }
}

impl Component for KeyPickerDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Tab => {
                self.multi = !self.multi;
                None
            }
            KeyCode::Char(' ') if self.multi => {
                if let Some(item) = self.list.selected_item().map(str::to_string) {
                    self.toggle(&item);
                }
                None
            }
            KeyCode::Enter if self.multi => Some(Action::KeysPicked {
                row: self.row,
                keys: self.chosen.clone(),
            }),
            KeyCode::Enter => self.list.selected_item().map(|item| Action::KeysPicked {
                row: self.row,
                keys: vec![item.to_string()],
            }),
            _ => {
                self.list.handle_key(key);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_width = 56u16.min(area.width.saturating_sub(4));
        let popup_height = 22u16.min(area.height.saturating_sub(2));
        let popup_area = centered_popup(area, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(popup_area);

        let mode = if self.multi { "multi" } else { "single" };
        render_filter_input(frame, chunks[0], &format!("{} [{}]", self.file, mode), &self.list.filter);

        let items: Vec<ListItem> = self
            .list
            .visible()
            .map(|key| {
                let marker = if self.is_chosen(key) { "● " } else { "  " };
                let style = match key {
                    NONE_KEY | RANDOM_KEY => Style::default().fg(Color::Yellow),
                    _ => Style::default().fg(Color::White),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::styled(key.to_string(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} chosen ", self.chosen.len())),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.list.list_state);

        let mut help = Vec::new();
        if self.multi {
            help.push(key_hint("Space", Color::Green));
            help.push(Span::raw("Toggle  "));
            help.push(key_hint("Enter", Color::Yellow));
            help.push(Span::raw("Apply  "));
        } else {
            help.push(key_hint("Enter", Color::Yellow));
            help.push(Span::raw("Select  "));
        }
        help.push(key_hint("Tab", Color::Cyan));
        help.push(Span::raw("Mode  "));
        help.push(key_hint("Esc", Color::Yellow));
        help.push(Span::raw("Cancel"));
        render_help_bar(frame, chunks[2], help);

        Ok(())
    }
}
