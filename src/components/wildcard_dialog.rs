//! Wildcard picker dialog
//!
//! Lists the `__token__` names found in the wildcard directory and inserts
//! the chosen one into the pre-text or an extra row.

use crate::action::Action;
use crate::component::Component;
use crate::components::filter_list::{key_hint, render_filter_input, render_help_bar, FilterList};
use crate::model::TextTarget;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// Wildcard dialog
pub struct WildcardDialog {
    pub target: TextTarget,
    pub list: FilterList,
}

impl WildcardDialog {
    pub fn new(target: TextTarget, tokens: Vec<String>) -> Self {
        let mut list = FilterList::new();
        list.set_items(tokens);
        Self { target, list }
    }
}

impl Component for WildcardDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ReloadWildcards)
            }
            KeyCode::Enter => self.list.selected_item().map(|token| Action::WildcardChosen {
                target: self.target,
                token: token.to_string(),
            }),
            _ => {
                self.list.handle_key(key);
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let popup_width = 56u16.min(area.width.saturating_sub(4));
        let popup_height = 22u16.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(popup_area);

        render_filter_input(frame, chunks[0], "Wildcards", &self.list.filter);

        if self.list.visible_len() == 0 {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "(none found)",
                    Style::default().fg(Color::Yellow),
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
                .map(|token| {
                    ListItem::new(Line::from(Span::styled(
                        token.to_string(),
                        Style::default().fg(Color::Magenta),
                    )))
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

        render_help_bar(
            frame,
            chunks[2],
            vec![
                key_hint("Enter", Color::Yellow),
                Span::raw("Insert  "),
                key_hint("↑/↓", Color::Cyan),
                Span::raw("Navigate  "),
                key_hint("^R", Color::Cyan),
                Span::raw("Rescan  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Cancel"),
            ],
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowId;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_filter_then_choose() {
        let tokens = vec!["__colors__".to_string(), "__styles/anime__".to_string()];
        let mut dialog = WildcardDialog::new(TextTarget::Extra(RowId(2)), tokens);
        for c in "anime".chars() {
            dialog.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::WildcardChosen {
                target: TextTarget::Extra(RowId(2)),
                token: "__styles/anime__".to_string(),
            })
        );
    }

    #[test]
    fn test_ctrl_r_rescans() {
        let mut dialog = WildcardDialog::new(TextTarget::PreText, Vec::new());
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(
            dialog.handle_key_event(ctrl_r).unwrap(),
            Some(Action::ReloadWildcards)
        );
        assert!(dialog.list.filter.is_empty());
    }

    #[test]
    fn test_empty_list_chooses_nothing() {
        let mut dialog = WildcardDialog::new(TextTarget::PreText, Vec::new());
        assert_eq!(dialog.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
    }
}
