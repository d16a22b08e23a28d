//! Model preview lookup dialog
//!
//! Left panel lists model files under the configured model directories.
//! Right panel shows where the highlighted model's preview lives.

use crate::action::Action;
use crate::component::Component;
use crate::components::filter_list::{key_hint, render_filter_input, render_help_bar, FilterList};
use crate::services::{find_preview, list_models, Preview, PreviewError};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::path::PathBuf;

/// Preview dialog
#[derive(Default)]
pub struct PreviewDialog {
    dirs: Vec<PathBuf>,
    pub list: FilterList,
    /// Lookup result for the highlighted model
    detail: Option<(String, Result<Option<Preview>, PreviewError>)>,
}

impl PreviewDialog {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        let mut list = FilterList::new();
        list.set_items(list_models(&dirs));
        let mut dialog = Self {
            dirs,
            list,
            detail: None,
        };
        dialog.refresh_detail();
        dialog
    }

    pub fn detail(&self) -> Option<&(String, Result<Option<Preview>, PreviewError>)> {
        self.detail.as_ref()
    }

    fn refresh_detail(&mut self) {
        let Some(name) = self.list.selected_item().map(str::to_string) else {
            self.detail = None;
            return;
        };
        if self.detail.as_ref().is_some_and(|(current, _)| *current == name) {
            return;
        }
        let result = find_preview(&self.dirs, &name);
        self.detail = Some((name, result));
    }

    fn detail_lines(&self) -> Vec<Line<'static>> {
        let label = |text: &str| {
            Span::styled(format!("{:9}", text), Style::default().fg(Color::DarkGray))
        };
        match &self.detail {
            None => vec![Line::from(Span::styled(
                "No model selected",
                Style::default().fg(Color::DarkGray),
            ))],
            Some((name, Ok(Some(preview)))) => vec![
                Line::from(vec![
                    label("Model"),
                    Span::styled(name.clone(), Style::default().fg(Color::White)),
                ]),
                Line::from(vec![
                    label("File"),
                    Span::styled(
                        preview.model.display().to_string(),
                        Style::default().fg(Color::White),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    label("Preview"),
                    Span::styled(
                        preview.path.display().to_string(),
                        Style::default().fg(Color::Green),
                    ),
                ]),
                Line::from(vec![
                    label("Type"),
                    Span::styled(preview.content_type, Style::default().fg(Color::Cyan)),
                ]),
            ],
            Some((name, Ok(None))) => vec![
                Line::from(vec![
                    label("Model"),
                    Span::styled(name.clone(), Style::default().fg(Color::White)),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "no preview",
                    Style::default().fg(Color::Yellow),
                )),
            ],
            Some((_, Err(e))) => vec![Line::from(Span::styled(
                e.to_string(),
                Style::default().fg(Color::Red),
            ))],
        }
    }
}

impl Component for PreviewDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            _ => {
                if self.list.handle_key(key) {
                    self.refresh_detail();
                }
                None
            }
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let popup_width = 96u16.min(area.width.saturating_sub(4));
        let popup_height = 24u16.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(popup_area);

        let title = match self.list.visible_len() {
            0 => format!("Models (0/{})", self.list.items().len()),
            n => format!("Models ({}/{})", self.list.selected_index() + 1, n),
        };
        render_filter_input(frame, main_chunks[0], &title, &self.list.filter);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_chunks[1]);

        if self.list.visible_len() == 0 {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No model files found",
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(Span::styled(
                    "Set model_dirs in config.json",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
            frame.render_widget(empty, panels[0]);
        } else {
            let items: Vec<ListItem> = self
                .list
                .visible()
                .map(|name| {
                    ListItem::new(Line::from(Span::styled(
                        name.to_string(),
                        Style::default().fg(Color::White),
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
            frame.render_stateful_widget(list, panels[0], &mut self.list.list_state);
        }

        let detail = Paragraph::new(self.detail_lines())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Preview ")
                    .title_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(detail, panels[1]);

        render_help_bar(
            frame,
            main_chunks[2],
            vec![
                key_hint("↑/↓", Color::Cyan),
                Span::raw("Navigate  "),
                key_hint("Esc", Color::Yellow),
                Span::raw("Close"),
            ],
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_highlight_follows_navigation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("alpha.safetensors"), b"").unwrap();
        fs::write(dir.path().join("alpha.preview.png"), b"").unwrap();
        fs::write(dir.path().join("beta.ckpt"), b"").unwrap();

        let mut dialog = PreviewDialog::new(vec![dir.path().to_path_buf()]);
        let (name, result) = dialog.detail().unwrap();
        assert_eq!(name, "alpha.safetensors");
        let preview = result.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(preview.content_type, "image/png");

        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
            .unwrap();
        let (name, result) = dialog.detail().unwrap();
        assert_eq!(name, "beta.ckpt");
        assert_eq!(result, &Ok(None));
    }

    #[test]
    fn test_no_models() {
        let dir = tempdir().unwrap();
        let dialog = PreviewDialog::new(vec![dir.path().to_path_buf()]);
        assert!(dialog.detail().is_none());
    }
}
