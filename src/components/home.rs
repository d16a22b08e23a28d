//! Home component - the deck screen
//!
//! Displays deck tabs, deck settings, the draggable row list and the last
//! composed prompt. Owns row selection and the hit-test geometry of the
//! last frame, which is what turns raw mouse events into drag actions.

use crate::action::Action;
use crate::component::Component;
use crate::components::layout::{calculate_main_layout, ellipsize, first_line};
use crate::components::prompt_highlight::{highlight_line, highlight_prompt};
use crate::model::{Deck, DragTuning, PointerButtons, Row, RowEntry, RowId};
use crate::services::Composition;
use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Grip drawn at the left edge of every row
pub const DRAG_HANDLE: &str = "⠿";

/// Columns from a slot's left edge that grab the row: border, grip and gap
pub const DRAG_HANDLE_WIDTH: u16 = 3;

const DROP_HINT: &str = "┄ drop here ┄";

// ═══════════════════════════════════════════════════════════════════════════════
// Home Component
// ═══════════════════════════════════════════════════════════════════════════════

/// Home component for the deck view
pub struct HomeComponent {
    /// Index of the selected row in the active deck
    pub selected: usize,

    /// First visible row
    pub scroll: usize,

    /// Inner area of the row list in the last frame
    pub rows_area: Rect,

    /// Row slots of the last frame, for hit testing
    slots: Vec<(RowId, Rect)>,

    /// Whether the last frame showed an active drag
    dragging: bool,
}

impl Default for HomeComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeComponent {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll: 0,
            rows_area: Rect::default(),
            slots: Vec::new(),
            dragging: false,
        }
    }

    /// Height of one row slot in cells
    pub fn slot_height(tuning: &DragTuning) -> u16 {
        tuning.row_height.round().clamp(1.0, 8.0) as u16
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index.min(len.saturating_sub(1));
    }

    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn selected_row(&self, deck: &Deck) -> Option<RowId> {
        deck.rows.at(self.selected).map(|e| e.id)
    }

    /// Row whose slot contains `pos` in the last frame
    pub fn row_at(&self, pos: Position) -> Option<RowId> {
        self.slot_at(pos).map(|(id, _)| id)
    }

    fn slot_at(&self, pos: Position) -> Option<(RowId, Rect)> {
        self.slots.iter().copied().find(|(_, slot)| slot.contains(pos))
    }

    /// Whether `pos` is on the drag handle of the row under it
    pub fn on_handle(&self, pos: Position) -> bool {
        self.slot_at(pos)
            .is_some_and(|(_, slot)| pos.x < slot.x.saturating_add(DRAG_HANDLE_WIDTH))
    }

    fn ensure_visible(&mut self, len: usize, visible: usize) {
        let visible = visible.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
        self.scroll = self.scroll.min(len.saturating_sub(visible));
    }
}

impl Component for HomeComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let action = match key.code {
            // Esc only matters while a drag is in flight
            KeyCode::Esc if self.dragging => Some(Action::DragCancel),

            // Reordering
            KeyCode::Char('J') => Some(Action::MoveRowDown),
            KeyCode::Char('K') => Some(Action::MoveRowUp),
            KeyCode::Down if shift => Some(Action::MoveRowDown),
            KeyCode::Up if shift => Some(Action::MoveRowUp),

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextRow),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevRow),
            KeyCode::Home => Some(Action::FirstRow),
            KeyCode::End => Some(Action::LastRow),
            KeyCode::Tab => Some(Action::NextDeck),
            KeyCode::BackTab => Some(Action::PrevDeck),

            // Decks
            KeyCode::Char('n') => Some(Action::AddDeck),
            KeyCode::Char('X') => Some(Action::RemoveDeck),
            KeyCode::Char('g') => Some(Action::Generate),
            KeyCode::Char('m') => Some(Action::CycleSeedControl),
            KeyCode::Char('c') => Some(Action::ToggleAddComma),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::AdjustSeed(1)),
            KeyCode::Char('-') => Some(Action::AdjustSeed(-1)),

            // Rows
            KeyCode::Char('a') => Some(Action::OpenFilePicker),
            KeyCode::Char('x') => Some(Action::AddExtraRow),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::RemoveRow),
            KeyCode::Char('f') => Some(Action::OpenRowFilePicker),
            KeyCode::Enter | KeyCode::Char('e') => Some(Action::EditRow),

            // Dialogs
            KeyCode::Char('p') => Some(Action::OpenPreTextEditor),
            KeyCode::Char('w') => Some(Action::OpenWildcards),
            KeyCode::Char('s') | KeyCode::Char('/') => Some(Action::OpenSearch),
            KeyCode::Char('i') => Some(Action::OpenImport),
            KeyCode::Char('v') => Some(Action::OpenPreview),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),

            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let pos = Position::new(mouse.column, mouse.row);
        let action = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let index = self.slots.iter().position(|(_, slot)| slot.contains(pos));
                match (self.row_at(pos), index) {
                    (Some(row), _) if self.on_handle(pos) => {
                        Some(Action::DragBegin { row, y: mouse.row })
                    }
                    (Some(_), Some(index)) => Some(Action::SelectRow(self.scroll + index)),
                    _ => None,
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => Some(Action::DragMove {
                y: mouse.row,
                buttons: PointerButtons::PRIMARY,
            }),
            // Motion without a button while dragging means the release was lost
            MouseEventKind::Moved if self.dragging => Some(Action::DragMove {
                y: mouse.row,
                buttons: PointerButtons::NONE,
            }),
            MouseEventKind::Up(MouseButton::Left) => Some(Action::DragRelease {
                inside: self.rows_area.contains(pos),
            }),
            MouseEventKind::ScrollDown if !self.dragging => Some(Action::NextRow),
            MouseEventKind::ScrollUp if !self.dragging => Some(Action::PrevRow),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing is done through draw_home_screen which takes the deck
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Context needed for rendering the home screen
pub struct HomeRenderContext<'a> {
    pub deck_names: &'a [String],
    pub active_deck: usize,
    /// Mutable so the frame can record where each row was laid out
    pub deck: &'a mut Deck,
    pub composition: Option<&'a Composition>,
    pub tuning: &'a DragTuning,
    pub error: Option<&'a str>,
    pub status_message: Option<&'a str>,
}

/// Draw the home screen
pub fn draw_home_screen(
    frame: &mut Frame,
    area: Rect,
    home: &mut HomeComponent,
    ctx: HomeRenderContext,
) -> Result<()> {
    let layout = calculate_main_layout(area, true);

    render_tabs(frame, layout.tabs, ctx.deck_names, ctx.active_deck);
    render_settings(frame, layout.settings, ctx.deck);
    render_rows(frame, layout.rows, home, ctx.deck, ctx.tuning);
    render_prompt(frame, layout.prompt, ctx.composition);

    if let Some(status_area) = layout.status {
        render_status_bar(frame, status_area, home, ctx.deck, ctx.error, ctx.status_message);
    }
    render_help_bar(frame, layout.help, home);

    Ok(())
}

fn render_tabs(frame: &mut Frame, area: Rect, names: &[String], active: usize) {
    let titles: Vec<&str> = names.iter().map(String::as_str).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(active)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_settings(frame: &mut Frame, area: Rect, deck: &Deck) {
    let width = area.width.saturating_sub(8) as usize;
    let pre_text = if deck.pre_text.trim().is_empty() {
        vec![Span::styled("(empty)", Style::default().fg(Color::DarkGray))]
    } else {
        highlight_line(
            &ellipsize(&first_line(&deck.pre_text), width),
            Style::default().fg(Color::White),
        )
    };

    let mut pre_line = vec![Span::styled("Pre: ", Style::default().fg(Color::DarkGray))];
    pre_line.extend(pre_text);

    let comma = if deck.add_comma { "on" } else { "off" };
    let lines = vec![
        Line::from(pre_line),
        Line::from(vec![
            Span::styled("Seed: ", Style::default().fg(Color::DarkGray)),
            Span::styled(deck.seed.to_string(), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(" [{}]", deck.seed_control.name()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled("  Comma: ", Style::default().fg(Color::DarkGray)),
            Span::styled(comma, Style::default().fg(Color::Cyan)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", deck.name));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_rows(
    frame: &mut Frame,
    area: Rect,
    home: &mut HomeComponent,
    deck: &mut Deck,
    tuning: &DragTuning,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Rows ({}) ", deck.rows.len()))
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    home.rows_area = inner;
    home.slots.clear();
    home.dragging = deck.rows.is_dragging();

    if deck.rows.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No rows yet",
                Style::default().fg(Color::Yellow),
            )),
            Line::from(Span::styled(
                "Press a to add CSV files, x for an extra prompt",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let h = HomeComponent::slot_height(tuning);
    let visible = (inner.height / h).max(1) as usize;
    let len = deck.rows.len();
    home.clamp_selection(len);
    if !home.dragging {
        home.ensure_visible(len, visible);
    }
    let scroll = home.scroll;

    // Every row gets a position, scrolled-out ones included
    let tops: Vec<(RowId, f32)> = deck
        .rows
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, inner.y as f32 + (i as f32 - scroll as f32) * h as f32))
        .collect();
    for (id, top) in tops {
        deck.rows.set_row_top(id, top);
    }

    let session = deck.rows.session().map(|s| (s.row, s.ghost_y));
    let mut placeholder = None;

    for (i, entry) in deck.rows.entries().iter().enumerate().skip(scroll).take(visible) {
        let y = inner.y + (i - scroll) as u16 * h;
        let slot = Rect::new(inner.x, y, inner.width, h.min(inner.bottom().saturating_sub(y)));
        home.slots.push((entry.id, slot));

        if deck.rows.is_row_dragging(entry.id) {
            render_placeholder(frame, slot);
            placeholder = Some(slot);
        } else {
            render_row(frame, slot, entry, i == home.selected, false);
        }
    }

    if let Some((row, ghost_y)) = session {
        if let Some(entry) = deck.rows.get(row) {
            let max_y = inner.bottom().saturating_sub(h).max(inner.y);
            let y = (ghost_y.round().max(inner.y as f32) as u16).min(max_y);
            let ghost = Rect::new(inner.x, y, inner.width, h.min(inner.height));
            frame.render_widget(Clear, ghost);
            render_row(frame, ghost, entry, true, true);

            // A ghost over its own slot keeps the drop hint on its lower border
            if ghost.height >= 3 && placeholder.is_some_and(|slot| slot.intersects(ghost)) {
                let edge = Rect::new(
                    ghost.x + 1,
                    ghost.bottom() - 1,
                    ghost.width.saturating_sub(2),
                    1,
                );
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        DROP_HINT,
                        Style::default().fg(Color::DarkGray),
                    ))
                    .alignment(Alignment::Center),
                    edge,
                );
            }
        }
    }
}

fn render_row(frame: &mut Frame, slot: Rect, entry: &RowEntry, selected: bool, ghost: bool) {
    let (icon, title, detail) = match &entry.row {
        Row::Csv(csv) => ("🧾", csv.file.clone(), csv.selection_label()),
        Row::Extra(extra) => (
            "📝",
            "Additional prompt".to_string(),
            first_line(&extra.text),
        ),
    };

    let border_style = if ghost {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = if slot.height >= 3 {
        Block::default()
            .borders(Borders::ALL)
            .border_type(if ghost {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style)
    } else {
        Block::default()
    };
    let inner = block.inner(slot);

    let avail = (inner.width as usize).saturating_sub(8);
    let title = ellipsize(&title, avail / 2);
    let detail = ellipsize(&detail, avail.saturating_sub(title.width()));

    let title_style = if selected || ghost {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", DRAG_HANDLE), border_style),
        Span::raw(format!("{} ", icon)),
        Span::styled(title, title_style),
        Span::styled(" → ", Style::default().fg(Color::DarkGray)),
    ];
    spans.extend(highlight_line(&detail, Style::default().fg(Color::Green)));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), slot);
}

fn render_placeholder(frame: &mut Frame, slot: Rect) {
    let block = if slot.height >= 3 {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
    } else {
        Block::default()
    };
    let placeholder = Paragraph::new(Line::from(Span::styled(
        DROP_HINT,
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(placeholder, slot);
}

fn render_prompt(frame: &mut Frame, area: Rect, composition: Option<&Composition>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Prompt ")
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(composition) = composition else {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Press g to generate",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let header = |title: &str| {
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let mut lines = if composition.prompt.is_empty() {
        vec![Line::from(Span::styled(
            "(empty prompt)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        highlight_prompt(&composition.prompt, Style::default().fg(Color::White))
    };

    lines.push(Line::from(""));
    lines.push(header("Selections"));
    lines.extend(
        composition
            .selection_preview
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Cyan)))),
    );
    lines.push(Line::from(""));
    lines.push(header("Outputs"));
    lines.extend(
        composition
            .output_preview
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green)))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("seed {}", composition.seed),
        Style::default().fg(Color::DarkGray),
    )));
    if !composition.skipped.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("skipped: {}", composition.skipped.join(", ")),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    home: &HomeComponent,
    deck: &Deck,
    error: Option<&str>,
    status_message: Option<&str>,
) {
    let mut spans = vec![Span::styled(
        format!(" {} ", deck.name),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" "));

    if home.dragging {
        spans.push(Span::styled(
            " DRAG ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    } else if let Some(entry) = deck.rows.at(home.selected) {
        let label = match &entry.row {
            Row::Csv(csv) => csv.file.clone(),
            Row::Extra(_) => "Additional prompt".to_string(),
        };
        spans.push(Span::styled(
            format!("{}/{} {}", home.selected + 1, deck.rows.len(), label),
            Style::default().fg(Color::White),
        ));
    }

    if let Some(error) = error {
        spans.push(Span::styled(
            format!(" Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(status) = status_message {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, home: &HomeComponent) {
    let key = |k: &str, color: Color| {
        Span::styled(
            format!(" {} ", k),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    };

    let help_spans = if home.dragging {
        vec![
            key("Release", Color::Green),
            Span::raw("Drop  "),
            key("Esc", Color::Yellow),
            Span::raw("Cancel  "),
            Span::styled(
                "release outside the list to cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ]
    } else {
        vec![
            key("q", Color::Yellow),
            Span::raw("Quit "),
            key("g", Color::Green),
            Span::raw("Generate "),
            key("a", Color::Cyan),
            Span::raw("Files "),
            key("x", Color::Cyan),
            Span::raw("Extra "),
            key("Enter", Color::Cyan),
            Span::raw("Edit "),
            key("J/K", Color::Cyan),
            Span::raw("Move "),
            key("s", Color::Magenta),
            Span::raw("Search "),
            key("w", Color::Magenta),
            Span::raw("Wildcards "),
            key("?", Color::White),
            Span::raw("Help"),
        ]
    };

    let paragraph = Paragraph::new(Line::from(help_spans)).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeckId, DragUpdate};
    use ratatui::{backend::TestBackend, Terminal};

    fn deck_with_rows() -> (Deck, Vec<RowId>) {
        let mut deck = Deck::new(DeckId(1), "Deck 1");
        let ids = vec![
            deck.rows.push(Row::csv("styles.csv")),
            deck.rows.push(Row::extra("soft light")),
            deck.rows.push(Row::csv("colors.csv")),
        ];
        (deck, ids)
    }

    fn render(home: &mut HomeComponent, deck: &mut Deck, tuning: &DragTuning) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let names = vec!["Deck 1".to_string()];
        terminal
            .draw(|frame| {
                let ctx = HomeRenderContext {
                    deck_names: &names,
                    active_deck: 0,
                    deck,
                    composition: None,
                    tuning,
                    error: None,
                    status_message: None,
                };
                draw_home_screen(frame, frame.area(), home, ctx).unwrap();
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_draw_records_row_positions() {
        let (mut deck, ids) = deck_with_rows();
        let mut home = HomeComponent::new();
        let tuning = DragTuning::default();

        let screen = render(&mut home, &mut deck, &tuning);
        assert!(screen.contains("styles.csv"));
        assert!(screen.contains("Press g to generate"));

        // Tabs (2) + settings (4) + list border (1)
        assert_eq!(deck.rows.get(ids[0]).unwrap().top_y, Some(7.0));
        assert_eq!(deck.rows.get(ids[1]).unwrap().top_y, Some(10.0));
        assert_eq!(deck.rows.get(ids[2]).unwrap().top_y, Some(13.0));
    }

    #[test]
    fn test_mouse_maps_to_drag_actions() {
        let (mut deck, ids) = deck_with_rows();
        let mut home = HomeComponent::new();
        let tuning = DragTuning::default();
        render(&mut home, &mut deck, &tuning);

        let down = home
            .handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 2, 11))
            .unwrap();
        assert_eq!(down, Some(Action::DragBegin { row: ids[1], y: 11 }));

        let drag = home
            .handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 14))
            .unwrap();
        assert_eq!(
            drag,
            Some(Action::DragMove {
                y: 14,
                buttons: PointerButtons::PRIMARY
            })
        );

        let up_outside = home
            .handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 70, 2))
            .unwrap();
        assert_eq!(up_outside, Some(Action::DragRelease { inside: false }));

        // Plain motion only matters during a drag
        let moved = home
            .handle_mouse_event(mouse(MouseEventKind::Moved, 5, 14))
            .unwrap();
        assert_eq!(moved, None);
    }

    #[test]
    fn test_click_off_handle_selects_without_drag() {
        let (mut deck, ids) = deck_with_rows();
        let mut home = HomeComponent::new();
        let tuning = DragTuning::default();
        render(&mut home, &mut deck, &tuning);

        // Slots start at the list's inner edge, x=1
        assert!(home.on_handle(Position::new(3, 14)));
        assert!(!home.on_handle(Position::new(4, 14)));
        assert_eq!(home.row_at(Position::new(30, 14)), Some(ids[2]));

        let down = home
            .handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 30, 14))
            .unwrap();
        assert_eq!(down, Some(Action::SelectRow(2)));

        let on_grip = home
            .handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 2, 14))
            .unwrap();
        assert_eq!(on_grip, Some(Action::DragBegin { row: ids[2], y: 14 }));
    }

    #[test]
    fn test_drag_draws_ghost_and_placeholder() {
        let (mut deck, ids) = deck_with_rows();
        let mut home = HomeComponent::new();
        let tuning = DragTuning::default();
        render(&mut home, &mut deck, &tuning);

        // At grab time the ghost sits exactly over its own slot
        assert!(deck.rows.begin_drag(ids[0], 8.0, &tuning));
        let screen = render(&mut home, &mut deck, &tuning);
        assert!(screen.contains("drop here"));
        assert!(screen.contains("DRAG"));

        // Dragged past the second row, the ghost and the slot separate
        let update = deck
            .rows
            .update_drag(12.0, PointerButtons::PRIMARY, &tuning);
        assert_eq!(update, DragUpdate::Moved { from: 0, to: 1 });
        let screen = render(&mut home, &mut deck, &tuning);
        assert!(screen.contains("drop here"));
        assert!(screen.contains("styles.csv"));

        let moved = home
            .handle_mouse_event(mouse(MouseEventKind::Moved, 5, 14))
            .unwrap();
        assert_eq!(
            moved,
            Some(Action::DragMove {
                y: 14,
                buttons: PointerButtons::NONE
            })
        );
    }

    #[test]
    fn test_selection_bounds() {
        let mut home = HomeComponent::new();
        home.next(2);
        home.next(2);
        assert_eq!(home.selected, 1);
        home.previous();
        home.previous();
        assert_eq!(home.selected, 0);
        home.select_last(5);
        assert_eq!(home.selected, 4);
        home.clamp_selection(2);
        assert_eq!(home.selected, 1);
    }
}
