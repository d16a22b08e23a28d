//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the workspace, the prompt library and the drag registry, and
//! turns dialog results into workspace changes.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_home_screen, ConflictDialog, FilePickerDialog, HelpDialog, HomeComponent,
    HomeRenderContext, ImportDialog, KeyPickerDialog, PreviewDialog, QuitDialog, SearchDialog,
    TextEditDialog, WildcardDialog,
};
use crate::config::Config;
use crate::model::{
    DeckId, DragEnd, DragRegistry, DragTuning, DragUpdate, Modal, ModalStack, Row, RowId,
    TextTarget, Workspace,
};
use crate::services::{
    self, import_file, insert_wildcard, search_rows, Composition, ConflictMode, LibraryError,
    PromptLibrary, SearchSelections, WildcardSet,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// All decks of the session
    pub workspace: Workspace,

    /// Where the workspace is saved; `None` keeps it in memory
    workspace_path: Option<PathBuf>,

    /// Which deck owns the active drag
    pub registry: DragRegistry,

    pub library: PromptLibrary,
    pub wildcards: WildcardSet,
    pub config: Config,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error message to display
    pub error: Option<String>,

    /// Status message to display
    pub status_message: Option<String>,

    /// Last composition per deck
    pub compositions: HashMap<DeckId, Composition>,

    /// Source file waiting for a conflict decision
    pending_import: Option<PathBuf>,

    /// Workspace changed since the last save
    dirty: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub home: HomeComponent,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub file_picker: FilePickerDialog,
    pub import_dialog: ImportDialog,
    pub search_dialog: SearchDialog,
    pub key_picker: Option<KeyPickerDialog>,
    pub conflict_dialog: Option<ConflictDialog>,
    pub text_editor: Option<TextEditDialog>,
    pub wildcard_dialog: Option<WildcardDialog>,
    pub preview_dialog: Option<PreviewDialog>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create an App from a loaded config
    ///
    /// The workspace is read from `workspace_path` when given.
    pub fn with_config(config: Config, workspace_path: Option<PathBuf>) -> App {
        let workspace = workspace_path
            .as_deref()
            .map(Workspace::load)
            .unwrap_or_default();
        info!(
            decks = workspace.decks().len(),
            library = %config.library_dir.display(),
            "workspace loaded"
        );

        App {
            workspace,
            workspace_path,
            registry: DragRegistry::new(),
            library: PromptLibrary::new(&config.library_dir),
            wildcards: WildcardSet::new(&config.wildcard_dir),
            config,
            modals: ModalStack::new(),
            should_quit: false,
            error: None,
            status_message: None,
            compositions: HashMap::new(),
            pending_import: None,
            dirty: false,
            home: HomeComponent::new(),
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
            file_picker: FilePickerDialog::new(),
            import_dialog: ImportDialog::default(),
            search_dialog: SearchDialog::new(),
            key_picker: None,
            conflict_dialog: None,
            text_editor: None,
            wildcard_dialog: None,
            preview_dialog: None,
        }
    }

    /// Drag tuning with the row height the UI actually draws
    pub fn tuning(&self) -> DragTuning {
        let slot = HomeComponent::slot_height(&self.config.drag);
        DragTuning {
            row_height: slot as f32,
            ..self.config.drag
        }
    }

    fn selected_row(&self) -> Option<RowId> {
        self.home.selected_row(self.workspace.active())
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Save if something changed, unless a drag is still in flight
    fn save_if_dirty(&mut self) {
        if !self.dirty || self.registry.is_active() {
            return;
        }
        self.dirty = false;
        self.save_workspace();
    }

    fn save_workspace(&mut self) {
        let Some(path) = &self.workspace_path else {
            return;
        };
        match self.workspace.save(path) {
            Ok(()) => debug!(path = %path.display(), "workspace saved"),
            Err(e) => {
                warn!("Failed to save workspace {}: {}", path.display(), e);
                self.error = Some(format!("Failed to save workspace: {}", e));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drag
    // ─────────────────────────────────────────────────────────────────────────

    fn begin_drag(&mut self, row: RowId, y: u16) {
        let tuning = self.tuning();
        let deck = self.workspace.active_mut();
        if let Some(index) = deck.rows.index_of(row) {
            self.home.selected = index;
        }
        deck.begin_drag(&mut self.registry, row, y as f32, &tuning);
    }

    fn move_drag(&mut self, y: u16, buttons: crate::model::PointerButtons) {
        let tuning = self.tuning();
        let Some(owner) = self.registry.owner() else {
            return;
        };
        let Some(deck) = self.workspace.deck_mut(owner) else {
            return;
        };
        match deck.update_drag(&mut self.registry, y as f32, buttons, &tuning) {
            DragUpdate::Moved { to, .. } => self.home.selected = to,
            DragUpdate::Cancelled => {
                self.status_message = Some("Drag cancelled".to_string());
            }
            DragUpdate::Idle | DragUpdate::Tracked => {}
        }
    }

    /// End the active drag, committing or rolling back
    fn end_drag(&mut self, commit: bool) {
        let Some(owner) = self.registry.owner() else {
            return;
        };
        let Some(deck) = self.workspace.deck_mut(owner) else {
            self.registry.release(owner);
            return;
        };
        let row = deck.rows.session().map(|s| s.row);
        let moved = deck.rows.drag_has_moved();
        let end = deck.end_drag(&mut self.registry, commit);
        if let Some(index) = row.and_then(|r| deck.rows.index_of(r)) {
            self.home.selected = index;
        }

        match end {
            // A click on the handle commits the order it started with
            Some(DragEnd::Committed) if !moved => {}
            Some(DragEnd::Committed) => {
                self.status_message = Some("Row moved".to_string());
                self.mark_dirty();
            }
            Some(DragEnd::RolledBack) => {
                self.status_message = Some("Drag cancelled".to_string());
            }
            None => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rows and Text
    // ─────────────────────────────────────────────────────────────────────────

    fn move_selected(&mut self, delta: isize) {
        let Some(id) = self.selected_row() else {
            return;
        };
        let rows = &mut self.workspace.active_mut().rows;
        if rows.move_by(id, delta) {
            if let Some(index) = rows.index_of(id) {
                self.home.selected = index;
            }
            self.mark_dirty();
        }
    }

    fn edit_selected(&mut self) {
        let Some(id) = self.selected_row() else {
            return;
        };
        let Some(entry) = self.workspace.active().rows.get(id) else {
            return;
        };
        match entry.row.clone() {
            Row::Csv(csv) => match self.library.read(&csv.file) {
                Ok(file) => {
                    self.key_picker = Some(KeyPickerDialog::new(
                        id,
                        csv.file.clone(),
                        &file.labels,
                        &csv.keys,
                    ));
                    self.modals.push(Modal::KeyPicker { row: id });
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", csv.file, e);
                    self.error = Some(e.to_string());
                }
            },
            Row::Extra(extra) => {
                let target = TextTarget::Extra(id);
                self.text_editor = Some(TextEditDialog::new(target, &extra.text));
                self.modals.push(Modal::TextEdit { target });
            }
        }
    }

    fn text_of(&self, target: TextTarget) -> Option<String> {
        let deck = self.workspace.active();
        match target {
            TextTarget::PreText => Some(deck.pre_text.clone()),
            TextTarget::Extra(id) => match &deck.rows.get(id)?.row {
                Row::Extra(extra) => Some(extra.text.clone()),
                Row::Csv(_) => None,
            },
        }
    }

    fn set_text(&mut self, target: TextTarget, text: &str) {
        let deck = self.workspace.active_mut();
        let changed = match target {
            TextTarget::PreText => {
                deck.pre_text = text.to_string();
                true
            }
            TextTarget::Extra(id) => deck.rows.set_text(id, text),
        };
        if changed {
            self.mark_dirty();
        }
    }

    fn insert_wildcard_token(&mut self, target: TextTarget, token: &str) {
        // An open editor for the same text takes the token into its buffer
        if let (Some(Modal::TextEdit { target: editing }), Some(editor)) =
            (self.modals.top(), self.text_editor.as_mut())
        {
            if *editing == target {
                editor.insert_token(token);
                return;
            }
        }
        if let Some(text) = self.text_of(target) {
            let updated = insert_wildcard(&text, token);
            self.set_text(target, &updated);
            self.status_message = Some(format!("Inserted {}", token));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Import
    // ─────────────────────────────────────────────────────────────────────────

    fn run_import(&mut self, source: PathBuf, mode: ConflictMode) {
        match import_file(&mut self.library, &source, mode) {
            Ok(outcome) => {
                self.pending_import = None;
                self.status_message = Some(if outcome.deduped {
                    format!("Already in library as {}", outcome.filename)
                } else if outcome.overwritten {
                    format!("Overwrote {}", outcome.filename)
                } else {
                    format!("Imported {}", outcome.filename)
                });
                let rows = &mut self.workspace.active_mut().rows;
                if !rows.has_file(&outcome.filename) {
                    rows.push(Row::csv(outcome.filename));
                    self.mark_dirty();
                }
            }
            Err(LibraryError::NameConflict {
                filename,
                suggested,
            }) => {
                self.pending_import = Some(source);
                self.conflict_dialog = Some(ConflictDialog::new(&filename, &suggested));
                self.modals.push(Modal::Conflict {
                    filename,
                    suggested,
                });
            }
            Err(e) => {
                warn!("Import of {} failed: {}", source.display(), e);
                self.pending_import = None;
                self.error = Some(e.to_string());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) -> Result<Option<Action>> {
        let len = self.workspace.active().rows.len();
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {}
            Action::Resize(_, _) => {
                // Row tops are stale until the next draw
                if !self.registry.is_active() {
                    self.workspace.active_mut().rows.clear_layout();
                }
            }
            Action::FocusLost | Action::DragCancel => self.end_drag(false),
            Action::ForceQuit => {
                self.end_drag(false);
                self.save_workspace();
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Action::NextRow => self.home.next(len),
            Action::PrevRow => self.home.previous(),
            Action::FirstRow => self.home.select_first(),
            Action::LastRow => self.home.select_last(len),
            Action::SelectRow(index) => self.home.select(index, len),
            Action::NextDeck | Action::PrevDeck => {
                if action == Action::NextDeck {
                    self.workspace.next_deck();
                } else {
                    self.workspace.prev_deck();
                }
                self.home.selected = 0;
                self.home.scroll = 0;
                self.mark_dirty();
            }

            // ─────────────────────────────────────────────────────────────────
            // Decks
            // ─────────────────────────────────────────────────────────────────
            Action::AddDeck => {
                self.workspace.add_deck();
                self.home.selected = 0;
                self.home.scroll = 0;
                self.status_message = Some(format!("Added {}", self.workspace.active().name));
                self.mark_dirty();
            }
            Action::RemoveDeck => match self.workspace.remove_active() {
                Some(deck) => {
                    self.compositions.remove(&deck.id);
                    self.home.selected = 0;
                    self.home.scroll = 0;
                    self.status_message = Some(format!("Removed {}", deck.name));
                    self.mark_dirty();
                }
                None => {
                    self.status_message = Some("Cannot remove the last deck".to_string());
                }
            },
            Action::Generate => {
                let composition = services::compose(self.workspace.active(), &mut self.library);
                let deck = self.workspace.active_mut();
                deck.seed = composition.seed;
                info!(
                    deck = deck.id.0,
                    seed = composition.seed,
                    skipped = composition.skipped.len(),
                    "prompt composed"
                );
                if !composition.skipped.is_empty() {
                    self.error = Some(format!(
                        "Could not read: {}",
                        composition.skipped.join(", ")
                    ));
                }
                self.compositions.insert(deck.id, composition);
                self.mark_dirty();
            }
            Action::CycleSeedControl => {
                let deck = self.workspace.active_mut();
                deck.seed_control = deck.seed_control.next();
                self.mark_dirty();
            }
            Action::ToggleAddComma => {
                let deck = self.workspace.active_mut();
                deck.add_comma = !deck.add_comma;
                self.mark_dirty();
            }
            Action::AdjustSeed(delta) => {
                let deck = self.workspace.active_mut();
                deck.seed = if delta >= 0 {
                    deck.seed.wrapping_add(delta as u64)
                } else {
                    deck.seed.wrapping_sub(delta.unsigned_abs())
                };
                self.mark_dirty();
            }

            // ─────────────────────────────────────────────────────────────────
            // Rows
            // ─────────────────────────────────────────────────────────────────
            Action::AddExtraRow => {
                let rows = &mut self.workspace.active_mut().rows;
                let id = rows.push(Row::extra(""));
                self.home.selected = rows.index_of(id).unwrap_or(0);
                self.mark_dirty();
                return Ok(Some(Action::EditRow));
            }
            Action::RemoveRow => {
                if let Some(id) = self.selected_row() {
                    let rows = &mut self.workspace.active_mut().rows;
                    rows.remove(id);
                    self.home.clamp_selection(rows.len());
                    self.mark_dirty();
                }
            }
            Action::MoveRowUp => self.move_selected(-1),
            Action::MoveRowDown => self.move_selected(1),
            Action::EditRow => self.edit_selected(),

            // ─────────────────────────────────────────────────────────────────
            // Drag
            // ─────────────────────────────────────────────────────────────────
            Action::DragBegin { row, y } => self.begin_drag(row, y),
            Action::DragMove { y, buttons } => self.move_drag(y, buttons),
            Action::DragRelease { inside } => self.end_drag(inside),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.push(Modal::QuitConfirm),
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help { scroll_offset: 0 });
            }
            Action::OpenFilePicker | Action::OpenRowFilePicker => {
                let files = match self.library.list_files() {
                    Ok(files) => files,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return Ok(None);
                    }
                };
                if action == Action::OpenFilePicker {
                    let current = self.workspace.active().rows.files();
                    self.file_picker.open(None, files, current);
                    self.modals.push(Modal::FilePicker { row: None });
                } else {
                    let Some(id) = self.selected_row() else {
                        return Ok(None);
                    };
                    let Some(file) = self
                        .workspace
                        .active()
                        .rows
                        .get(id)
                        .and_then(|e| e.row.file().map(str::to_string))
                    else {
                        self.status_message = Some("Select a CSV row first".to_string());
                        return Ok(None);
                    };
                    self.file_picker.open(Some(id), files, vec![file]);
                    self.modals.push(Modal::FilePicker { row: Some(id) });
                }
            }
            Action::OpenImport => {
                self.import_dialog.reset();
                self.modals.push(Modal::Import);
            }
            Action::OpenSearch => {
                let rows = &self.workspace.active().rows;
                let mut files = rows.files();
                files.dedup();
                self.search_dialog
                    .open(files, SearchSelections::from_rows(rows));
                self.modals.push(Modal::Search);
            }
            Action::OpenPreTextEditor => {
                let text = self.workspace.active().pre_text.clone();
                self.text_editor = Some(TextEditDialog::new(TextTarget::PreText, &text));
                self.modals.push(Modal::TextEdit {
                    target: TextTarget::PreText,
                });
            }
            Action::OpenWildcards => {
                let target = match self.modals.top() {
                    Some(Modal::TextEdit { target }) => *target,
                    _ => match self.selected_row() {
                        Some(id) if self.text_of(TextTarget::Extra(id)).is_some() => {
                            TextTarget::Extra(id)
                        }
                        _ => TextTarget::PreText,
                    },
                };
                let tokens = self.wildcards.tokens().to_vec();
                self.wildcard_dialog = Some(WildcardDialog::new(target, tokens));
                self.modals.push(Modal::Wildcards { target });
            }
            Action::ReloadWildcards => {
                self.wildcards.reload();
                let tokens = self.wildcards.tokens().to_vec();
                self.status_message = Some(format!("{} wildcards", tokens.len()));
                if let Some(dialog) = self.wildcard_dialog.as_mut() {
                    dialog.list.set_items(tokens);
                }
            }
            Action::OpenPreview => {
                self.preview_dialog = Some(PreviewDialog::new(self.config.model_dirs.clone()));
                self.modals.push(Modal::Preview);
            }
            Action::CloseModal => {
                if let Some(Modal::Conflict { .. }) = self.modals.pop() {
                    self.pending_import = None;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Dialog Results
            // ─────────────────────────────────────────────────────────────────
            Action::FilesPicked { row: None, files } => {
                self.modals.pop();
                let rows = &mut self.workspace.active_mut().rows;
                let (removed, added) = rows.sync_files(&files);
                self.home.clamp_selection(rows.len());
                self.status_message = Some(format!("{} added, {} removed", added, removed));
                if removed + added > 0 {
                    self.mark_dirty();
                }
            }
            Action::FilesPicked {
                row: Some(id),
                files,
            } => {
                self.modals.pop();
                if let Some(file) = files.first() {
                    if self.workspace.active_mut().rows.set_file(id, file) {
                        self.mark_dirty();
                    }
                }
            }
            Action::KeysPicked { row, keys } => {
                self.modals.pop();
                self.key_picker = None;
                if self.workspace.active_mut().rows.set_keys(row, keys) {
                    self.mark_dirty();
                }
            }
            Action::TextEdited { target, text } => {
                self.modals.pop();
                self.text_editor = None;
                self.set_text(target, &text);
            }
            Action::WildcardChosen { target, token } => {
                self.modals.pop();
                self.wildcard_dialog = None;
                self.insert_wildcard_token(target, &token);
            }
            Action::ImportPath(path) => {
                self.modals.pop();
                self.run_import(expand_path(&path), ConflictMode::Auto);
            }
            Action::ResolveConflict(choice) => {
                self.modals.pop();
                self.conflict_dialog = None;
                let Some(source) = self.pending_import.take() else {
                    return Ok(None);
                };
                match choice.into_mode() {
                    Some(mode) => self.run_import(source, mode),
                    None => self.status_message = Some("Import cancelled".to_string()),
                }
            }
            Action::SearchQuery(query) => {
                let results = search_rows(&mut self.library, &self.workspace.active().rows, &query);
                debug!(query = %query, files = results.len(), "search");
                self.search_dialog.set_results(results);
            }
            Action::SearchApplied(selections) => {
                self.modals.pop();
                if selections.apply(&mut self.workspace.active_mut().rows) {
                    self.status_message = Some("Selections applied".to_string());
                    self.mark_dirty();
                }
            }
        }

        Ok(None)
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help { .. } => self.help_dialog.handle_key_event(key),
            Modal::FilePicker { .. } => self.file_picker.handle_key_event(key),
            Modal::Import => self.import_dialog.handle_key_event(key),
            Modal::Search => self.search_dialog.handle_key_event(key),
            Modal::KeyPicker { .. } => match self.key_picker.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
            Modal::Conflict { .. } => match self.conflict_dialog.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
            Modal::TextEdit { .. } => match self.text_editor.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
            Modal::Wildcards { .. } => match self.wildcard_dialog.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
            Modal::Preview => match self.preview_dialog.as_mut() {
                Some(dialog) => dialog.handle_key_event(key),
                None => Ok(Some(Action::CloseModal)),
            },
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help { .. } => self.help_dialog.draw(frame, area)?,
            Modal::FilePicker { .. } => self.file_picker.draw(frame, area)?,
            Modal::Import => self.import_dialog.draw(frame, area)?,
            Modal::Search => self.search_dialog.draw(frame, area)?,
            Modal::KeyPicker { .. } => {
                if let Some(dialog) = self.key_picker.as_mut() {
                    dialog.draw(frame, area)?;
                }
            }
            Modal::Conflict { .. } => {
                if let Some(dialog) = self.conflict_dialog.as_mut() {
                    dialog.draw(frame, area)?;
                }
            }
            Modal::TextEdit { .. } => {
                if let Some(dialog) = self.text_editor.as_mut() {
                    dialog.draw(frame, area)?;
                }
            }
            Modal::Wildcards { .. } => {
                if let Some(dialog) = self.wildcard_dialog.as_mut() {
                    dialog.draw(frame, area)?;
                }
            }
            Modal::Preview => {
                if let Some(dialog) = self.preview_dialog.as_mut() {
                    dialog.draw(frame, area)?;
                }
            }
        }
        Ok(())
    }
}

/// Expand a leading `~/` and strip the quotes terminals add to dropped paths
fn expand_path(input: &str) -> PathBuf {
    let path = input.trim().trim_matches(|c| c == '"' || c == '\'');
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        if let Err(e) = self.library.ensure_root() {
            warn!("Library directory unavailable: {}", e);
            self.error = Some(e.to_string());
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Keys cannot restructure rows mid-drag
        if self.registry.is_active() {
            let action = match key.code {
                KeyCode::Esc => Some(Action::DragCancel),
                _ => None,
            };
            return Ok(action);
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        self.error = None;
        self.status_message = None;
        self.home.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() {
            return Ok(None);
        }
        self.home.handle_mouse_event(mouse)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if !matches!(action, Action::Tick) {
            debug!(%action, "update");
        }
        let follow_up = self.dispatch(action)?;
        self.save_if_dirty();
        Ok(follow_up)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let tuning = self.tuning();
        let deck_names: Vec<String> = self
            .workspace
            .decks()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        let active_deck = self.workspace.active_index();
        let deck = self.workspace.active_mut();
        let composition = self.compositions.get(&deck.id);

        let ctx = HomeRenderContext {
            deck_names: &deck_names,
            active_deck,
            deck,
            composition,
            tuning: &tuning,
            error: self.error.as_deref(),
            status_message: self.status_message.as_deref(),
        };
        draw_home_screen(frame, area, &mut self.home, ctx)?;

        // Draw modal overlays, bottom first
        let modals: Vec<Modal> = self.modals.iter().cloned().collect();
        for modal in &modals {
            self.draw_modal(frame, area, modal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointerButtons;
    use crate::services::ConflictChoice;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn test_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            library_dir: dir.path().join("csv"),
            wildcard_dir: dir.path().join("wildcards"),
            model_dirs: vec![dir.path().join("models")],
            drag: DragTuning::default(),
            log_filter: "info".to_string(),
        };
        let app = App::with_config(config, Some(dir.path().join("workspace.json")));
        (app, dir)
    }

    fn run(app: &mut App, action: Action) {
        let mut current = Some(action);
        while let Some(a) = current {
            current = app.update(a).unwrap();
        }
    }

    /// Three CSV rows laid out three cells apart starting at y=7
    fn add_rows(app: &mut App) -> Vec<RowId> {
        let rows = &mut app.workspace.active_mut().rows;
        let ids: Vec<RowId> = ["a.csv", "b.csv", "c.csv"]
            .iter()
            .map(|f| rows.push(Row::csv(*f)))
            .collect();
        for (i, id) in ids.iter().enumerate() {
            rows.set_row_top(*id, 7.0 + 3.0 * i as f32);
        }
        ids
    }

    fn files(app: &App) -> Vec<String> {
        app.workspace.active().rows.files()
    }

    #[test]
    fn test_drag_commit_saves_after_release() {
        let (mut app, dir) = test_app();
        let path = dir.path().join("workspace.json");
        let ids = add_rows(&mut app);

        run(&mut app, Action::DragBegin { row: ids[0], y: 8 });
        assert_eq!(app.registry.owner(), Some(app.workspace.active().id));

        run(
            &mut app,
            Action::DragMove {
                y: 12,
                buttons: PointerButtons::PRIMARY,
            },
        );
        assert_eq!(files(&app), vec!["b.csv", "a.csv", "c.csv"]);
        assert_eq!(app.home.selected, 1);
        // Nothing is written while the pointer is still down
        assert!(!path.exists());

        run(&mut app, Action::DragRelease { inside: true });
        assert!(!app.registry.is_active());
        assert!(path.exists());

        let saved = Workspace::load(&path);
        assert_eq!(saved.active().rows.files(), vec!["b.csv", "a.csv", "c.csv"]);
    }

    #[test]
    fn test_click_without_movement_changes_nothing() {
        let (mut app, dir) = test_app();
        let path = dir.path().join("workspace.json");
        let ids = add_rows(&mut app);

        run(&mut app, Action::DragBegin { row: ids[1], y: 11 });
        run(&mut app, Action::DragRelease { inside: true });

        assert!(!app.registry.is_active());
        assert_eq!(files(&app), vec!["a.csv", "b.csv", "c.csv"]);
        assert_eq!(app.home.selected, 1);
        assert_eq!(app.status_message, None);
        assert!(!path.exists());
    }

    #[test]
    fn test_focus_lost_rolls_back() {
        let (mut app, _dir) = test_app();
        let ids = add_rows(&mut app);

        run(&mut app, Action::DragBegin { row: ids[0], y: 8 });
        run(
            &mut app,
            Action::DragMove {
                y: 12,
                buttons: PointerButtons::PRIMARY,
            },
        );
        run(&mut app, Action::FocusLost);

        assert_eq!(files(&app), vec!["a.csv", "b.csv", "c.csv"]);
        assert!(!app.registry.is_active());
        assert_eq!(app.status_message.as_deref(), Some("Drag cancelled"));
    }

    #[test]
    fn test_release_outside_rolls_back() {
        let (mut app, _dir) = test_app();
        let ids = add_rows(&mut app);

        run(&mut app, Action::DragBegin { row: ids[2], y: 14 });
        run(
            &mut app,
            Action::DragMove {
                y: 7,
                buttons: PointerButtons::PRIMARY,
            },
        );
        assert_eq!(files(&app)[0], "c.csv");

        run(&mut app, Action::DragRelease { inside: false });
        assert_eq!(files(&app), vec!["a.csv", "b.csv", "c.csv"]);
    }

    #[test]
    fn test_keys_are_ignored_mid_drag() {
        let (mut app, _dir) = test_app();
        let ids = add_rows(&mut app);
        run(&mut app, Action::DragBegin { row: ids[1], y: 11 });

        let delete = KeyEvent::new(KeyCode::Char('d'), crossterm::event::KeyModifiers::NONE);
        assert_eq!(app.handle_key_event(delete).unwrap(), None);
        let esc = KeyEvent::new(KeyCode::Esc, crossterm::event::KeyModifiers::NONE);
        assert_eq!(app.handle_key_event(esc).unwrap(), Some(Action::DragCancel));
    }

    #[test]
    fn test_generate_advances_seed() {
        let (mut app, _dir) = test_app();
        {
            let deck = app.workspace.active_mut();
            deck.rows.push(Row::extra("soft light"));
            deck.seed = 5;
            deck.seed_control = crate::model::SeedControl::Increment;
        }

        run(&mut app, Action::Generate);
        let deck = app.workspace.active();
        assert_eq!(deck.seed, 6);
        let composition = &app.compositions[&deck.id];
        assert_eq!(composition.seed, 6);
        assert_eq!(composition.prompt, "soft light,");

        run(&mut app, Action::Generate);
        assert_eq!(app.workspace.active().seed, 7);
    }

    #[test]
    fn test_import_conflict_then_rename() {
        let (mut app, dir) = test_app();
        fs::create_dir_all(dir.path().join("csv")).unwrap();
        fs::write(dir.path().join("csv/a.csv"), "x,1\n").unwrap();
        let source_dir = dir.path().join("incoming");
        fs::create_dir_all(&source_dir).unwrap();
        let source = source_dir.join("a.csv");
        fs::write(&source, "y,2\n").unwrap();

        run(&mut app, Action::OpenImport);
        run(&mut app, Action::ImportPath(source.display().to_string()));
        assert_eq!(
            app.modals.top(),
            Some(&Modal::Conflict {
                filename: "a.csv".to_string(),
                suggested: "a (1).csv".to_string(),
            })
        );

        run(
            &mut app,
            Action::ResolveConflict(ConflictChoice::Rename(String::new())),
        );
        assert!(app.modals.is_empty());
        assert_eq!(files(&app), vec!["a (1).csv"]);
        assert!(dir.path().join("csv/a (1).csv").exists());
    }

    #[test]
    fn test_wildcard_goes_into_open_editor() {
        let (mut app, _dir) = test_app();
        app.workspace.active_mut().pre_text = "masterpiece".to_string();

        run(&mut app, Action::OpenPreTextEditor);
        run(&mut app, Action::OpenWildcards);
        assert_eq!(
            app.modals.top(),
            Some(&Modal::Wildcards {
                target: TextTarget::PreText
            })
        );

        run(
            &mut app,
            Action::WildcardChosen {
                target: TextTarget::PreText,
                token: "__colors__".to_string(),
            },
        );
        let editor = app.text_editor.as_ref().unwrap();
        assert_eq!(editor.text(), "masterpiece, __colors__");
        // The deck only changes when the editor saves
        assert_eq!(app.workspace.active().pre_text, "masterpiece");
    }

    #[test]
    fn test_file_picker_syncs_rows() {
        let (mut app, _dir) = test_app();
        add_rows(&mut app);

        run(
            &mut app,
            Action::FilesPicked {
                row: None,
                files: vec!["c.csv".to_string(), "d.csv".to_string()],
            },
        );
        assert_eq!(files(&app), vec!["c.csv", "d.csv"]);
    }
}
