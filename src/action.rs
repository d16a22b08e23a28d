//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state. Dialog results travel back the same way.

use crate::model::{PointerButtons, RowId, TextTarget};
use crate::services::{ConflictChoice, SearchSelections};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for animations/updates
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Terminal lost focus
    FocusLost,
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    NextRow,
    PrevRow,
    FirstRow,
    LastRow,
    /// Select a row by index (mouse click)
    SelectRow(usize),
    NextDeck,
    PrevDeck,

    // ─────────────────────────────────────────────────────────────────────────
    // Decks
    // ─────────────────────────────────────────────────────────────────────────
    AddDeck,
    RemoveDeck,
    /// Compose the active deck's prompt, then advance its seed
    Generate,
    CycleSeedControl,
    ToggleAddComma,
    /// Nudge the seed by the given amount
    AdjustSeed(i64),

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────
    AddExtraRow,
    RemoveRow,
    MoveRowUp,
    MoveRowDown,
    /// Edit the selected row (labels or text)
    EditRow,

    // ─────────────────────────────────────────────────────────────────────────
    // Drag (pointer rows in terminal cells)
    // ─────────────────────────────────────────────────────────────────────────
    DragBegin { row: RowId, y: u16 },
    DragMove { y: u16, buttons: PointerButtons },
    /// Primary button released; `inside` when over the row list
    DragRelease { inside: bool },
    DragCancel,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    /// Pick library files for the deck's CSV rows
    OpenFilePicker,
    /// Pick a new file for the selected CSV row
    OpenRowFilePicker,
    OpenImport,
    OpenSearch,
    OpenPreTextEditor,
    OpenWildcards,
    OpenPreview,
    /// Rescan the wildcard directory
    ReloadWildcards,
    /// Close the current modal
    CloseModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialog Results
    // ─────────────────────────────────────────────────────────────────────────
    FilesPicked { row: Option<RowId>, files: Vec<String> },
    KeysPicked { row: RowId, keys: Vec<String> },
    TextEdited { target: TextTarget, text: String },
    WildcardChosen { target: TextTarget, token: String },
    ImportPath(String),
    ResolveConflict(ConflictChoice),
    SearchQuery(String),
    SearchApplied(SearchSelections),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::FocusLost => write!(f, "FocusLost"),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextRow => write!(f, "NextRow"),
            Action::PrevRow => write!(f, "PrevRow"),
            Action::FirstRow => write!(f, "FirstRow"),
            Action::LastRow => write!(f, "LastRow"),
            Action::SelectRow(i) => write!(f, "SelectRow({})", i),
            Action::NextDeck => write!(f, "NextDeck"),
            Action::PrevDeck => write!(f, "PrevDeck"),
            Action::AddDeck => write!(f, "AddDeck"),
            Action::RemoveDeck => write!(f, "RemoveDeck"),
            Action::Generate => write!(f, "Generate"),
            Action::CycleSeedControl => write!(f, "CycleSeedControl"),
            Action::ToggleAddComma => write!(f, "ToggleAddComma"),
            Action::AdjustSeed(delta) => write!(f, "AdjustSeed({})", delta),
            Action::AddExtraRow => write!(f, "AddExtraRow"),
            Action::RemoveRow => write!(f, "RemoveRow"),
            Action::MoveRowUp => write!(f, "MoveRowUp"),
            Action::MoveRowDown => write!(f, "MoveRowDown"),
            Action::EditRow => write!(f, "EditRow"),
            Action::DragBegin { row, y } => write!(f, "DragBegin({}, {})", row.0, y),
            Action::DragMove { y, buttons } => write!(f, "DragMove({}, {})", y, buttons.0),
            Action::DragRelease { inside } => write!(f, "DragRelease({})", inside),
            Action::DragCancel => write!(f, "DragCancel"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenFilePicker => write!(f, "OpenFilePicker"),
            Action::OpenRowFilePicker => write!(f, "OpenRowFilePicker"),
            Action::OpenImport => write!(f, "OpenImport"),
            Action::OpenSearch => write!(f, "OpenSearch"),
            Action::OpenPreTextEditor => write!(f, "OpenPreTextEditor"),
            Action::OpenWildcards => write!(f, "OpenWildcards"),
            Action::OpenPreview => write!(f, "OpenPreview"),
            Action::ReloadWildcards => write!(f, "ReloadWildcards"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::FilesPicked { files, .. } => write!(f, "FilesPicked({})", files.len()),
            Action::KeysPicked { row, keys } => write!(f, "KeysPicked({}, {})", row.0, keys.len()),
            Action::TextEdited { .. } => write!(f, "TextEdited"),
            Action::WildcardChosen { token, .. } => write!(f, "WildcardChosen({})", token),
            Action::ImportPath(path) => write!(f, "ImportPath({})", path),
            Action::ResolveConflict(choice) => write!(f, "ResolveConflict({:?})", choice),
            Action::SearchQuery(query) => write!(f, "SearchQuery({})", query),
            Action::SearchApplied(_) => write!(f, "SearchApplied"),
        }
    }
}
