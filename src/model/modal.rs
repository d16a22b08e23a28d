//! Modal stack for managing overlays
//!
//! Only the top modal receives input; closing it reveals the one below.

use super::row::RowId;

/// Which text a dialog edits or inserts into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    /// The deck's pre-text
    PreText,
    /// An extra-text row
    Extra(RowId),
}

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Library file picker; `row` set means "replace this row's file"
    FilePicker { row: Option<RowId> },
    /// Label picker for one CSV row
    KeyPicker { row: RowId },
    /// Path prompt for importing a CSV file into the library
    Import,
    /// Name conflict resolution for a pending import
    Conflict { filename: String, suggested: String },
    /// Content search across the deck's files
    Search,
    /// Multiline text editor
    TextEdit { target: TextTarget },
    /// Wildcard picker inserting into a text target
    Wildcards { target: TextTarget },
    /// Model preview lookup
    Preview,
    /// Help dialog showing all keyboard shortcuts
    Help { scroll_offset: usize },
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.push(Modal::FilePicker { row: None });
        stack.push(Modal::Conflict {
            filename: "a.csv".to_string(),
            suggested: "a (1).csv".to_string(),
        });

        assert!(matches!(stack.pop(), Some(Modal::Conflict { .. })));
        assert_eq!(stack.top(), Some(&Modal::FilePicker { row: None }));
        assert_eq!(stack.iter().count(), 1);
        stack.pop();
        assert!(stack.is_empty());
    }
}
