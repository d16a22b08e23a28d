//! Rows and the ordered row list of a deck
//!
//! A `RowList` is the authoritative display and composition order of a deck.
//! Every structural change renumbers `order` to the row's index, so the
//! persisted order never has gaps or duplicates.

use super::drag::DragSession;
use std::collections::HashSet;

/// Label meaning "nothing selected"
pub const NONE_KEY: &str = "(None)";

/// Label resolved to a seeded random pick at compose time
pub const RANDOM_KEY: &str = "Random";

/// Stable identity of a row inside its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

/// A CSV source bound to the deck, with the selected labels
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvRow {
    pub file: String,
    /// Selected labels; empty means `(None)`
    pub keys: Vec<String>,
}

impl CsvRow {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            keys: Vec::new(),
        }
    }

    /// Short description of the selection for the row widget
    pub fn selection_label(&self) -> String {
        match self.keys.len() {
            0 => NONE_KEY.to_string(),
            1 => self.keys[0].clone(),
            n => format!("{} selected", n),
        }
    }
}

/// Free text appended to the prompt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtraRow {
    pub text: String,
}

/// One reorderable entry of a deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Csv(CsvRow),
    Extra(ExtraRow),
}

impl Row {
    pub fn csv(file: impl Into<String>) -> Self {
        Row::Csv(CsvRow::new(file))
    }

    pub fn extra(text: impl Into<String>) -> Self {
        Row::Extra(ExtraRow { text: text.into() })
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Row::Csv(csv) => Some(csv.file.as_str()),
            Row::Extra(_) => None,
        }
    }
}

/// Clean a raw key selection: trims, drops empties and `(None)`
pub fn normalize_keys<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty() && k != NONE_KEY)
        .collect()
}

/// A row with its identity, persisted order and last laid-out position
#[derive(Debug, Clone, PartialEq)]
pub struct RowEntry {
    pub id: RowId,
    pub row: Row,
    pub order: usize,
    /// Top Y of the row's slot, written by the host after each layout pass
    pub top_y: Option<f32>,
}

/// Ordered rows owned by one deck, plus its drag session while one is active
#[derive(Debug, Clone, Default)]
pub struct RowList {
    pub(super) entries: Vec<RowEntry>,
    pub(super) next_id: u64,
    pub(super) session: Option<DragSession>,
}

impl RowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from persisted rows, sorting by their stored order
    pub fn from_ordered(rows: Vec<(Row, i64)>) -> Self {
        let mut rows = rows;
        rows.sort_by_key(|(_, order)| *order);

        let mut list = Self::new();
        for (row, _) in rows {
            list.push(row);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn get(&self, id: RowId) -> Option<&RowEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut RowEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&RowEntry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: RowId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Append a row at the end and return its id
    pub fn push(&mut self, row: Row) -> RowId {
        self.next_id += 1;
        let id = RowId(self.next_id);
        self.entries.push(RowEntry {
            id,
            row,
            order: self.entries.len(),
            top_y: None,
        });
        id
    }

    /// Remove a row, keeping the order numbering dense
    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let index = self.index_of(id)?;
        let entry = self.entries.remove(index);
        self.renumber();
        Some(entry.row)
    }

    /// Assign `order` = index for every row
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.order = i;
        }
    }

    /// Move a row by `delta` positions, clamped to the list bounds
    pub fn move_by(&mut self, id: RowId, delta: isize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let last = self.entries.len().saturating_sub(1) as isize;
        let to = (from as isize + delta).clamp(0, last) as usize;
        if to == from {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.renumber();
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// Record where the host laid out a row's slot
    pub fn set_row_top(&mut self, id: RowId, top_y: f32) {
        if let Some(entry) = self.get_mut(id) {
            entry.top_y = Some(top_y);
        }
    }

    /// Forget all laid-out positions (e.g. the row area scrolled out of view)
    pub fn clear_layout(&mut self) {
        for entry in &mut self.entries {
            entry.top_y = None;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // CSV rows
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_file(&self, file: &str) -> bool {
        self.entries.iter().any(|e| e.row.file() == Some(file))
    }

    /// Files of all CSV rows, in list order
    pub fn files(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.row.file().map(str::to_string))
            .collect()
    }

    /// Point a CSV row at another file; the selection is reset
    pub fn set_file(&mut self, id: RowId, file: &str) -> bool {
        match self.get_mut(id) {
            Some(RowEntry {
                row: Row::Csv(csv), ..
            }) => {
                csv.file = file.to_string();
                csv.keys.clear();
                true
            }
            _ => false,
        }
    }

    pub fn set_keys(&mut self, id: RowId, keys: Vec<String>) -> bool {
        match self.get_mut(id) {
            Some(RowEntry {
                row: Row::Csv(csv), ..
            }) => {
                csv.keys = normalize_keys(keys);
                true
            }
            _ => false,
        }
    }

    pub fn set_text(&mut self, id: RowId, text: &str) -> bool {
        match self.get_mut(id) {
            Some(RowEntry {
                row: Row::Extra(extra),
                ..
            }) => {
                extra.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Apply a search selection to every CSV row reading `file`
    pub fn apply_file_selection(&mut self, file: &str, keys: &[String]) -> bool {
        let keys = normalize_keys(keys);
        let mut changed = false;
        for entry in &mut self.entries {
            if let Row::Csv(csv) = &mut entry.row {
                if csv.file == file && csv.keys != keys {
                    csv.keys = keys.clone();
                    changed = true;
                }
            }
        }
        changed
    }

    /// Make the CSV rows match a picked set of files
    ///
    /// Rows whose file is not picked are removed, picked files without a row
    /// get a new row at the end (in pick order). Existing rows keep their
    /// position and selection.
    pub fn sync_files(&mut self, picked: &[String]) -> (usize, usize) {
        let desired: HashSet<&str> = picked.iter().map(String::as_str).collect();
        let before = self.entries.len();
        self.entries.retain(|e| match e.row.file() {
            Some(file) => desired.contains(file),
            None => true,
        });
        let removed = before - self.entries.len();

        let mut present: HashSet<String> = self.files().into_iter().collect();
        let mut added = 0;
        for file in picked {
            if present.insert(file.clone()) {
                self.push(Row::csv(file.clone()));
                added += 1;
            }
        }
        self.renumber();
        (removed, added)
    }
}
