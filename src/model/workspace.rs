//! Workspace - the set of decks and their persistence
//!
//! Rows are stored as `{type, file, key, order}` records. `key` is either a
//! single label or a list of labels; the list order is restored from `order`
//! when loading.

use super::deck::{Deck, DeckId, SeedControl};
use super::row::{normalize_keys, Row, RowList};
use crate::config::Config;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ═══════════════════════════════════════════════════════════════════════════════
// Persisted Format
// ═══════════════════════════════════════════════════════════════════════════════

/// A key selection as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedKey {
    One(String),
    Many(Vec<String>),
}

impl Default for PersistedKey {
    fn default() -> Self {
        PersistedKey::One(super::row::NONE_KEY.to_string())
    }
}

impl PersistedKey {
    fn from_keys(keys: &[String]) -> Self {
        match keys {
            [] => PersistedKey::default(),
            [one] => PersistedKey::One(one.clone()),
            many => PersistedKey::Many(many.to_vec()),
        }
    }

    fn into_keys(self) -> Vec<String> {
        match self {
            PersistedKey::One(key) => normalize_keys([key]),
            PersistedKey::Many(keys) => normalize_keys(keys),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PersistedRow {
    Csv {
        file: String,
        #[serde(default)]
        key: PersistedKey,
        #[serde(default)]
        order: i64,
    },
    Extra {
        #[serde(default)]
        text: String,
        #[serde(default)]
        order: i64,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckFile {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub pre_text: String,
    #[serde(default = "default_true")]
    pub add_comma: bool,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub seed_control: SeedControl,
    #[serde(default)]
    pub rows: Vec<PersistedRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub active: usize,
    pub decks: Vec<DeckFile>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Local>>,
}

impl DeckFile {
    fn from_deck(deck: &Deck) -> Self {
        let rows = deck
            .rows
            .entries()
            .iter()
            .map(|entry| match &entry.row {
                Row::Csv(csv) => PersistedRow::Csv {
                    file: csv.file.clone(),
                    key: PersistedKey::from_keys(&csv.keys),
                    order: entry.order as i64,
                },
                Row::Extra(extra) => PersistedRow::Extra {
                    text: extra.text.clone(),
                    order: entry.order as i64,
                },
            })
            .collect();

        Self {
            id: deck.id.0,
            name: deck.name.clone(),
            pre_text: deck.pre_text.clone(),
            add_comma: deck.add_comma,
            seed: deck.seed,
            seed_control: deck.seed_control,
            rows,
        }
    }

    fn into_deck(self) -> Deck {
        let rows = self
            .rows
            .into_iter()
            .filter_map(|row| match row {
                PersistedRow::Csv { file, key, order } => {
                    let file = file.trim().to_string();
                    if file.is_empty() {
                        return None;
                    }
                    let mut csv = super::row::CsvRow::new(file);
                    csv.keys = key.into_keys();
                    Some((Row::Csv(csv), order))
                }
                PersistedRow::Extra { text, order } => Some((Row::extra(text), order)),
            })
            .collect();

        let mut deck = Deck::new(DeckId(self.id), self.name);
        deck.rows = RowList::from_ordered(rows);
        deck.pre_text = self.pre_text;
        deck.add_comma = self.add_comma;
        deck.seed = self.seed;
        deck.seed_control = self.seed_control;
        deck
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Workspace
// ═══════════════════════════════════════════════════════════════════════════════

/// All decks of the session; always holds at least one
#[derive(Debug, Clone)]
pub struct Workspace {
    decks: Vec<Deck>,
    active: usize,
    next_deck_id: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            decks: vec![Deck::new(DeckId(1), "Deck 1")],
            active: 0,
            next_deck_id: 2,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        Config::config_dir().map(|dir| dir.join("workspace.json"))
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Deck {
        &self.decks[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Deck {
        &mut self.decks[self.active]
    }

    pub fn deck_mut(&mut self, id: DeckId) -> Option<&mut Deck> {
        self.decks.iter_mut().find(|d| d.id == id)
    }

    /// Add a deck after the existing ones and make it active
    pub fn add_deck(&mut self) -> DeckId {
        let id = DeckId(self.next_deck_id);
        self.next_deck_id += 1;
        self.decks.push(Deck::new(id, format!("Deck {}", id.0)));
        self.active = self.decks.len() - 1;
        id
    }

    /// Remove the active deck unless it is the last one
    pub fn remove_active(&mut self) -> Option<Deck> {
        if self.decks.len() <= 1 {
            return None;
        }
        let removed = self.decks.remove(self.active);
        self.active = self.active.min(self.decks.len() - 1);
        Some(removed)
    }

    pub fn next_deck(&mut self) {
        self.active = (self.active + 1) % self.decks.len();
    }

    pub fn prev_deck(&mut self) {
        self.active = if self.active == 0 {
            self.decks.len() - 1
        } else {
            self.active - 1
        };
    }

    pub fn to_file(&self) -> WorkspaceFile {
        WorkspaceFile {
            active: self.active,
            decks: self.decks.iter().map(DeckFile::from_deck).collect(),
            saved_at: Some(Local::now()),
        }
    }

    pub fn from_file(file: WorkspaceFile) -> Self {
        let decks: Vec<Deck> = file.decks.into_iter().map(DeckFile::into_deck).collect();
        if decks.is_empty() {
            return Self::new();
        }
        let next_deck_id = decks.iter().map(|d| d.id.0).max().unwrap_or(0) + 1;
        let active = file.active.min(decks.len() - 1);
        Self {
            decks,
            active,
            next_deck_id,
        }
    }

    /// Load from `path`; a missing or unreadable file yields a fresh workspace
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }

        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to read workspace {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match serde_json::from_str::<WorkspaceFile>(&contents) {
            Ok(file) => Self::from_file(file),
            Err(e) => {
                tracing::warn!("Failed to parse workspace {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.to_file())?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_preserves_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workspace.json");

        let mut workspace = Workspace::new();
        {
            let deck = workspace.active_mut();
            deck.pre_text = "masterpiece".to_string();
            deck.seed = 42;
            deck.seed_control = SeedControl::Increment;
            let a = deck.rows.push(Row::csv("styles.csv"));
            deck.rows.push(Row::extra("best quality"));
            let c = deck.rows.push(Row::csv("sub/colors.csv"));
            deck.rows.set_keys(a, vec!["Random".to_string()]);
            deck.rows.set_keys(c, vec!["red".to_string(), "blue".to_string()]);
        }
        workspace.save(&path).unwrap();

        let loaded = Workspace::load(&path);
        let deck = loaded.active();
        assert_eq!(deck.pre_text, "masterpiece");
        assert_eq!(deck.seed, 42);
        assert_eq!(deck.seed_control, SeedControl::Increment);
        let rows: Vec<Row> = deck.rows.entries().iter().map(|e| e.row.clone()).collect();
        assert_eq!(rows.len(), 3);
        match &rows[2] {
            Row::Csv(csv) => assert_eq!(csv.keys, vec!["red", "blue"]),
            other => panic!("unexpected row: {:?}", other),
        }
        assert_eq!(rows[1], Row::extra("best quality"));
    }

    #[test]
    fn test_load_sorts_by_order_and_normalizes_keys() {
        let json = r#"{
            "decks": [{
                "id": 7,
                "name": "Portraits",
                "rows": [
                    {"type": "csv", "file": "b.csv", "key": "(None)", "order": 2},
                    {"type": "csv", "file": "", "key": "x", "order": 0},
                    {"type": "extra", "text": "hi", "order": 1},
                    {"type": "csv", "file": "a.csv", "key": [" cat ", "(None)"], "order": 0}
                ]
            }]
        }"#;
        let file: WorkspaceFile = serde_json::from_str(json).unwrap();
        let workspace = Workspace::from_file(file);
        let deck = workspace.active();

        assert!(deck.add_comma);
        assert_eq!(deck.rows.files(), vec!["a.csv", "b.csv"]);
        let orders: Vec<usize> = deck.rows.entries().iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        match &deck.rows.entries()[0].row {
            Row::Csv(csv) => assert_eq!(csv.keys, vec!["cat"]),
            other => panic!("unexpected row: {:?}", other),
        }
        match &deck.rows.entries()[2].row {
            Row::Csv(csv) => assert!(csv.keys.is_empty()),
            other => panic!("unexpected row: {:?}", other),
        }
    }

    #[test]
    fn test_persisted_key_shapes() {
        let one = serde_json::to_value(PersistedKey::from_keys(&["cat".to_string()])).unwrap();
        assert_eq!(one, serde_json::json!("cat"));
        let none = serde_json::to_value(PersistedKey::from_keys(&[])).unwrap();
        assert_eq!(none, serde_json::json!("(None)"));
    }

    #[test]
    fn test_missing_file_gives_fresh_workspace() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::load(&dir.path().join("nope.json"));
        assert_eq!(workspace.decks().len(), 1);
    }

    #[test]
    fn test_deck_management() {
        let mut workspace = Workspace::new();
        assert!(workspace.remove_active().is_none());

        let id = workspace.add_deck();
        assert_eq!(workspace.active().id, id);
        workspace.next_deck();
        assert_eq!(workspace.active_index(), 0);
        workspace.prev_deck();
        assert_eq!(workspace.active_index(), 1);

        assert!(workspace.remove_active().is_some());
        assert_eq!(workspace.active_index(), 0);
        assert_eq!(workspace.add_deck(), DeckId(3));
    }
}
