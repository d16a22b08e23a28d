//! Content search across the deck's prompt files

use super::library::{PromptFile, PromptLibrary};
use crate::model::{Row, RowList, NONE_KEY, RANDOM_KEY};
use std::collections::{BTreeMap, HashSet};

/// Hits for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHits {
    pub file: String,
    pub keys: Vec<String>,
}

/// Labels, then comma-separated output tokens, containing `needle`
///
/// Matching is case-insensitive and hits are deduplicated case-insensitively,
/// keeping the first spelling seen.
pub fn find_hits(file: &PromptFile, needle: &str) -> Vec<String> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    let mut seen = HashSet::new();
    let mut consider = |candidate: &str| {
        let lowered = candidate.to_lowercase();
        if lowered.contains(&needle) && seen.insert(lowered) {
            hits.push(candidate.to_string());
        }
    };

    for label in &file.labels {
        let label = label.trim();
        if label.is_empty() || label == NONE_KEY || label == RANDOM_KEY {
            continue;
        }
        consider(label);
    }

    for label in &file.labels {
        let Some(output) = file.output(label) else {
            continue;
        };
        for token in output.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            consider(token);
        }
    }
    hits
}

/// Search every distinct file of `rows`; unreadable files are skipped
pub fn search_rows(library: &mut PromptLibrary, rows: &RowList, needle: &str) -> Vec<FileHits> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for file in rows.files() {
        if !seen.insert(file.clone()) {
            continue;
        }
        let data = match library.read(&file) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(file = %file, "search skipped file: {}", e);
                continue;
            }
        };
        let keys = find_hits(&data, needle);
        if !keys.is_empty() {
            results.push(FileHits { file, keys });
        }
    }
    results
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pending Selections
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-file key selections edited by the search dialog before applying
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSelections {
    by_file: BTreeMap<String, Vec<String>>,
}

impl SearchSelections {
    /// Start from the current selections of the deck's CSV rows
    pub fn from_rows(rows: &RowList) -> Self {
        let mut by_file: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in rows.entries() {
            if let Row::Csv(csv) = &entry.row {
                if csv.file.is_empty() || csv.keys.is_empty() {
                    continue;
                }
                let keys = by_file.entry(csv.file.clone()).or_default();
                for key in &csv.keys {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
            }
        }
        Self { by_file }
    }

    pub fn is_selected(&self, file: &str, key: &str) -> bool {
        self.by_file
            .get(file)
            .is_some_and(|keys| keys.iter().any(|k| k == key))
    }

    /// Toggle one key; `Random` is exclusive with concrete labels
    pub fn toggle(&mut self, file: &str, key: &str) {
        let keys = self.by_file.entry(file.to_string()).or_default();
        if let Some(pos) = keys.iter().position(|k| k == key) {
            keys.remove(pos);
            return;
        }
        if key == RANDOM_KEY {
            keys.clear();
        } else {
            keys.retain(|k| k != RANDOM_KEY && k != NONE_KEY);
        }
        keys.push(key.to_string());
    }

    /// Clear the selection of every file
    pub fn clear_all<'a>(&mut self, files: impl IntoIterator<Item = &'a str>) {
        for file in files {
            self.by_file.insert(file.to_string(), Vec::new());
        }
    }

    /// Select `Random` for every file
    pub fn random_all<'a>(&mut self, files: impl IntoIterator<Item = &'a str>) {
        for file in files {
            self.by_file
                .insert(file.to_string(), vec![RANDOM_KEY.to_string()]);
        }
    }

    /// Files with at least one selected key, sorted by file name
    pub fn selected_groups(&self) -> Vec<FileHits> {
        self.by_file
            .iter()
            .filter(|(_, keys)| !keys.is_empty())
            .map(|(file, keys)| FileHits {
                file: file.clone(),
                keys: keys.clone(),
            })
            .collect()
    }

    /// Write the selections to every row of each touched file
    pub fn apply(&self, rows: &mut RowList) -> bool {
        let mut changed = false;
        for (file, keys) in &self.by_file {
            changed |= rows.apply_file_selection(file, keys);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_file(pairs: &[(&str, &str)]) -> PromptFile {
        let mut file = PromptFile::default();
        for (label, output) in pairs {
            file.labels.push(label.to_string());
            file.map.insert(label.to_string(), output.to_string());
        }
        file
    }

    #[test]
    fn test_find_hits_labels_then_tokens() {
        let file = prompt_file(&[
            ("Red Hair", "red hair, long hair"),
            ("Random", "grey cat, misc"),
            ("Eyes", "blue eyes, RED eyes"),
        ]);
        assert_eq!(
            find_hits(&file, "  RED "),
            vec!["Red Hair", "RED eyes"]
        );
        assert_eq!(find_hits(&file, "hair"), vec!["Red Hair", "long hair"]);
        assert!(find_hits(&file, "   ").is_empty());
        assert!(find_hits(&file, "random").is_empty());
        // Only the special label is skipped; its output is still searched
        assert_eq!(find_hits(&file, "cat"), vec!["grey cat"]);
    }

    #[test]
    fn test_toggle_random_is_exclusive() {
        let mut selections = SearchSelections::default();
        selections.toggle("a.csv", "cat");
        selections.toggle("a.csv", "dog");
        assert!(selections.is_selected("a.csv", "dog"));

        selections.toggle("a.csv", "Random");
        assert_eq!(
            selections.selected_groups(),
            vec![FileHits {
                file: "a.csv".to_string(),
                keys: vec!["Random".to_string()],
            }]
        );

        selections.toggle("a.csv", "cat");
        assert!(!selections.is_selected("a.csv", "Random"));
        selections.toggle("a.csv", "cat");
        assert!(selections.selected_groups().is_empty());
    }

    #[test]
    fn test_apply_updates_rows() {
        let mut rows = RowList::new();
        let a = rows.push(Row::csv("a.csv"));
        let b = rows.push(Row::csv("b.csv"));
        rows.set_keys(a, vec!["cat".to_string()]);

        let mut selections = SearchSelections::from_rows(&rows);
        assert!(selections.is_selected("a.csv", "cat"));
        selections.random_all(["b.csv"]);
        selections.clear_all(["a.csv"]);
        assert!(selections.apply(&mut rows));

        match (&rows.get(a).unwrap().row, &rows.get(b).unwrap().row) {
            (Row::Csv(first), Row::Csv(second)) => {
                assert!(first.keys.is_empty());
                assert_eq!(second.keys, vec!["Random"]);
            }
            other => panic!("unexpected rows: {:?}", other),
        }
    }
}
