//! Decks - named prompt builders, each owning a row list
//!
//! A deck plays the role of a graph node: it owns its rows, its composition
//! settings and, while one is in progress, its drag session.

use super::drag::{DragEnd, DragRegistry, DragTuning, DragUpdate, PointerButtons};
use super::row::{RowId, RowList};
use serde::{Deserialize, Serialize};

/// Stable identity of a deck within the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckId(pub u64);

/// What happens to the seed after each generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedControl {
    #[default]
    Fixed,
    Increment,
    Decrement,
    Randomize,
}

impl SeedControl {
    pub fn all() -> [SeedControl; 4] {
        [
            SeedControl::Fixed,
            SeedControl::Increment,
            SeedControl::Decrement,
            SeedControl::Randomize,
        ]
    }

    pub fn name(&self) -> &str {
        match self {
            SeedControl::Fixed => "fixed",
            SeedControl::Increment => "increment",
            SeedControl::Decrement => "decrement",
            SeedControl::Randomize => "randomize",
        }
    }

    pub fn next(&self) -> SeedControl {
        match self {
            SeedControl::Fixed => SeedControl::Increment,
            SeedControl::Increment => SeedControl::Decrement,
            SeedControl::Decrement => SeedControl::Randomize,
            SeedControl::Randomize => SeedControl::Fixed,
        }
    }
}

/// A prompt builder: ordered rows plus composition settings
#[derive(Debug, Clone)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub rows: RowList,
    /// Text placed before the composed rows
    pub pre_text: String,
    pub add_comma: bool,
    pub seed: u64,
    pub seed_control: SeedControl,
}

impl Deck {
    pub fn new(id: DeckId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rows: RowList::new(),
            pre_text: String::new(),
            add_comma: true,
            seed: 0,
            seed_control: SeedControl::Fixed,
        }
    }

    /// Start a drag on `row`, claiming the registry for this deck
    ///
    /// Rejected while any deck (this one included) has an active session.
    pub fn begin_drag(
        &mut self,
        registry: &mut DragRegistry,
        row: RowId,
        pointer_y: f32,
        tuning: &DragTuning,
    ) -> bool {
        if registry.is_active() || self.rows.is_dragging() {
            tracing::debug!(deck = self.id.0, "drag rejected: another drag is active");
            return false;
        }
        if !self.rows.begin_drag(row, pointer_y, tuning) {
            return false;
        }
        registry.claim(self.id)
    }

    pub fn update_drag(
        &mut self,
        registry: &mut DragRegistry,
        pointer_y: f32,
        buttons: PointerButtons,
        tuning: &DragTuning,
    ) -> DragUpdate {
        let update = self.rows.update_drag(pointer_y, buttons, tuning);
        if update == DragUpdate::Cancelled {
            registry.release(self.id);
        }
        update
    }

    pub fn end_drag(&mut self, registry: &mut DragRegistry, commit: bool) -> Option<DragEnd> {
        registry.release(self.id);
        self.rows.end_drag(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::Row;

    fn deck_with_rows(id: u64) -> (Deck, Vec<RowId>) {
        let mut deck = Deck::new(DeckId(id), format!("deck {id}"));
        let ids = (0..3)
            .map(|i| deck.rows.push(Row::csv(format!("{i}.csv"))))
            .collect();
        (deck, ids)
    }

    #[test]
    fn test_only_one_deck_can_drag() {
        let tuning = DragTuning::with_row_height(54.0);
        let mut registry = DragRegistry::new();
        let (mut first, first_ids) = deck_with_rows(1);
        let (mut second, second_ids) = deck_with_rows(2);

        assert!(first.begin_drag(&mut registry, first_ids[0], 10.0, &tuning));
        assert!(!second.begin_drag(&mut registry, second_ids[0], 10.0, &tuning));
        assert!(!second.rows.is_dragging());
        assert_eq!(registry.owner(), Some(DeckId(1)));

        assert_eq!(first.end_drag(&mut registry, true), Some(DragEnd::Committed));
        assert!(second.begin_drag(&mut registry, second_ids[0], 10.0, &tuning));
    }

    #[test]
    fn test_cancelled_update_releases_registry() {
        let tuning = DragTuning::with_row_height(54.0);
        let mut registry = DragRegistry::new();
        let (mut deck, ids) = deck_with_rows(1);

        deck.begin_drag(&mut registry, ids[0], 10.0, &tuning);
        let update = deck.update_drag(&mut registry, 100.0, PointerButtons::NONE, &tuning);
        assert_eq!(update, DragUpdate::Cancelled);
        assert!(!registry.is_active());
        assert_eq!(deck.rows.ids(), ids);
    }

    #[test]
    fn test_seed_control_cycles() {
        let mut control = SeedControl::default();
        for _ in 0..SeedControl::all().len() {
            control = control.next();
        }
        assert_eq!(control, SeedControl::Fixed);
    }
}
