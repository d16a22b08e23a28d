//! Drag-and-reorder engine for row lists
//!
//! Turns a continuous pointer trajectory into discrete reorders. The dragged
//! row's probe point (its logical center) is tested against the neighbouring
//! rows with a direction-dependent threshold: moving down snaps early
//! (`snap_enter`), moving up snaps late (`snap_exit`). The gap between the two
//! is a dead zone where pointer jitter cannot flip the index back and forth.
//!
//! Reorders are applied optimistically while the pointer moves. Releasing the
//! button commits; every other way a gesture can end rolls the list back to
//! the snapshot taken when the drag began.

use super::deck::DeckId;
use super::row::{RowId, RowList};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Height of one row slot, in terminal cells
pub const DEFAULT_ROW_HEIGHT: f32 = 3.0;
/// Where the probe sits inside the dragged row (0.5 = vertical center)
pub const PROBE_FRACTION: f32 = 0.50;
/// Threshold used while moving down
pub const SNAP_ENTER: f32 = 0.15;
/// Threshold used while moving up
pub const SNAP_EXIT: f32 = 0.65;

/// Tunable geometry of the drag engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragTuning {
    pub row_height: f32,
    pub probe_fraction: f32,
    pub snap_enter: f32,
    pub snap_exit: f32,
}

impl Default for DragTuning {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            probe_fraction: PROBE_FRACTION,
            snap_enter: SNAP_ENTER,
            snap_exit: SNAP_EXIT,
        }
    }
}

impl DragTuning {
    #[cfg(test)]
    pub fn with_row_height(row_height: f32) -> Self {
        Self {
            row_height,
            ..Self::default()
        }
    }

    fn probe_offset(&self) -> f32 {
        self.row_height * self.probe_fraction
    }
}

/// Bitmask of pointer buttons held during a move event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerButtons(pub u8);

impl PointerButtons {
    pub const NONE: PointerButtons = PointerButtons(0);
    pub const PRIMARY: PointerButtons = PointerButtons(1);

    pub fn primary_held(self) -> bool {
        self.0 & Self::PRIMARY.0 != 0
    }
}

/// State of one drag gesture; lives from `begin_drag` to `end_drag`
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub row: RowId,
    /// Pointer offset from the row's top edge at grab time
    pub offset_y: f32,
    /// Where the ghost copy of the row is drawn
    pub ghost_y: f32,
    pub last_probe_y: f32,
    /// Row order at grab time, for rollback
    pub original: Vec<RowId>,
    /// Index of the row when it was grabbed
    pub start_index: usize,
}

/// What a pointer move did to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragUpdate {
    /// No session is active
    Idle,
    /// Ghost moved, the list is unchanged
    Tracked,
    /// The dragged row moved to a new index
    Moved { from: usize, to: usize },
    /// The primary button was no longer held; the drag was rolled back
    Cancelled,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnd {
    Committed,
    RolledBack,
}

impl RowList {
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_row_dragging(&self, id: RowId) -> bool {
        self.session.as_ref().is_some_and(|s| s.row == id)
    }

    /// Whether the active drag has left the list in a different order
    ///
    /// False when there is no session or the row was dragged back to where
    /// it started.
    pub fn drag_has_moved(&self) -> bool {
        self.session.as_ref().is_some_and(|s| {
            self.index_of(s.row) != Some(s.start_index) || self.ids() != s.original
        })
    }

    /// Start dragging `row`, grabbed at `pointer_y`
    ///
    /// Returns false (and changes nothing) when the row does not exist or a
    /// session is already active.
    pub fn begin_drag(&mut self, row: RowId, pointer_y: f32, tuning: &DragTuning) -> bool {
        if self.session.is_some() {
            debug!(row = row.0, "drag rejected: session already active");
            return false;
        }
        let Some(start_index) = self.index_of(row) else {
            return false;
        };

        let row_top = self.entries[start_index].top_y.unwrap_or(pointer_y);
        self.session = Some(DragSession {
            row,
            offset_y: pointer_y - row_top,
            ghost_y: row_top,
            last_probe_y: row_top + tuning.probe_offset(),
            original: self.ids(),
            start_index,
        });
        debug!(row = row.0, start_index, "drag started");
        true
    }

    /// Feed a pointer move into the active session
    pub fn update_drag(
        &mut self,
        pointer_y: f32,
        buttons: PointerButtons,
        tuning: &DragTuning,
    ) -> DragUpdate {
        if self.session.is_none() {
            return DragUpdate::Idle;
        }
        if !buttons.primary_held() {
            self.end_drag(false);
            return DragUpdate::Cancelled;
        }

        let (row, probe_y, dir) = match self.session.as_mut() {
            Some(session) => {
                session.ghost_y = pointer_y - session.offset_y;
                let probe_y = session.ghost_y + tuning.probe_offset();
                let dir = probe_y - session.last_probe_y;
                session.last_probe_y = probe_y;
                (session.row, probe_y, dir)
            }
            None => return DragUpdate::Idle,
        };

        let (Some(target), Some(current)) = (
            self.compute_target_index(probe_y, row, dir, tuning),
            self.index_of(row),
        ) else {
            return DragUpdate::Tracked;
        };

        let clamped = target.min(self.entries.len().saturating_sub(1));
        if clamped != current && self.reorder_dragged_row(row, clamped) {
            debug!(row = row.0, from = current, to = clamped, "drag reorder");
            return DragUpdate::Moved {
                from: current,
                to: clamped,
            };
        }
        DragUpdate::Tracked
    }

    /// Index the dragged row would land at among the other rows
    ///
    /// Returns `None` when `dragged` is no longer part of the list.
    pub fn compute_target_index(
        &self,
        probe_y: f32,
        dragged: RowId,
        dir: f32,
        tuning: &DragTuning,
    ) -> Option<usize> {
        self.index_of(dragged)?;

        let others: Vec<_> = self.entries.iter().filter(|e| e.id != dragged).collect();
        if others.is_empty() {
            return Some(0);
        }

        let min_y = others
            .iter()
            .filter_map(|e| e.top_y)
            .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |m| m.min(y))))
            .unwrap_or(0.0);

        let threshold = if dir >= 0.0 {
            tuning.snap_enter
        } else {
            tuning.snap_exit
        };

        for (i, entry) in others.iter().enumerate() {
            let row_y = entry
                .top_y
                .unwrap_or(min_y + i as f32 * tuning.row_height);
            if probe_y < row_y + tuning.row_height * threshold {
                return Some(i);
            }
        }
        Some(others.len())
    }

    /// Move the dragged row to `target`, clamped to the list bounds
    ///
    /// Returns false when the row is missing or already there.
    pub fn reorder_dragged_row(&mut self, dragged: RowId, target: usize) -> bool {
        let Some(from) = self.index_of(dragged) else {
            return false;
        };
        let clamped = target.min(self.entries.len().saturating_sub(1));
        if clamped == from {
            return false;
        }

        let entry = self.entries.remove(from);
        self.entries.insert(clamped, entry);
        self.renumber();
        true
    }

    /// Finish the active session
    ///
    /// `commit` keeps the current arrangement; otherwise the order captured at
    /// `begin_drag` is restored. Returns `None` if no session was active.
    pub fn end_drag(&mut self, commit: bool) -> Option<DragEnd> {
        let session = self.session.take()?;

        let end = if commit {
            DragEnd::Committed
        } else {
            self.restore_order(&session.original);
            DragEnd::RolledBack
        };
        self.renumber();
        debug!(row = session.row.0, ?end, "drag ended");
        Some(end)
    }

    /// Rearrange rows to follow `original`
    ///
    /// Ids that no longer exist are skipped; rows missing from `original`
    /// keep their relative order and go to the end.
    fn restore_order(&mut self, original: &[RowId]) {
        let mut remaining = std::mem::take(&mut self.entries);
        let mut restored = Vec::with_capacity(remaining.len());

        for id in original {
            if let Some(pos) = remaining.iter().position(|e| e.id == *id) {
                restored.push(remaining.remove(pos));
            }
        }
        restored.extend(remaining);
        self.entries = restored;
    }
}

/// Tracks which deck owns the active drag
///
/// Window-level events (focus lost, release outside the list) are routed
/// through this to the right deck. At most one deck can hold a session.
#[derive(Debug, Default)]
pub struct DragRegistry {
    owner: Option<DeckId>,
}

impl DragRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<DeckId> {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.owner.is_some()
    }

    /// Claim the registry for `deck`; fails if any deck already holds it
    pub fn claim(&mut self, deck: DeckId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(deck);
        true
    }

    pub fn release(&mut self, deck: DeckId) {
        if self.owner == Some(deck) {
            self.owner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::Row;

    const H: f32 = 54.0;

    fn tuning() -> DragTuning {
        DragTuning::with_row_height(H)
    }

    /// Lay rows out back to back starting at y = 0, like the host does each frame
    fn layout(list: &mut RowList) {
        for (i, id) in list.ids().into_iter().enumerate() {
            list.set_row_top(id, i as f32 * H);
        }
    }

    fn abc() -> (RowList, RowId, RowId, RowId) {
        let mut list = RowList::new();
        let a = list.push(Row::csv("A.csv"));
        let b = list.push(Row::csv("B.csv"));
        let c = list.push(Row::csv("C.csv"));
        layout(&mut list);
        (list, a, b, c)
    }

    fn orders(list: &RowList) -> Vec<(RowId, usize)> {
        list.entries().iter().map(|e| (e.id, e.order)).collect()
    }

    #[test]
    fn test_drag_down_and_commit() {
        let (mut list, a, b, c) = abc();
        let t = tuning();

        assert!(list.begin_drag(a, 10.0, &t));
        assert_eq!(list.session().map(|s| s.offset_y), Some(10.0));

        let update = list.update_drag(118.0, PointerButtons::PRIMARY, &t);
        assert_eq!(update, DragUpdate::Moved { from: 0, to: 2 });
        assert_eq!(list.ids(), vec![b, c, a]);

        assert_eq!(list.end_drag(true), Some(DragEnd::Committed));
        assert!(!list.is_dragging());
        assert_eq!(orders(&list), vec![(b, 0), (c, 1), (a, 2)]);
    }

    #[test]
    fn test_focus_loss_rolls_back() {
        let (mut list, a, b, c) = abc();
        let t = tuning();
        let before = orders(&list);

        list.begin_drag(a, 10.0, &t);
        list.update_drag(118.0, PointerButtons::PRIMARY, &t);
        assert_eq!(list.ids(), vec![b, c, a]);

        assert_eq!(list.end_drag(false), Some(DragEnd::RolledBack));
        assert_eq!(list.ids(), vec![a, b, c]);
        assert_eq!(orders(&list), before);
    }

    #[test]
    fn test_release_at_origin_is_idempotent() {
        let (mut list, a, b, c) = abc();
        let t = tuning();
        let before = orders(&list);

        list.begin_drag(a, 10.0, &t);
        assert_eq!(
            list.update_drag(12.0, PointerButtons::PRIMARY, &t),
            DragUpdate::Tracked
        );
        assert!(!list.drag_has_moved());
        list.end_drag(true);

        assert_eq!(list.ids(), vec![a, b, c]);
        assert_eq!(orders(&list), before);
    }

    #[test]
    fn test_drag_has_moved_tracks_order() {
        let (mut list, a, _, _) = abc();
        let t = tuning();
        assert!(!list.drag_has_moved());

        list.begin_drag(a, 10.0, &t);
        list.update_drag(118.0, PointerButtons::PRIMARY, &t);
        assert!(list.drag_has_moved());

        // Back over the first slot, the original order is restored
        list.update_drag(5.0, PointerButtons::PRIMARY, &t);
        assert_eq!(list.index_of(a), Some(0));
        assert!(!list.drag_has_moved());
    }

    #[test]
    fn test_rollback_after_many_moves() {
        let mut list = RowList::new();
        let ids: Vec<_> = (0..5).map(|i| list.push(Row::csv(format!("{i}.csv")))).collect();
        layout(&mut list);
        let t = tuning();

        list.begin_drag(ids[1], H + 5.0, &t);
        for y in [200.0, 250.0, 20.0, 120.0, 240.0, 5.0] {
            list.update_drag(y, PointerButtons::PRIMARY, &t);
            layout(&mut list);
        }
        assert_ne!(list.ids(), ids);

        list.end_drag(false);
        assert_eq!(list.ids(), ids);
    }

    #[test]
    fn test_button_lost_mid_drag_cancels() {
        let (mut list, a, b, c) = abc();
        let t = tuning();

        list.begin_drag(a, 10.0, &t);
        list.update_drag(118.0, PointerButtons::PRIMARY, &t);
        assert_eq!(
            list.update_drag(120.0, PointerButtons::NONE, &t),
            DragUpdate::Cancelled
        );
        assert!(!list.is_dragging());
        assert_eq!(list.ids(), vec![a, b, c]);
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let (mut list, a, b, _) = abc();
        let t = tuning();

        assert!(list.begin_drag(a, 10.0, &t));
        assert!(!list.begin_drag(b, 60.0, &t));
        assert!(list.is_row_dragging(a));
        assert!(!list.is_row_dragging(b));
        assert_eq!(list.session().map(|s| s.start_index), Some(0));
    }

    #[test]
    fn test_begin_on_missing_row_is_noop() {
        let (mut list, ..) = abc();
        assert!(!list.begin_drag(RowId(999), 10.0, &tuning()));
        assert!(!list.is_dragging());
    }

    #[test]
    fn test_update_without_session_is_idle() {
        let (mut list, ..) = abc();
        assert_eq!(
            list.update_drag(50.0, PointerButtons::PRIMARY, &tuning()),
            DragUpdate::Idle
        );
        assert_eq!(list.end_drag(true), None);
    }

    #[test]
    fn test_hysteresis_dead_zone() {
        // Grab D at its center so the probe equals the pointer position
        let mut list = RowList::new();
        let d = list.push(Row::csv("D.csv"));
        let x = list.push(Row::csv("X.csv"));
        let y = list.push(Row::csv("Y.csv"));
        layout(&mut list);
        let t = tuning();

        list.begin_drag(d, H * 0.5, &t);

        // Moving down: X's slot is entered 0.15H past its top edge
        list.update_drag(H + H * SNAP_ENTER - 0.5, PointerButtons::PRIMARY, &t);
        layout(&mut list);
        assert_eq!(list.ids(), vec![d, x, y]);

        list.update_drag(H + H * SNAP_ENTER + 0.5, PointerButtons::PRIMARY, &t);
        layout(&mut list);
        assert_eq!(list.ids(), vec![x, d, y]);

        // Jitter inside (0.15H, 0.65H) of X's slot never flips it back
        for probe in [40.0, 60.0, 36.0, 61.0, 45.0] {
            list.update_drag(probe, PointerButtons::PRIMARY, &t);
            layout(&mut list);
            assert_eq!(list.ids(), vec![x, d, y], "flipped at probe {probe}");
        }

        // Moving up only snaps back once the probe passes 0.65H of X
        list.update_drag(H * SNAP_EXIT - 0.5, PointerButtons::PRIMARY, &t);
        layout(&mut list);
        assert_eq!(list.ids(), vec![d, x, y]);
    }

    #[test]
    fn test_compute_target_index_thresholds() {
        // D dragged, X at 0 and Y at H
        let mut list = RowList::new();
        let d = list.push(Row::csv("D.csv"));
        let x = list.push(Row::csv("X.csv"));
        let y = list.push(Row::csv("Y.csv"));
        list.set_row_top(x, 0.0);
        list.set_row_top(y, H);
        list.set_row_top(d, 2.0 * H);
        let t = tuning();

        let enter_line = H + H * SNAP_ENTER;
        let exit_line = H + H * SNAP_EXIT;

        assert_eq!(list.compute_target_index(enter_line - 0.1, d, 1.0, &t), Some(1));
        assert_eq!(list.compute_target_index(enter_line + 0.1, d, 1.0, &t), Some(2));
        assert_eq!(list.compute_target_index(exit_line - 0.1, d, -1.0, &t), Some(1));
        assert_eq!(list.compute_target_index(exit_line + 0.1, d, -1.0, &t), Some(2));
        // Zero movement counts as downward
        assert_eq!(list.compute_target_index(enter_line + 0.1, d, 0.0, &t), Some(2));
    }

    #[test]
    fn test_compute_target_index_estimates_unknown_positions() {
        let mut list = RowList::new();
        let d = list.push(Row::csv("D.csv"));
        list.push(Row::csv("X.csv"));
        list.push(Row::csv("Y.csv"));
        let t = tuning();

        // No layout yet: others estimated at 0 and H
        assert_eq!(list.compute_target_index(5.0, d, 1.0, &t), Some(0));
        assert_eq!(list.compute_target_index(H + 10.0, d, 1.0, &t), Some(2));
    }

    #[test]
    fn test_compute_target_index_single_row() {
        let mut list = RowList::new();
        let d = list.push(Row::csv("D.csv"));
        assert_eq!(list.compute_target_index(500.0, d, 1.0, &tuning()), Some(0));
        assert_eq!(list.compute_target_index(0.0, RowId(42), 1.0, &tuning()), None);
    }

    #[test]
    fn test_dragged_row_deleted_mid_drag() {
        let (mut list, a, b, c) = abc();
        let t = tuning();

        list.begin_drag(a, 10.0, &t);
        list.remove(a);
        assert_eq!(
            list.update_drag(118.0, PointerButtons::PRIMARY, &t),
            DragUpdate::Tracked
        );
        assert!(!list.reorder_dragged_row(a, 1));

        assert_eq!(list.end_drag(true), Some(DragEnd::Committed));
        assert_eq!(list.ids(), vec![b, c]);
        assert_eq!(orders(&list), vec![(b, 0), (c, 1)]);
    }

    #[test]
    fn test_rollback_keeps_rows_added_during_drag() {
        let (mut list, a, b, c) = abc();
        let t = tuning();

        list.begin_drag(a, 10.0, &t);
        list.update_drag(118.0, PointerButtons::PRIMARY, &t);
        let d = list.push(Row::extra("late"));
        list.remove(b);

        list.end_drag(false);
        assert_eq!(list.ids(), vec![a, c, d]);
        assert_eq!(orders(&list), vec![(a, 0), (c, 1), (d, 2)]);
    }

    #[test]
    fn test_commit_renumbers_every_row() {
        let mut list = RowList::new();
        let ids: Vec<_> = (0..4).map(|i| list.push(Row::csv(format!("{i}.csv")))).collect();
        layout(&mut list);
        let t = tuning();

        list.begin_drag(ids[3], 3.0 * H + 1.0, &t);
        list.update_drag(1.0, PointerButtons::PRIMARY, &t);
        list.end_drag(true);

        assert_eq!(list.ids()[0], ids[3]);
        for (i, entry) in list.entries().iter().enumerate() {
            assert_eq!(entry.order, i);
        }
    }

    #[test]
    fn test_ghost_tracks_grab_point() {
        let (mut list, a, ..) = abc();
        let t = tuning();
        list.set_row_top(a, 4.0);

        list.begin_drag(a, 10.0, &t);
        list.update_drag(30.0, PointerButtons::PRIMARY, &t);
        assert_eq!(list.session().map(|s| s.ghost_y), Some(24.0));
    }

    #[test]
    fn test_registry_single_owner() {
        let mut registry = DragRegistry::new();
        assert!(registry.claim(DeckId(1)));
        assert!(!registry.claim(DeckId(2)));
        registry.release(DeckId(2));
        assert_eq!(registry.owner(), Some(DeckId(1)));
        registry.release(DeckId(1));
        assert!(!registry.is_active());
    }
}
