//! Model layer - decks, rows and the drag engine
//!
//! - `RowList` / `Row` - ordered rows of a deck
//! - `drag` - pointer-driven reorder with hysteresis and rollback
//! - `Deck` / `Workspace` - prompt builders and their persistence
//! - `ModalStack` - modal overlay management

pub mod deck;
pub mod drag;
pub mod modal;
pub mod row;
pub mod workspace;

pub use deck::{Deck, DeckId, SeedControl};
pub use drag::{DragEnd, DragRegistry, DragTuning, DragUpdate, PointerButtons};
pub use modal::{Modal, ModalStack, TextTarget};
pub use row::{CsvRow, Row, RowEntry, RowId, RowList, NONE_KEY, RANDOM_KEY};
pub use workspace::Workspace;
