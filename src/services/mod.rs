//! Services behind the deck UI
//!
//! This module contains the filesystem-facing pieces of the app:
//! - Prompt library listing, parsing and caching
//! - Importing files into the library
//! - Prompt composition
//! - Content search over prompt files
//! - Wildcard discovery and insertion
//! - Model preview lookup

pub mod compose;
pub mod import;
pub mod library;
pub mod preview;
pub mod search;
pub mod wildcard;

pub use compose::{compose, Composition};
pub use import::{import_file, ConflictChoice, ConflictMode, ImportOutcome};
pub use library::{LibraryError, PromptFile, PromptLibrary};
pub use preview::{find_preview, list_models, Preview, PreviewError};
pub use search::{search_rows, FileHits, SearchSelections};
pub use wildcard::{find_wildcards, insert_wildcard, WildcardSet};
