//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod file_picker;
pub mod filter_list;
pub mod help_dialog;
pub mod home;
pub mod import_dialog;
pub mod key_picker;
pub mod layout;
pub mod preview_dialog;
pub mod prompt_highlight;
pub mod quit_dialog;
pub mod search_dialog;
pub mod text_edit_dialog;
pub mod wildcard_dialog;

pub use file_picker::FilePickerDialog;
pub use help_dialog::HelpDialog;
pub use home::{draw_home_screen, HomeComponent, HomeRenderContext};
pub use import_dialog::{ConflictDialog, ImportDialog};
pub use key_picker::KeyPickerDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use preview_dialog::PreviewDialog;
pub use quit_dialog::QuitDialog;
pub use search_dialog::SearchDialog;
pub use text_edit_dialog::TextEditDialog;
pub use wildcard_dialog::WildcardDialog;
