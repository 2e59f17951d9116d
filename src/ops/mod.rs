//! User-facing journal operations.
//!
//! These orchestrate the journal store, the formatter and the editor for the
//! CLI commands: listing entries, writing a new one, and editing existing ones.

pub mod edit;
pub mod show;

pub use edit::{edit_entries, new_entry, EditOutcome, RetryPrompt, StdinPrompt};
pub use show::{show_entries, Listing, View};
