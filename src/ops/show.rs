//! Listing entries.

use crate::errors::AppResult;
use crate::format::Formatter;
use crate::journal_core::filter::FilterSettings;
use crate::journal_io::{Journal, MalformedEntry};
use tracing::info;

/// How matching entries are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Header and body of every entry.
    #[default]
    Full,
    /// Headers only; bodies are not parsed.
    List,
    /// Structured records.
    Json,
    /// Structured records without bodies.
    JsonList,
}

impl View {
    pub fn new(json: bool, list: bool) -> Self {
        match (json, list) {
            (false, false) => View::Full,
            (false, true) => View::List,
            (true, false) => View::Json,
            (true, true) => View::JsonList,
        }
    }

    fn include_bodies(self) -> bool {
        matches!(self, View::Full | View::Json)
    }

    fn is_json(self) -> bool {
        matches!(self, View::Json | View::JsonList)
    }
}

/// Rendered output of a listing, plus any files that failed to parse.
#[derive(Debug)]
pub struct Listing {
    /// Text to write to stdout. Empty when nothing matched in a text view.
    pub output: String,
    pub matched: usize,
    pub malformed: Vec<MalformedEntry>,
}

/// Collects the entries selected by `settings` and renders them.
///
/// Text views separate entries with a blank line and end with a newline.
///
/// # Errors
///
/// Returns an error if the journal cannot be read or JSON serialization fails.
/// Malformed entry files are not errors here; they are returned in
/// `Listing::malformed`.
pub fn show_entries(
    journal: &Journal,
    formatter: &Formatter,
    settings: &FilterSettings,
    view: View,
) -> AppResult<Listing> {
    let collection = journal.collect(settings, view.include_bodies())?;
    info!(
        matched = collection.entries.len(),
        malformed = collection.malformed.len(),
        "Collected entries"
    );

    let output = if view.is_json() {
        let mut json = formatter.render_json(&collection.entries)?;
        json.push('\n');
        json
    } else {
        let blocks: Vec<String> = collection
            .entries
            .iter()
            .map(|entry| formatter.render(entry))
            .collect();
        let mut text = blocks.join("\n\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    };

    Ok(Listing {
        output,
        matched: collection.entries.len(),
        malformed: collection.malformed,
    })
}
