/*!
# j

j is a plain-text journal kept in a directory of timestamped files. Each entry
is one file: a title line, an optional line of `@tags` and flags, a blank line,
then free-form text.

## Core Features

- Write new entries in your own editor, validated before they are saved
- List entries filtered by tag, text, time range or identifier
- Reflow entry bodies for display while keeping lists, links, headings and
  fenced blocks intact
- Emit entries as JSON for scripting

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `journal_core`: Parsing, reflowing and filtering, free of I/O
- `journal_io`: The journal directory and entry files
- `format`: Rendering entries as text or JSON
- `editor`: Launching the external editor
- `ops`: The show, new and edit workflows

## Usage Example

```rust,no_run
use j::format::Formatter;
use j::journal_core::FilterSettings;
use j::journal_io::Journal;
use j::ops::{show_entries, View};
use j::Config;

fn main() -> j::AppResult<()> {
    let config = Config::load()?;
    let journal = Journal::open(&config.journal_dir)?;

    let settings = FilterSettings::new().with_tags(["work"]);
    let listing = show_entries(&journal, &Formatter::default(), &settings, View::Full)?;
    print!("{}", listing.output);
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// External editor abstraction
pub mod editor;
/// Error types and utilities for error handling
pub mod errors;
/// Rendering entries for display
pub mod format;
/// Entry parsing, body reflow and filtering
pub mod journal_core;
/// Journal directory access
pub mod journal_io;
/// High-level journal operations
pub mod ops;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use journal_core::{Entry, FilterSettings, TimeFilter};
pub use journal_io::Journal;
