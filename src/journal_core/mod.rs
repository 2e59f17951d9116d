//! Core journal logic with no I/O.
//!
//! Parsing entry files, reflowing bodies and selecting entries are pure
//! functions of their inputs. Filesystem access lives in `journal_io` and
//! user interaction in `ops`.

pub mod entry;
pub mod filter;
pub mod reflow;
pub mod time_filter;

pub use entry::{AttributeToken, Entry, Flag, ParseMode};
pub use filter::FilterSettings;
pub use reflow::format_body;
pub use time_filter::{Clock, FixedClock, SystemClock, TimeFilter};
