//! Constants used throughout the application.
//!
//! This module contains all constants used in the j application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "j";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A plain-text journal kept in a directory of timestamped files";

// CLI Arguments & Defaults
/// Default command for the editor if not specified otherwise.
pub const DEFAULT_EDITOR_COMMAND: &str = "vi";
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level. Kept quiet so listings are not interleaved with log lines.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the journal directory.
pub const ENV_VAR_JOURNAL_DIR: &str = "J_JOURNAL_DIR";
/// Environment variable for specifying the preferred editor.
pub const ENV_VAR_J_EDITOR: &str = "J_EDITOR";
/// Standard environment variable for specifying the default editor.
pub const ENV_VAR_EDITOR: &str = "EDITOR";
/// Environment variable for the body wrap column (negative disables wrapping).
pub const ENV_VAR_WRAP: &str = "J_WRAP";
/// Environment variable for the width of the rule printed above each entry.
pub const ENV_VAR_RULE_WIDTH: &str = "J_RULE_WIDTH";
/// Environment variable making text filters case sensitive.
pub const ENV_VAR_CASE_SENSITIVE: &str = "J_CASE_SENSITIVE";
/// Environment variable holding the default time filter expression.
pub const ENV_VAR_TIME_FILTER: &str = "J_TIME_FILTER";
/// Environment variable selecting the log output format.
pub const ENV_VAR_LOG_FORMAT: &str = "J_LOG_FORMAT";

// Validation
/// Characters forbidden in editor commands for security reasons.
pub const EDITOR_FORBIDDEN_CHARS: &[char] =
    &['|', '&', ';', '$', '(', ')', '`', '\\', '<', '>', '\'', '"'];

// File System Parameters
/// File extension for journal entries.
pub const ENTRY_FILE_EXTENSION: &str = ".txt";
/// Most lines an entry header spans: title, attributes and separator.
pub const HEADER_MAX_LINES: usize = 3;
/// Suffix appended to the working copy of an entry being re-edited.
pub const EDIT_WORKING_SUFFIX: &str = ".edit";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;

// Entry Format
/// Format of the timestamp prefix every entry filename starts with.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Byte length of the filename timestamp prefix (`YYYYMMDD_HHMMSS`).
pub const FILENAME_TIMESTAMP_LEN: usize = 15;
/// Separator placed between the timestamp prefix and the unique suffix.
pub const FILENAME_SEPARATOR: char = '-';
/// Number of random hex characters in a new entry's filename suffix.
pub const FILENAME_SUFFIX_LEN: usize = 8;
/// Marker that introduces a tag in the attribute line.
pub const TAG_MARKER: char = '@';
/// Attribute token for entries that always pass time filtering.
pub const FLAG_IMMORTAL: &str = "immortal";
/// Older spelling of [`FLAG_IMMORTAL`], still accepted when parsing.
pub const FLAG_IMMORTAL_ALIAS: &str = "sticky";
/// Attribute token for entries whose body is never reflowed.
pub const FLAG_NOWRAP: &str = "nowrap";

// Display
/// Timestamp format used in rendered output and structured records.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Default wrap column for entry bodies.
pub const DEFAULT_WRAP_COLUMN: i32 = 78;
/// Default width of the rule printed above each entry.
pub const DEFAULT_RULE_WIDTH: usize = 78;
/// Character the entry rule is drawn with.
pub const RULE_CHAR: char = '=';
/// Character headings are underlined with.
pub const HEADING_UNDERLINE_CHAR: char = '-';
/// Line emitted where a fenced block opens.
pub const FENCE_OPEN_LINE: &str = "/";
/// Line emitted where a fenced block closes.
pub const FENCE_CLOSE_LINE: &str = "\\";
/// Prefix for every line inside a fenced block.
pub const FENCE_LINE_PREFIX: &str = "| ";
/// Source marker that opens and closes a fenced block.
pub const FENCE_MARKER: &str = "```";

// Date/Time Logic
/// Days counted as one month in relative time filters.
pub const DAYS_PER_MONTH: i64 = 31;
/// Days counted as one year in relative time filters.
pub const DAYS_PER_YEAR: i64 = 365;

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "j";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
