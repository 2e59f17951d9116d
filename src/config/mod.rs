//! Configuration management for the j application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. Configuration is read once at startup and passed
//! explicitly to the operations that need it.
//!
//! # Environment Variables
//!
//! - `J_JOURNAL_DIR`: Path to the journal directory (required)
//! - `J_EDITOR`: Editor to use for journal entries
//! - `EDITOR`: Fallback editor if J_EDITOR is not set (defaults to "vi")
//! - `J_WRAP`: Body wrap column; zero or negative shows bodies verbatim (defaults to 78)
//! - `J_RULE_WIDTH`: Width of the rule above each entry (defaults to 78)
//! - `J_CASE_SENSITIVE`: `1`, `true` or `yes` makes text filters case sensitive
//! - `J_TIME_FILTER`: Time filter applied when none is given on the command line

use crate::constants::{
    DEFAULT_EDITOR_COMMAND, DEFAULT_RULE_WIDTH, DEFAULT_WRAP_COLUMN, EDITOR_FORBIDDEN_CHARS,
    ENV_VAR_CASE_SENSITIVE, ENV_VAR_EDITOR, ENV_VAR_JOURNAL_DIR, ENV_VAR_J_EDITOR,
    ENV_VAR_RULE_WIDTH, ENV_VAR_TIME_FILTER, ENV_VAR_WRAP,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the j application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use j::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     journal_dir: PathBuf::from("/path/to/journal"),
///     editor: "nano".to_string(),
///     ..Config::default()
/// };
/// assert_eq!(config.wrap_column, 78);
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use j::Config;
/// use std::env;
///
/// env::set_var("J_EDITOR", "code");
/// env::set_var("J_JOURNAL_DIR", "/custom/journal/path");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.editor, "code");
/// ```
#[derive(Clone)]
pub struct Config {
    /// Directory where journal entries are stored.
    pub journal_dir: PathBuf,

    /// Editor command to use for opening journal entries.
    ///
    /// This is loaded from environment variables in the following order of precedence:
    /// 1. J_EDITOR
    /// 2. EDITOR
    /// 3. Defaults to "vi" if neither is set
    pub editor: String,

    /// Column entry bodies are wrapped at. Zero or negative disables wrapping.
    pub wrap_column: i32,

    /// Width of the rule printed above each entry.
    pub rule_width: usize,

    /// Whether text filters compare case sensitively by default.
    pub case_sensitive: bool,

    /// Time filter expression used when none is given on the command line.
    pub time_filter: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("journal_dir", &"[REDACTED_PATH]")
            .field("editor", &"[REDACTED_COMMAND]")
            .field("wrap_column", &self.wrap_column)
            .field("rule_width", &self.rule_width)
            .field("case_sensitive", &self.case_sensitive)
            .field("time_filter", &self.time_filter)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            journal_dir: PathBuf::from(""),
            editor: DEFAULT_EDITOR_COMMAND.to_string(),
            wrap_column: DEFAULT_WRAP_COLUMN,
            rule_width: DEFAULT_RULE_WIDTH,
            case_sensitive: false,
            time_filter: None,
        }
    }
}

/// Reads a variable, treating an empty value as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::Config(format!("{} must be an integer, got '{}'", name, raw))
        }),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl Config {
    /// Validates an editor command string for security.
    ///
    /// This function checks that the editor command:
    /// - Is not empty
    /// - Contains no shell metacharacters
    /// - Contains no spaces
    fn validate_editor_command(editor_cmd: &str) -> AppResult<&str> {
        if editor_cmd.is_empty() {
            return Err(AppError::Config(
                "Editor command cannot be empty".to_string(),
            ));
        }

        if editor_cmd.contains(' ') {
            return Err(AppError::Config(
                "Editor command cannot contain spaces. Use a wrapper script or shell alias for editors requiring arguments".to_string(),
            ));
        }

        if let Some(ch) = editor_cmd.chars().find(|c| EDITOR_FORBIDDEN_CHARS.contains(c)) {
            return Err(AppError::Config(format!(
                "Editor command cannot contain shell metacharacters: '{}'. Use a wrapper script or shell alias instead",
                ch
            )));
        }

        Ok(editor_cmd)
    }

    /// Loads configuration from environment variables.
    ///
    /// The journal directory path is expanded with `shellexpand`, so `~` and
    /// environment variable references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - `J_JOURNAL_DIR` is unset or empty
    /// - The journal directory path expansion fails
    /// - `J_WRAP` or `J_RULE_WIDTH` is not an integer
    pub fn load() -> AppResult<Self> {
        let journal_dir_str = non_empty_var(ENV_VAR_JOURNAL_DIR)
            .ok_or_else(|| AppError::Config(format!("Please set {}", ENV_VAR_JOURNAL_DIR)))?;

        let expanded_path = shellexpand::full(&journal_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let journal_dir = PathBuf::from(expanded_path.into_owned());

        let editor = non_empty_var(ENV_VAR_J_EDITOR)
            .or_else(|| non_empty_var(ENV_VAR_EDITOR))
            .unwrap_or_else(|| DEFAULT_EDITOR_COMMAND.to_string());

        let config = Config {
            journal_dir,
            editor,
            wrap_column: parse_var(ENV_VAR_WRAP, DEFAULT_WRAP_COLUMN)?,
            rule_width: parse_var(ENV_VAR_RULE_WIDTH, DEFAULT_RULE_WIDTH)?,
            case_sensitive: non_empty_var(ENV_VAR_CASE_SENSITIVE)
                .map_or(false, |raw| parse_flag(&raw)),
            time_filter: non_empty_var(ENV_VAR_TIME_FILTER),
        };

        Ok(config)
    }

    /// The editor command, checked for use with `std::process::Command`.
    ///
    /// Only commands that launch the editor call this, so listing entries works
    /// with any `EDITOR` value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the command is empty or contains spaces or
    /// shell metacharacters.
    pub fn editor_command(&self) -> AppResult<&str> {
        Config::validate_editor_command(&self.editor)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Journal directory path is empty" if the journal directory path is empty
    /// - "Editor command is empty" if the editor is empty
    /// - "Journal directory must be an absolute path" if the path is relative
    ///
    /// # Examples
    ///
    /// ```
    /// use j::Config;
    /// use std::path::PathBuf;
    ///
    /// let valid_config = Config {
    ///     journal_dir: PathBuf::from("/absolute/path"),
    ///     ..Config::default()
    /// };
    /// assert!(valid_config.validate().is_ok());
    ///
    /// let invalid_config = Config {
    ///     journal_dir: PathBuf::from("/absolute/path"),
    ///     editor: "".to_string(),
    ///     ..Config::default()
    /// };
    /// assert!(invalid_config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.journal_dir.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Journal directory path is empty".to_string(),
            ));
        }

        if self.editor.is_empty() {
            return Err(AppError::Config("Editor command is empty".to_string()));
        }

        if !self.journal_dir.is_absolute() {
            return Err(AppError::Config(
                "Journal directory must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}
