//! Error handling utilities for the j application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//! Entry parsing and time filter parsing have their own error types so the core
//! logic can report precise reasons without depending on I/O.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons an entry file fails to parse.
///
/// Every variant is attributable to exactly one file; callers attach the path
/// through [`AppError::Parse`] or a collection's malformed list.
///
/// # Examples
///
/// ```
/// use j::errors::ParseError;
///
/// let error = ParseError::UnknownAttribute("zzz".to_string());
/// assert_eq!(format!("{}", error), "unknown attribute zzz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The filename does not start with a `YYYYMMDD_HHMMSS` prefix and separator.
    #[error("bad timestamp in filename '{identifier}'")]
    BadTimestamp {
        /// The offending filename
        identifier: String,
    },

    /// The file content is not valid UTF-8.
    #[error("entry is not valid UTF-8")]
    Encoding,

    /// The file ended before a title line was read.
    #[error("unexpected end of file")]
    UnexpectedEndOfFile,

    /// The title line is empty or only whitespace.
    #[error("whitespace title")]
    WhitespaceTitle,

    /// An attribute line token is neither a tag nor a known flag.
    #[error("unknown attribute {0}")]
    UnknownAttribute(String),

    /// The attribute line is followed by a non-empty line.
    #[error("expected blank line after header")]
    ExpectedBlankLine,
}

/// Errors produced while parsing a time filter expression.
///
/// These are user input errors and are never retried automatically.
///
/// # Examples
///
/// ```
/// use j::errors::TimeFilterError;
///
/// let error = TimeFilterError::StartAfterStop;
/// assert!(format!("{}", error).contains("start later than stop"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFilterError {
    /// The expression has more than one `:` separator.
    #[error("time filter '{0}' has too many parts, expected start[:stop]")]
    TooManyParts(String),

    /// A part matches neither the relative nor any absolute format.
    #[error("cannot understand time '{0}', expected e.g. 3d, 2w, 2024-01 or 2024-01-15-09-30")]
    BadPart(String),

    /// Both ends resolved and the start lies after the stop.
    #[error("bad time filter: start later than stop")]
    StartAfterStop,
}

/// Represents specific error cases that can occur when interacting with external editors.
///
/// This enum provides detailed, contextual error information for different failure modes
/// when launching or interacting with external text editors. Each variant captures
/// relevant information such as the editor command and underlying IO errors.
///
/// # Examples
///
/// Creating and formatting a command not found error:
///
/// ```
/// use j::errors::EditorError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "command not found");
/// let error = EditorError::CommandNotFound {
///     command: "vim".to_string(),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("not found"));
/// assert!(format!("{}", error).contains("vim"));
/// ```
///
/// Creating a non-zero exit code error:
///
/// ```
/// use j::errors::EditorError;
///
/// let error = EditorError::NonZeroExit {
///     command: "vim".to_string(),
///     status_code: 1,
/// };
///
/// assert!(format!("{}", error).contains("non-zero status code"));
/// assert!(format!("{}", error).contains("vim"));
/// ```
#[derive(Debug, Error)]
pub enum EditorError {
    /// Error when the specified editor command cannot be found.
    #[error("Editor command '{command}' not found: {source}. Please check that the editor is installed and available in your PATH.")]
    CommandNotFound {
        /// The editor command that was not found
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when permission is denied to execute the editor command.
    #[error("Permission denied when trying to execute editor '{command}': {source}. Please check file permissions or try running with appropriate access rights.")]
    PermissionDenied {
        /// The editor command that had permission denied
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor command fails to execute due to other I/O errors.
    #[error("Failed to execute editor '{command}': {source}. Please check system resources, disk space, or editor installation.")]
    ExecutionFailed {
        /// The editor command that failed to execute
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor exits with a non-zero status code.
    #[error("Editor '{command}' exited with non-zero status code: {status_code}. Your working file has been kept.")]
    NonZeroExit {
        /// The editor command that exited with a non-zero status
        command: String,
        /// The exit status code
        status_code: i32,
    },
}

/// Represents all possible errors that can occur in the j application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. Low-level I/O failures are wrapped here so the
/// CLI boundary can report every failure with a diagnostic and a non-zero status.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use j::errors::AppError;
///
/// let error = AppError::Config("Missing journal directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing journal directory");
/// ```
///
/// Converting from an IO error:
/// ```
/// use j::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors in journal logic (e.g. an unknown entry identifier).
    #[error("Journal logic error: {0}")]
    Journal(String),

    /// Errors when interacting with the text editor.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// A single entry file failed to parse.
    #[error("Malformed entry {}: {source}", .path.display())]
    Parse {
        /// The file that failed to parse
        path: PathBuf,
        /// Why it failed
        #[source]
        source: ParseError,
    },

    /// A time filter expression was rejected.
    #[error("Time filter error: {0}")]
    TimeFilter(#[from] TimeFilterError),

    /// Structured output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A directory scan found entries that do not parse.
    ///
    /// The individual failures are reported before this error is returned.
    #[error("{count} malformed {} in the journal", entries_noun(.count))]
    MalformedEntries {
        /// Number of files that failed to parse
        count: usize,
    },

    /// The user gave up on an edit that did not validate.
    #[error("Edit cancelled; working files kept for recovery: {}", display_paths(.preserved))]
    Cancelled {
        /// Working files left on disk
        preserved: Vec<PathBuf>,
    },
}

fn entries_noun(count: &usize) -> &'static str {
    if *count == 1 {
        "entry"
    } else {
        "entries"
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Attaches a path to a parse error.
    pub fn parse(path: &Path, source: ParseError) -> Self {
        AppError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// This type alias is used throughout the application to represent operations
/// that may fail with an `AppError`.
///
/// # Examples
///
/// ```
/// use j::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Journal("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
