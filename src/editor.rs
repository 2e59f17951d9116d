//! Editor abstraction for opening journal files.
//!
//! This module provides an abstraction for opening files in an external editor,
//! allowing the application to work with different editors and to be testable
//! by mocking the editor functionality.

use crate::errors::{AppResult, EditorError};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Trait defining the interface for an editor component.
///
/// # Examples
///
/// ```
/// use j::editor::Editor;
/// use j::errors::AppResult;
/// use std::path::PathBuf;
///
/// struct DummyEditor;
///
/// impl Editor for DummyEditor {
///     fn open_files(&self, paths: &[PathBuf]) -> AppResult<()> {
///         println!("Would open files: {:?}", paths);
///         Ok(())
///     }
/// }
///
/// let editor = DummyEditor;
/// editor.open_files(&[PathBuf::from("entry.txt")]).unwrap();
/// ```
pub trait Editor {
    /// Opens one or more files in the editor, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Different implementations may return different errors when file opening fails.
    fn open_files(&self, paths: &[PathBuf]) -> AppResult<()>;
}

/// Launches a system command with the files as arguments.
///
/// # Examples
///
/// ```no_run
/// use j::editor::{Editor, SystemEditor};
/// use std::path::PathBuf;
///
/// let editor = SystemEditor {
///     editor_cmd: "vim".to_string(),
/// };
/// editor.open_files(&[PathBuf::from(".20170101_120000-xxxxxxxx.txt")]).expect("Failed to open files");
/// ```
#[derive(Debug, Clone)]
pub struct SystemEditor {
    /// The command to use for opening files (e.g., "vim", "code", "nano").
    pub editor_cmd: String,
}

impl Editor for SystemEditor {
    /// Runs the editor and waits for it.
    ///
    /// If the list of paths is empty, the method returns immediately with Ok(()).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Editor` with a specific `EditorError` variant depending on what went wrong:
    /// - `EditorError::CommandNotFound` if the editor command doesn't exist
    /// - `EditorError::PermissionDenied` if permission is denied to execute the editor
    /// - `EditorError::ExecutionFailed` for other I/O errors during execution
    /// - `EditorError::NonZeroExit` if the editor exits with a non-zero status code
    fn open_files(&self, paths: &[PathBuf]) -> AppResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        debug!(
            editor = %self.editor_cmd,
            files = paths.len(),
            "Launching editor"
        );
        let command = self.editor_cmd.clone();

        match Command::new(&self.editor_cmd).args(paths).status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(EditorError::NonZeroExit {
                command,
                status_code: status.code().unwrap_or(-1),
            }
            .into()),
            Err(e) => {
                let specific_error = match e.kind() {
                    std::io::ErrorKind::NotFound => EditorError::CommandNotFound { command, source: e },
                    std::io::ErrorKind::PermissionDenied => {
                        EditorError::PermissionDenied { command, source: e }
                    }
                    _ => EditorError::ExecutionFailed { command, source: e },
                };
                Err(specific_error.into())
            }
        }
    }
}
