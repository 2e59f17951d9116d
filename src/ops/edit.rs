//! Creating and editing entries through an external editor.
//!
//! Edits never touch an entry file until the edited text parses. The editor
//! works on hidden working files in the journal directory; once every file
//! validates they are renamed over their targets. When the user gives up, the
//! working files stay behind so nothing typed is lost.

use crate::constants::EDIT_WORKING_SUFFIX;
use crate::editor::Editor;
use crate::errors::{AppError, AppResult};
use crate::journal_core::entry::{Entry, ParseMode};
use crate::journal_core::filter::FilterSettings;
use crate::journal_core::time_filter::Clock;
use crate::journal_io::{Journal, MalformedEntry};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Asks the user whether to reopen the editor after a validation failure.
pub trait RetryPrompt {
    /// Shows `failure` and returns `true` to edit again, `false` to give up.
    fn retry(&mut self, failure: &str) -> bool;
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl RetryPrompt for StdinPrompt {
    fn retry(&mut self, failure: &str) -> bool {
        let stdin = io::stdin();
        ask_retry(&mut stdin.lock(), &mut io::stderr(), failure)
    }
}

/// Reads one answer: an empty line or `y` means retry; `q`, `n` or end of
/// input means cancel. Anything else asks again.
pub fn ask_retry(input: &mut impl BufRead, output: &mut impl Write, failure: &str) -> bool {
    loop {
        // A broken terminal is treated the same as end of input.
        if write!(
            output,
            "{}\nPress Enter to edit again, or q to cancel: ",
            failure
        )
        .and_then(|_| output.flush())
        .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match input.read_line(&mut answer) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }

        match answer.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return true,
            "q" | "n" | "no" => return false,
            _ => {
                if writeln!(output, "Please answer Enter or q.").is_err() {
                    return false;
                }
            }
        }
    }
}

/// Result of an edit session over existing entries.
#[derive(Debug, Default)]
pub struct EditOutcome {
    /// Entry files that were rewritten.
    pub saved: Vec<PathBuf>,
    /// Files skipped because they no longer parse.
    pub malformed: Vec<MalformedEntry>,
}

struct WorkingFile {
    identifier: String,
    path: PathBuf,
}

/// Opens the editor on the working files until they all parse, or the user
/// gives up.
fn edit_until_valid(
    editor: &dyn Editor,
    prompt: &mut dyn RetryPrompt,
    files: &[WorkingFile],
) -> AppResult<()> {
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();

    loop {
        if let Err(e) = editor.open_files(&paths) {
            warn!(files = paths.len(), "Editor failed, working files kept");
            return Err(e);
        }

        let mut failures = Vec::new();
        for file in files {
            let content = fs::read(&file.path)?;
            if let Err(error) = Entry::parse(&content, &file.identifier, ParseMode::Full) {
                failures.push(format!("{}: {}", file.path.display(), error));
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        debug!(failed = failures.len(), "Edited entries failed to parse");
        if !prompt.retry(&failures.join("\n")) {
            info!(files = paths.len(), "Edit cancelled");
            return Err(AppError::Cancelled { preserved: paths });
        }
    }
}

fn create_working_file(journal: &Journal, name: &str, content: &[u8]) -> AppResult<PathBuf> {
    journal.create_working_file(name, content).map_err(|e| match e {
        AppError::Io(err) if err.kind() == io::ErrorKind::AlreadyExists => AppError::Journal(
            format!(
                "Working file {} already exists; recover or remove it first",
                journal.dir().join(format!(".{}", name)).display()
            ),
        ),
        other => other,
    })
}

/// Copies an entry into its `.edit` working file.
fn working_copy(journal: &Journal, identifier: &str) -> AppResult<WorkingFile> {
    let original = fs::read(journal.entry_path(identifier))?;
    let name = format!("{}{}", identifier, EDIT_WORKING_SUFFIX);
    let path = create_working_file(journal, &name, &original)?;
    Ok(WorkingFile {
        identifier: identifier.to_string(),
        path,
    })
}

/// Removes working files created by a session that never reached the editor.
fn discard(files: &[WorkingFile]) {
    for file in files {
        if let Err(e) = fs::remove_file(&file.path) {
            debug!(path = %file.path.display(), error = %e, "Could not remove working file");
        }
    }
}

/// Writes a new entry with the editor.
///
/// The entry is named after the current time. Returns the path of the saved
/// entry, or `None` if the editor left the file empty, in which case nothing
/// is kept.
///
/// # Errors
///
/// Returns `AppError::Cancelled` if the user gives up after a parse failure,
/// or the editor's error if it fails. The working file is kept in both cases.
pub fn new_entry(
    journal: &Journal,
    editor: &dyn Editor,
    prompt: &mut dyn RetryPrompt,
    clock: &dyn Clock,
) -> AppResult<Option<PathBuf>> {
    let identifier = Journal::new_identifier(clock.now());
    let working = create_working_file(journal, &identifier, b"")?;
    debug!(identifier = %identifier, "Starting new entry");

    let files = [WorkingFile {
        identifier: identifier.clone(),
        path: working.clone(),
    }];

    // An untouched file means the user changed their mind.
    editor.open_files(std::slice::from_ref(&working))?;
    if fs::metadata(&working)?.len() == 0 {
        fs::remove_file(&working)?;
        info!("Empty entry discarded");
        return Ok(None);
    }

    let content = fs::read(&working)?;
    if let Err(error) = Entry::parse(&content, &identifier, ParseMode::Full) {
        if !prompt.retry(&format!("{}: {}", working.display(), error)) {
            return Err(AppError::Cancelled {
                preserved: vec![working],
            });
        }
        edit_until_valid(editor, prompt, &files)?;
    }

    let saved = journal.commit(&working, &identifier)?;
    info!(identifier = %identifier, "Saved new entry");
    Ok(Some(saved))
}

/// Edits every entry selected by `settings` in one editor session.
///
/// # Errors
///
/// Returns `AppError::Cancelled` if the user gives up after a parse failure,
/// or the editor's error if it fails; the working files are kept and the
/// original entries are untouched. Returns `AppError::Journal` if a working
/// file from an earlier session is still present; working files created
/// before that point are removed again.
pub fn edit_entries(
    journal: &Journal,
    editor: &dyn Editor,
    prompt: &mut dyn RetryPrompt,
    settings: &FilterSettings,
) -> AppResult<EditOutcome> {
    let collection = journal.collect(settings, false)?;
    if collection.entries.is_empty() {
        info!("No entries matched, nothing to edit");
        return Ok(EditOutcome {
            saved: Vec::new(),
            malformed: collection.malformed,
        });
    }

    let mut files = Vec::with_capacity(collection.entries.len());
    for entry in &collection.entries {
        match working_copy(journal, &entry.identifier) {
            Ok(file) => files.push(file),
            Err(e) => {
                discard(&files);
                return Err(e);
            }
        }
    }

    edit_until_valid(editor, prompt, &files)?;

    let mut saved = Vec::with_capacity(files.len());
    for file in &files {
        saved.push(journal.commit(&file.path, &file.identifier)?);
    }
    info!(count = saved.len(), "Saved edited entries");

    Ok(EditOutcome {
        saved,
        malformed: collection.malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal_core::time_filter::FixedClock;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::io::Cursor;
    use tempfile::tempdir;

    /// Writes scripted contents into the opened files, one script per call.
    struct ScriptedEditor {
        rounds: RefCell<Vec<Vec<&'static str>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedEditor {
        fn new(rounds: Vec<Vec<&'static str>>) -> Self {
            ScriptedEditor {
                rounds: RefCell::new(rounds),
                calls: RefCell::new(0),
            }
        }
    }

    impl Editor for ScriptedEditor {
        fn open_files(&self, paths: &[PathBuf]) -> AppResult<()> {
            *self.calls.borrow_mut() += 1;
            let round = self.rounds.borrow_mut().remove(0);
            for (path, content) in paths.iter().zip(round) {
                fs::write(path, content)?;
            }
            Ok(())
        }
    }

    struct FailingEditor;

    impl Editor for FailingEditor {
        fn open_files(&self, _paths: &[PathBuf]) -> AppResult<()> {
            Err(crate::errors::EditorError::NonZeroExit {
                command: "broken".to_string(),
                status_code: 2,
            }
            .into())
        }
    }

    struct Answers(Vec<bool>);

    impl RetryPrompt for Answers {
        fn retry(&mut self, _failure: &str) -> bool {
            if self.0.is_empty() {
                false
            } else {
                self.0.remove(0)
            }
        }
    }

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2017, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn hidden_files(journal: &Journal) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(journal.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with('.'))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_entry_saved() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec!["Title\n@tag\n\nBody\n"]]);

        let saved = new_entry(&journal, &editor, &mut Answers(vec![]), &clock())
            .unwrap()
            .unwrap();

        let name = saved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("20170101_120000-"));
        assert_eq!(fs::read_to_string(&saved).unwrap(), "Title\n@tag\n\nBody\n");
        assert!(hidden_files(&journal).is_empty());
    }

    #[test]
    fn test_new_entry_retry_then_save() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec!["Title\nbogus\n"], vec!["Title\n@ok\n"]]);

        let saved = new_entry(&journal, &editor, &mut Answers(vec![true]), &clock()).unwrap();
        assert!(saved.is_some());
        assert_eq!(*editor.calls.borrow(), 2);
        assert_eq!(journal.entry_files().unwrap().len(), 1);
    }

    #[test]
    fn test_new_entry_cancel_preserves_working_file() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec!["   \nbody"]]);

        match new_entry(&journal, &editor, &mut Answers(vec![false]), &clock()) {
            Err(AppError::Cancelled { preserved }) => {
                assert_eq!(preserved.len(), 1);
                assert_eq!(fs::read_to_string(&preserved[0]).unwrap(), "   \nbody");
            }
            other => panic!("Expected Cancelled, got {:?}", other),
        }
        assert!(journal.entry_files().unwrap().is_empty());
        assert_eq!(hidden_files(&journal).len(), 1);
    }

    #[test]
    fn test_new_entry_empty_is_discarded() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec![""]]);

        let saved = new_entry(&journal, &editor, &mut Answers(vec![]), &clock()).unwrap();
        assert!(saved.is_none());
        assert!(hidden_files(&journal).is_empty());
        assert!(journal.entry_files().unwrap().is_empty());
    }

    #[test]
    fn test_new_entry_editor_failure_keeps_file() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();

        let result = new_entry(&journal, &FailingEditor, &mut Answers(vec![]), &clock());
        assert!(matches!(result, Err(AppError::Editor(_))));
        assert_eq!(hidden_files(&journal).len(), 1);
    }

    #[test]
    fn test_edit_entries_rewrites_matches() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("20170101_120000-a.txt"), "One\n@x\n\nA").unwrap();
        fs::write(temp_dir.path().join("20170102_120000-b.txt"), "Two\n\nB").unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec!["One edited\n@x\n\nA2"]]);

        let outcome = edit_entries(
            &journal,
            &editor,
            &mut Answers(vec![]),
            &FilterSettings::new().with_tags(["x"]),
        )
        .unwrap();

        assert_eq!(outcome.saved.len(), 1);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("20170101_120000-a.txt")).unwrap(),
            "One edited\n@x\n\nA2"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("20170102_120000-b.txt")).unwrap(),
            "Two\n\nB"
        );
        assert!(hidden_files(&journal).is_empty());
    }

    #[test]
    fn test_edit_entries_cancel_leaves_originals() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("20170101_120000-a.txt"), "One\n\nA").unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![vec!["One\nbroken attr\nA"]]);

        let result = edit_entries(
            &journal,
            &editor,
            &mut Answers(vec![false]),
            &FilterSettings::new(),
        );
        match result {
            Err(AppError::Cancelled { preserved }) => {
                assert_eq!(preserved.len(), 1);
                assert!(preserved[0]
                    .to_string_lossy()
                    .ends_with(".20170101_120000-a.txt.edit"));
            }
            other => panic!("Expected Cancelled, got {:?}", other),
        }
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("20170101_120000-a.txt")).unwrap(),
            "One\n\nA"
        );

        // A leftover working file blocks the next session.
        let editor = ScriptedEditor::new(vec![vec!["One\n\nA"]]);
        let result = edit_entries(
            &journal,
            &editor,
            &mut Answers(vec![]),
            &FilterSettings::new(),
        );
        assert!(matches!(result, Err(AppError::Journal(_))));
    }

    #[test]
    fn test_edit_entries_setup_failure_removes_new_working_files() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("20170101_120000-a.txt"), "One\n\nA").unwrap();
        fs::write(temp_dir.path().join("20170102_120000-b.txt"), "Two\n\nB").unwrap();
        fs::write(temp_dir.path().join(".20170102_120000-b.txt.edit"), "stale").unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![]);

        let result = edit_entries(
            &journal,
            &editor,
            &mut Answers(vec![]),
            &FilterSettings::new(),
        );
        match result {
            Err(AppError::Journal(msg)) => assert!(msg.contains(".20170102_120000-b.txt.edit")),
            other => panic!("Expected Journal error, got {:?}", other),
        }
        assert_eq!(*editor.calls.borrow(), 0);
        assert_eq!(hidden_files(&journal), vec![".20170102_120000-b.txt.edit"]);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(".20170102_120000-b.txt.edit")).unwrap(),
            "stale"
        );
    }

    #[test]
    fn test_edit_entries_nothing_matched() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let editor = ScriptedEditor::new(vec![]);

        let outcome = edit_entries(
            &journal,
            &editor,
            &mut Answers(vec![]),
            &FilterSettings::new(),
        )
        .unwrap();
        assert!(outcome.saved.is_empty());
        assert_eq!(*editor.calls.borrow(), 0);
    }

    #[test]
    fn test_ask_retry_answers() {
        let mut out = Vec::new();
        assert!(ask_retry(&mut Cursor::new("\n"), &mut out, "bad"));
        assert!(ask_retry(&mut Cursor::new("y\n"), &mut out, "bad"));
        assert!(!ask_retry(&mut Cursor::new("q\n"), &mut out, "bad"));
        assert!(!ask_retry(&mut Cursor::new(""), &mut out, "bad"));
        assert!(ask_retry(&mut Cursor::new("what\n\n"), &mut out, "bad"));

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("bad\nPress Enter to edit again"));
        assert!(shown.contains("Please answer Enter or q."));
    }

    /// Accepts the prompt but fails on the reminder line.
    struct ClosedAfterPrompt;

    impl Write for ClosedAfterPrompt {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.starts_with(b"Please answer") {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_ask_retry_cancels_when_reminder_cannot_be_written() {
        assert!(!ask_retry(
            &mut Cursor::new("what\n\n"),
            &mut ClosedAfterPrompt,
            "bad"
        ));
    }
}
