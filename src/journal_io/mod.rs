//! Journal directory access.
//!
//! A journal is a flat directory of entry files. This module owns everything
//! that touches that directory: creating it, listing and reading entries,
//! scanning with filters, and the hidden working files used while editing.

use crate::constants::{
    ENTRY_FILE_EXTENSION, FILENAME_SEPARATOR, FILENAME_SUFFIX_LEN, FILENAME_TIMESTAMP_FORMAT,
    HEADER_MAX_LINES,
};
use crate::errors::{AppError, AppResult, ParseError};
use crate::journal_core::entry::{Entry, ParseMode};
use crate::journal_core::filter::FilterSettings;
use chrono::NaiveDateTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

/// An entry file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    pub path: PathBuf,
    pub error: ParseError,
}

impl MalformedEntry {
    /// Converts the failure into an application error carrying its path.
    pub fn into_error(self) -> AppError {
        AppError::parse(&self.path, self.error)
    }
}

/// The result of scanning a journal with a filter.
#[derive(Debug, Default)]
pub struct Collection {
    /// Matching entries, ordered by timestamp then identifier.
    pub entries: Vec<Entry>,
    /// Files that failed to parse. The scan continues past them.
    pub malformed: Vec<MalformedEntry>,
}

/// A journal rooted at one directory.
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    /// Opens the journal at `dir`, creating the directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `AppError::Journal` if the provided path is not an absolute path
    /// - `AppError::Io` if the directory cannot be created or secured
    pub fn open(dir: &Path) -> AppResult<Self> {
        if !dir.is_absolute() {
            return Err(AppError::Journal(format!(
                "Journal directory path must be absolute: {}",
                dir.display()
            )));
        }

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create journal directory: {}", e),
                ))
            })?;

            #[cfg(unix)]
            {
                use crate::constants::DEFAULT_DIR_PERMISSIONS;
                let permissions = fs::Permissions::from_mode(DEFAULT_DIR_PERMISSIONS);
                fs::set_permissions(dir, permissions).map_err(|e| {
                    AppError::Io(std::io::Error::new(
                        e.kind(),
                        format!(
                            "Failed to set secure permissions on journal directory: {}",
                            e
                        ),
                    ))
                })?;
            }
            debug!(dir = %dir.display(), "Created journal directory");
        }

        Ok(Journal {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the entry file with the given identifier.
    pub fn entry_path(&self, identifier: &str) -> PathBuf {
        self.dir.join(identifier)
    }

    /// Builds a fresh identifier: `YYYYMMDD_HHMMSS-<8 hex chars>.txt`.
    pub fn new_identifier(now: NaiveDateTime) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}{}{}{}",
            now.format(FILENAME_TIMESTAMP_FORMAT),
            FILENAME_SEPARATOR,
            &suffix[..FILENAME_SUFFIX_LEN],
            ENTRY_FILE_EXTENSION
        )
    }

    /// Lists entry files: regular, non-hidden files directly in the journal
    /// directory, in filename order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be read.
    pub fn entry_files(&self) -> AppResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dent in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let dent = dent.map_err(walk_error)?;
            if !dent.file_type().is_file() || is_hidden(dent.file_name()) {
                continue;
            }
            files.push(dent.into_path());
        }
        Ok(files)
    }

    /// Reads and parses the entry with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read, or `AppError::Parse`
    /// if its content is malformed.
    pub fn read_entry(&self, identifier: &str, mode: ParseMode) -> AppResult<Entry> {
        let path = self.entry_path(identifier);
        let content = fs::read(&path)?;
        Entry::parse(&content, identifier, mode).map_err(|e| AppError::parse(&path, e))
    }

    /// Scans the journal and returns the entries selected by `settings`.
    ///
    /// Bodies are only kept when `include_bodies` is set. Without bodies or
    /// text terms only each file's header is read. Files that fail to parse
    /// are reported in `Collection::malformed` without stopping the scan.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory or an entry file cannot be read.
    pub fn collect(
        &self,
        settings: &FilterSettings,
        include_bodies: bool,
    ) -> AppResult<Collection> {
        let mode = if include_bodies {
            ParseMode::Full
        } else {
            ParseMode::MetaOnly
        };

        let mut collection = Collection::default();
        let files = self.entry_files()?;
        debug!(count = files.len(), "Scanning journal entries");

        for path in files {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            let identifier = match name {
                Some(name) => name,
                None => {
                    let identifier = path.to_string_lossy().into_owned();
                    collection.malformed.push(MalformedEntry {
                        path,
                        error: ParseError::BadTimestamp { identifier },
                    });
                    continue;
                }
            };

            let content = if mode == ParseMode::MetaOnly && !settings.needs_content() {
                read_header(&path)?
            } else {
                fs::read(&path)?
            };
            let entry = match Entry::parse(&content, &identifier, mode) {
                Ok(entry) => entry,
                Err(error) => {
                    debug!(path = %path.display(), %error, "Skipping malformed entry");
                    collection.malformed.push(MalformedEntry { path, error });
                    continue;
                }
            };

            if !settings.matches_metadata(&entry) {
                continue;
            }
            if settings.needs_content() && !settings.matches_text(&String::from_utf8_lossy(&content))
            {
                continue;
            }
            collection.entries.push(entry);
        }

        collection
            .entries
            .sort_by(|a, b| (a.timestamp, &a.identifier).cmp(&(b.timestamp, &b.identifier)));
        debug!(
            matched = collection.entries.len(),
            malformed = collection.malformed.len(),
            "Journal scan complete"
        );
        Ok(collection)
    }

    /// Creates a hidden working file next to the entries, readable only by
    /// the owner, holding `content`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file already exists or cannot be written.
    pub fn create_working_file(&self, name: &str, content: &[u8]) -> AppResult<PathBuf> {
        let path = self.dir.join(format!(".{}", name));
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path)?;
        file.write_all(content)?;
        debug!(path = %path.display(), "Created working file");
        Ok(path)
    }

    /// Moves a working file into place as the entry `identifier`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the rename fails.
    pub fn commit(&self, working: &Path, identifier: &str) -> AppResult<PathBuf> {
        let target = self.entry_path(identifier);
        fs::rename(working, &target)?;
        debug!(from = %working.display(), to = %target.display(), "Committed entry");
        Ok(target)
    }
}

/// Reads at most the header lines of an entry file.
fn read_header(path: &Path) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = Vec::new();
    for n in 0..HEADER_MAX_LINES {
        let start = header.len();
        if reader.read_until(b'\n', &mut header)? == 0 {
            break;
        }
        // Any blank line after the title is the separator.
        if n > 0 && header[start..].iter().all(u8::is_ascii_whitespace) {
            break;
        }
    }
    Ok(header)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map_or(false, |s| s.starts_with('.'))
}

fn walk_error(e: walkdir::Error) -> AppError {
    let message = e.to_string();
    match e.into_io_error() {
        Some(err) => AppError::Io(err),
        None => AppError::Journal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("Failed to write entry");
    }

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let journal_dir = temp_dir.path().join("new_journal");
        assert!(!journal_dir.exists());

        Journal::open(&journal_dir).expect("Failed to open journal");
        assert!(journal_dir.is_dir());

        #[cfg(unix)]
        {
            let metadata = fs::metadata(&journal_dir).expect("Failed to get directory metadata");
            assert_eq!(metadata.permissions().mode() & 0o777, 0o700);
        }
    }

    #[test]
    fn test_open_rejects_relative_path() {
        match Journal::open(Path::new("relative/path/to/journal")) {
            Err(AppError::Journal(msg)) => {
                assert!(msg.contains("must be absolute"));
                assert!(msg.contains("relative/path/to/journal"));
            }
            other => panic!("Expected AppError::Journal, got {:?}", other),
        }
    }

    #[test]
    fn test_new_identifier_shape() {
        let now = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let id = Journal::new_identifier(now);
        assert!(id.starts_with("20170101_120000-"));
        assert!(id.ends_with(".txt"));
        assert_eq!(id.len(), "20170101_120000-".len() + 8 + ".txt".len());
        assert_eq!(
            crate::journal_core::entry::timestamp_from_identifier(&id).unwrap(),
            now
        );
        assert_ne!(id, Journal::new_identifier(now));
    }

    #[test]
    fn test_entry_files_skips_hidden_and_directories() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        write(temp_dir.path(), "20170102_000000-b.txt", "B");
        write(temp_dir.path(), "20170101_000000-a.txt", "A");
        write(temp_dir.path(), ".20170103_000000-c.txt", "hidden");
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let names: Vec<String> = journal
            .entry_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["20170101_000000-a.txt", "20170102_000000-b.txt"]);
    }

    #[test]
    fn test_collect_sorts_and_reports_malformed() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        write(temp_dir.path(), "20170102_000000-b.txt", "Second\n\nBody");
        write(temp_dir.path(), "20170101_000000-a.txt", "First");
        write(temp_dir.path(), "20170103_000000-c.txt", "   \n");
        write(temp_dir.path(), "notes.txt", "No timestamp");

        let collection = journal.collect(&FilterSettings::new(), true).unwrap();
        let titles: Vec<&str> = collection.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(collection.entries[1].body.as_deref(), Some("Body"));

        assert_eq!(collection.malformed.len(), 2);
        let errors: Vec<&ParseError> = collection.malformed.iter().map(|m| &m.error).collect();
        assert!(errors.contains(&&ParseError::WhitespaceTitle));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ParseError::BadTimestamp { .. })));
    }

    #[test]
    fn test_collect_without_bodies() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        write(temp_dir.path(), "20170101_000000-a.txt", "Title\n\nBody");

        let collection = journal.collect(&FilterSettings::new(), false).unwrap();
        assert_eq!(collection.entries.len(), 1);
        assert_eq!(collection.entries[0].body, None);
    }

    #[test]
    fn test_read_header_stops_at_separator() {
        let temp_dir = tempdir().unwrap();
        let body = "word ".repeat(200_000);
        write(temp_dir.path(), "20170101_000000-a.txt", &format!("Title\n@work\n\n{}", body));
        write(temp_dir.path(), "20170102_000000-b.txt", "Short");
        write(temp_dir.path(), "20170103_000000-c.txt", &format!("Plain\n\n{}", body));

        let header = read_header(&temp_dir.path().join("20170101_000000-a.txt")).unwrap();
        assert_eq!(header, b"Title\n@work\n\n");
        let header = read_header(&temp_dir.path().join("20170102_000000-b.txt")).unwrap();
        assert_eq!(header, b"Short");
        let header = read_header(&temp_dir.path().join("20170103_000000-c.txt")).unwrap();
        assert_eq!(header, b"Plain\n\n");
    }

    #[test]
    fn test_collect_without_bodies_skips_body_bytes() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        let mut content = b"Title\n@work\n\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        fs::write(temp_dir.path().join("20170101_000000-a.txt"), &content).unwrap();

        let listed = journal.collect(&FilterSettings::new(), false).unwrap();
        assert_eq!(listed.entries.len(), 1);
        assert!(listed.malformed.is_empty());
        assert!(listed.entries[0].tags.contains("work"));

        // Reading the body surfaces its invalid encoding.
        let full = journal.collect(&FilterSettings::new(), true).unwrap();
        assert!(full.entries.is_empty());
        assert_eq!(full.malformed[0].error, ParseError::Encoding);
    }

    #[test]
    fn test_collect_text_searches_whole_file() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        write(temp_dir.path(), "20170101_000000-a.txt", "Title\n@work\n\nSecret Word");
        write(temp_dir.path(), "20170102_000000-b.txt", "Other\n\nnothing");

        let settings = FilterSettings::new().with_text(["secret"]);
        let collection = journal.collect(&settings, false).unwrap();
        assert_eq!(collection.entries.len(), 1);
        assert_eq!(collection.entries[0].title, "Title");

        let settings = FilterSettings::new().with_text(["@work"]);
        assert_eq!(journal.collect(&settings, false).unwrap().entries.len(), 1);

        let settings = FilterSettings::new()
            .with_text(["secret"])
            .case_sensitive(true);
        assert!(journal.collect(&settings, false).unwrap().entries.is_empty());
    }

    #[test]
    fn test_read_entry_reports_path() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();
        write(temp_dir.path(), "20170101_000000-a.txt", "Title\nbogus\n\nBody");

        match journal.read_entry("20170101_000000-a.txt", ParseMode::Full) {
            Err(AppError::Parse { path, source }) => {
                assert!(path.ends_with("20170101_000000-a.txt"));
                assert_eq!(source, ParseError::UnknownAttribute("bogus".to_string()));
            }
            other => panic!("Expected AppError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_working_file_and_commit() {
        let temp_dir = tempdir().unwrap();
        let journal = Journal::open(temp_dir.path()).unwrap();

        let working = journal
            .create_working_file("20170101_000000-a.txt", b"Title\n")
            .unwrap();
        assert!(working.file_name().unwrap().to_string_lossy().starts_with('.'));
        assert!(journal.entry_files().unwrap().is_empty());
        assert!(journal
            .create_working_file("20170101_000000-a.txt", b"again")
            .is_err());

        #[cfg(unix)]
        {
            let metadata = fs::metadata(&working).unwrap();
            assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
        }

        let committed = journal.commit(&working, "20170101_000000-a.txt").unwrap();
        assert!(!working.exists());
        assert_eq!(fs::read_to_string(committed).unwrap(), "Title\n");
        assert_eq!(journal.entry_files().unwrap().len(), 1);
    }
}
