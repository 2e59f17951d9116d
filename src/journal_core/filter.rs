//! Entry selection predicates.
//!
//! `FilterSettings` holds one query. Each predicate is independent and the
//! journal scan applies them in a fixed order: time, tags, text, identifiers.
//! An empty criterion always matches.

use crate::journal_core::entry::Entry;
use crate::journal_core::time_filter::TimeFilter;

/// Criteria for selecting entries from a journal.
#[derive(Debug, Clone, Default)]
pub struct FilterSettings {
    /// Every tag must be present on the entry.
    pub tags: Vec<String>,
    /// Every term must occur in the raw entry file.
    pub text: Vec<String>,
    /// Compare text terms without case folding.
    pub case_sensitive: bool,
    /// Interval the entry timestamp must fall in, unless it is immortal.
    pub time: Option<TimeFilter>,
    /// When non-empty, the entry identifier must be one of these.
    pub ids: Vec<String>,
}

impl FilterSettings {
    /// Settings that match every entry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_text<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_time(mut self, time: Option<TimeFilter>) -> Self {
        self.time = time;
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Whether text matching needs the raw file content.
    pub fn needs_content(&self) -> bool {
        !self.text.is_empty()
    }

    /// Immortal entries pass regardless of the time filter.
    pub fn matches_time(&self, entry: &Entry) -> bool {
        if entry.immortal {
            return true;
        }
        self.time
            .as_ref()
            .map_or(true, |tf| tf.matches(entry.timestamp))
    }

    pub fn matches_tags(&self, entry: &Entry) -> bool {
        self.tags.iter().all(|tag| entry.tags.contains(tag))
    }

    /// Tests every term as a substring of `content`, the entry's raw file text.
    pub fn matches_text(&self, content: &str) -> bool {
        if self.text.is_empty() {
            return true;
        }
        if self.case_sensitive {
            return self.text.iter().all(|term| content.contains(term.as_str()));
        }
        let haystack = content.to_lowercase();
        self.text
            .iter()
            .all(|term| haystack.contains(&term.to_lowercase()))
    }

    pub fn matches_id(&self, entry: &Entry) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|id| *id == entry.identifier)
    }

    /// Applies every predicate except text, which needs the file content.
    pub fn matches_metadata(&self, entry: &Entry) -> bool {
        self.matches_time(entry) && self.matches_tags(entry) && self.matches_id(entry)
    }
}
