//! Rendering entries for display.
//!
//! Plain rendering produces a block per entry:
//!
//! ```text
//! ==============================================================================
//! 2017-01-01 12:00:00                                   20170101_120000-xxxxxxxx
//!                                   My Title
//!                                 @tag1 @tag2
//!
//! Body
//! ```
//!
//! Structured rendering produces serde records for machine consumption.

use crate::constants::{
    DEFAULT_RULE_WIDTH, DEFAULT_WRAP_COLUMN, DISPLAY_TIME_FORMAT, RULE_CHAR, TAG_MARKER,
};
use crate::errors::AppResult;
use crate::journal_core::entry::Entry;
use crate::journal_core::reflow::format_body;
use serde::Serialize;

/// ANSI SGR parameters applied to each element of a rendered entry.
///
/// A `None` element is left unstyled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    pub rule: Option<String>,
    pub metadata: Option<String>,
    pub title: Option<String>,
    pub attributes: Option<String>,
    pub body: Option<String>,
}

/// The styled parts of a rendered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Rule,
    Metadata,
    Title,
    Attributes,
    Body,
}

impl Theme {
    fn token(&self, element: Element) -> Option<&str> {
        match element {
            Element::Rule => self.rule.as_deref(),
            Element::Metadata => self.metadata.as_deref(),
            Element::Title => self.title.as_deref(),
            Element::Attributes => self.attributes.as_deref(),
            Element::Body => self.body.as_deref(),
        }
    }

    /// The built-in terminal palette.
    pub fn ansi() -> Self {
        Theme {
            rule: Some("2".to_string()),
            metadata: Some("36".to_string()),
            title: Some("1".to_string()),
            attributes: Some("33".to_string()),
            body: None,
        }
    }
}

fn styled(token: Option<&str>, text: &str) -> String {
    match token {
        Some(token) if !text.is_empty() => format!("\x1b[{}m{}\x1b[0m", token, text),
        _ => text.to_string(),
    }
}

/// Structured form of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRecord {
    pub id: String,
    pub time: String,
    pub title: String,
    pub tags: Vec<String>,
    pub immortal: bool,
    pub nowrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Serialize)]
struct EntryListing<'a> {
    entries: &'a [EntryRecord],
}

/// Renders entries as text or structured records.
#[derive(Debug, Clone)]
pub struct Formatter {
    /// Body wrap column; zero or negative shows bodies verbatim.
    pub wrap_column: i32,
    /// Width of the rule and of the centering field.
    pub rule_width: usize,
    pub theme: Option<Theme>,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter {
            wrap_column: DEFAULT_WRAP_COLUMN,
            rule_width: DEFAULT_RULE_WIDTH,
            theme: None,
        }
    }
}

impl Formatter {
    fn style(&self, element: Element, text: &str) -> String {
        let token = self.theme.as_ref().and_then(|t| t.token(element));
        styled(token, text)
    }

    fn centered(&self, text: &str) -> String {
        format!("{:^width$}", text, width = self.rule_width)
            .trim_end()
            .to_string()
    }

    /// Wrap column for an entry's body. `nowrap` entries always get a
    /// negative column.
    pub fn body_column(&self, entry: &Entry) -> i32 {
        if !entry.nowrap {
            return self.wrap_column;
        }
        match self.wrap_column.abs() {
            0 => -1,
            col => -col,
        }
    }

    /// Renders one entry as display lines joined by newlines, with no trailing
    /// newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use j::format::Formatter;
    /// use j::journal_core::entry::{Entry, ParseMode};
    ///
    /// let entry = Entry::parse(b"My Title\n\nBody", "20170101_120000-xxxxxxxx", ParseMode::Full).unwrap();
    /// let text = Formatter::default().render(&entry);
    /// let lines: Vec<&str> = text.lines().collect();
    /// assert_eq!(lines[0], "=".repeat(78));
    /// assert!(lines[1].starts_with("2017-01-01 12:00:00"));
    /// assert_eq!(lines[2].trim(), "My Title");
    /// assert_eq!(lines[4], "Body");
    /// ```
    pub fn render(&self, entry: &Entry) -> String {
        let mut lines = Vec::new();

        let rule: String = std::iter::repeat(RULE_CHAR).take(self.rule_width).collect();
        lines.push(self.style(Element::Rule, &rule));

        let time = entry.timestamp.format(DISPLAY_TIME_FORMAT).to_string();
        let pad = self
            .rule_width
            .saturating_sub(time.chars().count())
            .max(entry.identifier.chars().count() + 1);
        let meta = format!("{}{:>pad$}", time, entry.identifier, pad = pad);
        lines.push(self.style(Element::Metadata, &meta));

        lines.push(self.style(Element::Title, &self.centered(&entry.title)));

        if !entry.tags.is_empty() {
            let tags: Vec<String> = entry
                .tags
                .iter()
                .map(|tag| format!("{}{}", TAG_MARKER, tag))
                .collect();
            lines.push(self.style(Element::Attributes, &self.centered(&tags.join(" "))));
        }

        if let Some(body) = &entry.body {
            lines.push(String::new());
            for line in format_body(body, self.body_column(entry)) {
                lines.push(self.style(Element::Body, &line));
            }
        }

        lines.join("\n")
    }

    /// Builds the structured record for an entry.
    pub fn record(&self, entry: &Entry) -> EntryRecord {
        EntryRecord {
            id: entry.identifier.clone(),
            time: entry.timestamp.format(DISPLAY_TIME_FORMAT).to_string(),
            title: entry.title.clone(),
            tags: entry.tags.iter().cloned().collect(),
            immortal: entry.immortal,
            nowrap: entry.nowrap,
            body: entry.body.clone(),
        }
    }

    /// Serializes entries as `{"entries": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Json` if serialization fails.
    pub fn render_json(&self, entries: &[Entry]) -> AppResult<String> {
        let records: Vec<EntryRecord> = entries.iter().map(|e| self.record(e)).collect();
        Ok(serde_json::to_string_pretty(&EntryListing {
            entries: &records,
        })?)
    }
}
