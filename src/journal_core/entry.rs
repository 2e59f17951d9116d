//! Entry parsing and serialization.
//!
//! An entry file is line oriented:
//!
//! ```text
//! Title line
//! @tag1 @tag2 immortal
//!
//! Body text, kept verbatim.
//! ```
//!
//! The attribute line is optional; when it is absent the blank separator line
//! follows the title directly. The entry's timestamp comes from its filename,
//! never from file metadata.

use crate::constants::{
    FILENAME_TIMESTAMP_FORMAT, FILENAME_TIMESTAMP_LEN, FLAG_IMMORTAL, FLAG_IMMORTAL_ALIAS,
    FLAG_NOWRAP, TAG_MARKER,
};
use crate::errors::ParseError;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;

/// Fixed-vocabulary attributes that change how an entry is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// The entry passes every time filter.
    Immortal,
    /// The body is displayed verbatim, never reflowed.
    NoWrap,
}

impl Flag {
    /// The token written in the attribute line for this flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Immortal => FLAG_IMMORTAL,
            Flag::NoWrap => FLAG_NOWRAP,
        }
    }
}

/// One whitespace-separated token of the attribute line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeToken {
    /// `@name`
    Tag(String),
    /// A known flag word.
    Flag(Flag),
}

impl AttributeToken {
    /// Classifies a single attribute token.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnknownAttribute` naming the token when it is neither
    /// a non-empty `@tag` nor a recognized flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use j::journal_core::entry::{AttributeToken, Flag};
    ///
    /// assert_eq!(
    ///     AttributeToken::classify("@work").unwrap(),
    ///     AttributeToken::Tag("work".to_string())
    /// );
    /// assert_eq!(
    ///     AttributeToken::classify("nowrap").unwrap(),
    ///     AttributeToken::Flag(Flag::NoWrap)
    /// );
    /// assert!(AttributeToken::classify("work").is_err());
    /// ```
    pub fn classify(token: &str) -> Result<Self, ParseError> {
        if let Some(name) = token.strip_prefix(TAG_MARKER) {
            if !name.is_empty() {
                return Ok(AttributeToken::Tag(name.to_string()));
            }
        }

        match token {
            FLAG_IMMORTAL | FLAG_IMMORTAL_ALIAS => Ok(AttributeToken::Flag(Flag::Immortal)),
            FLAG_NOWRAP => Ok(AttributeToken::Flag(Flag::NoWrap)),
            _ => Err(ParseError::UnknownAttribute(token.to_string())),
        }
    }
}

impl fmt::Display for AttributeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeToken::Tag(name) => write!(f, "{}{}", TAG_MARKER, name),
            AttributeToken::Flag(flag) => f.write_str(flag.as_str()),
        }
    }
}

/// How much of an entry file to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Title, attributes and body.
    Full,
    /// Stop after the header; the body is left as `None`.
    MetaOnly,
}

/// One journal record, backed by one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The filename, unique within the journal directory.
    pub identifier: String,
    /// Creation time taken from the filename prefix.
    pub timestamp: NaiveDateTime,
    /// First line of the file, trimmed.
    pub title: String,
    /// Tags from the attribute line, without the `@` marker.
    pub tags: BTreeSet<String>,
    /// Whether the entry bypasses time filtering.
    pub immortal: bool,
    /// Whether the body is shown without reflowing.
    pub nowrap: bool,
    /// Everything after the blank separator line, verbatim.
    pub body: Option<String>,
}

impl Entry {
    /// Parses an entry from raw file content and its filename.
    ///
    /// Parsing is strict and line oriented: a title line, an optional attribute
    /// line, a blank separator line, then the body. Entries consisting of only a
    /// title, or a title and attribute line, are valid and have no body.
    ///
    /// # Parameters
    ///
    /// * `content` - Raw bytes of the entry file
    /// * `identifier` - The entry's filename, which carries its timestamp
    /// * `mode` - Whether to read the body or stop after the header
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` describing the first problem found. Parsing has no
    /// side effects.
    ///
    /// # Examples
    ///
    /// ```
    /// use j::journal_core::entry::{Entry, ParseMode};
    ///
    /// let content = b"My Title\n@tag1 @tag2\n\nBody";
    /// let entry = Entry::parse(content, "20170101_120000-xxxxxxxx", ParseMode::Full).unwrap();
    /// assert_eq!(entry.title, "My Title");
    /// assert!(entry.tags.contains("tag1"));
    /// assert_eq!(entry.body.as_deref(), Some("Body"));
    /// ```
    pub fn parse(content: &[u8], identifier: &str, mode: ParseMode) -> Result<Self, ParseError> {
        let timestamp = timestamp_from_identifier(identifier)?;
        let text = std::str::from_utf8(content).map_err(|_| ParseError::Encoding)?;

        let mut lines = LineCursor::new(text);
        let title = lines
            .next_line()
            .ok_or(ParseError::UnexpectedEndOfFile)?
            .trim();
        if title.is_empty() {
            return Err(ParseError::WhitespaceTitle);
        }

        let mut entry = Entry {
            identifier: identifier.to_string(),
            timestamp,
            title: title.to_string(),
            tags: BTreeSet::new(),
            immortal: false,
            nowrap: false,
            body: None,
        };

        let attr_line = match lines.next_line() {
            Some(line) => line.trim(),
            None => return Ok(entry),
        };

        if !attr_line.is_empty() {
            for token in attr_line.split_whitespace() {
                match AttributeToken::classify(token)? {
                    AttributeToken::Tag(name) => {
                        entry.tags.insert(name);
                    }
                    AttributeToken::Flag(Flag::Immortal) => entry.immortal = true,
                    AttributeToken::Flag(Flag::NoWrap) => entry.nowrap = true,
                }
            }

            match lines.next_line() {
                Some(line) if !line.trim().is_empty() => {
                    return Err(ParseError::ExpectedBlankLine);
                }
                Some(_) => {}
                None => return Ok(entry),
            }
        }

        if mode == ParseMode::Full {
            let body = lines.remainder();
            if !body.is_empty() {
                entry.body = Some(body.to_string());
            }
        }

        Ok(entry)
    }

    /// The attribute tokens describing this entry, tags sorted first.
    pub fn attribute_tokens(&self) -> Vec<AttributeToken> {
        let mut tokens: Vec<AttributeToken> = self
            .tags
            .iter()
            .map(|t| AttributeToken::Tag(t.clone()))
            .collect();
        if self.immortal {
            tokens.push(AttributeToken::Flag(Flag::Immortal));
        }
        if self.nowrap {
            tokens.push(AttributeToken::Flag(Flag::NoWrap));
        }
        tokens
    }

    /// Writes the entry back in the on-disk format.
    ///
    /// The attribute line is omitted when the entry has no tags or flags.
    pub fn to_file_text(&self) -> String {
        let mut out = String::with_capacity(
            self.title.len() + self.body.as_ref().map_or(0, |b| b.len()) + 64,
        );
        out.push_str(&self.title);
        out.push('\n');

        let tokens = self.attribute_tokens();
        if !tokens.is_empty() {
            let line: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }

        if let Some(body) = &self.body {
            out.push('\n');
            out.push_str(body);
        }
        out
    }
}

/// Extracts the creation time from an entry filename.
///
/// The filename must start with `YYYYMMDD_HHMMSS` followed by a
/// non-alphanumeric separator.
///
/// # Errors
///
/// Returns `ParseError::BadTimestamp` if the prefix is missing, malformed or
/// not followed by a separator.
pub fn timestamp_from_identifier(identifier: &str) -> Result<NaiveDateTime, ParseError> {
    let bad = || ParseError::BadTimestamp {
        identifier: identifier.to_string(),
    };

    let prefix = identifier.get(..FILENAME_TIMESTAMP_LEN).ok_or_else(bad)?;
    let separator = identifier[FILENAME_TIMESTAMP_LEN..]
        .chars()
        .next()
        .ok_or_else(bad)?;
    if separator.is_alphanumeric() || !prefix.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return Err(bad());
    }

    NaiveDateTime::parse_from_str(prefix, FILENAME_TIMESTAMP_FORMAT).map_err(|_| bad())
}

/// Splits text into lines while keeping the unread remainder addressable.
struct LineCursor<'a> {
    rest: &'a str,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        LineCursor { rest: text }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match self.rest.find('\n') {
            Some(i) => (&self.rest[..i], &self.rest[i + 1..]),
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn remainder(&self) -> &'a str {
        self.rest
    }
}
