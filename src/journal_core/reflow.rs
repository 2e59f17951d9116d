//! Paragraph-aware reflow of entry bodies.
//!
//! Prose paragraphs are greedily re-wrapped to a column, while list items,
//! headings, URLs and fenced blocks keep their shape. Each source line is
//! classified by [`step`], a pure function of the current [`ReflowState`]
//! and the line; the engine then carries out the returned [`Action`].

use crate::constants::{
    FENCE_CLOSE_LINE, FENCE_LINE_PREFIX, FENCE_MARKER, FENCE_OPEN_LINE, HEADING_UNDERLINE_CHAR,
};

/// Where the reflow engine is within the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowState {
    /// Prose; lines are buffered into the current paragraph.
    Normal,
    /// After a list item; lines pass through until a blank line.
    InList,
    /// Inside a fenced block; lines pass through with a marker prefix.
    InFence,
}

/// What to do with one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Flush the paragraph and emit the fence open marker.
    OpenFence,
    /// Emit the fence close marker; separate whatever follows.
    CloseFence,
    /// Emit a line from inside a fence.
    FenceLine(&'a str),
    /// Blank line after a list: separate whatever follows.
    EndList,
    /// Blank line outside a list: flush the paragraph and separate whatever
    /// follows.
    EndParagraph,
    /// Heading: emit it underlined.
    Heading(&'a str),
    /// URL, list item or list continuation: emit unchanged.
    Verbatim(&'a str),
    /// Prose: add the line's words to the paragraph.
    Words(&'a str),
}

/// Computes the next state and the action for one source line.
///
/// # Examples
///
/// ```
/// use j::journal_core::reflow::{step, Action, ReflowState};
///
/// assert_eq!(
///     step(ReflowState::Normal, " - item"),
///     (ReflowState::InList, Action::Verbatim(" - item"))
/// );
/// assert_eq!(
///     step(ReflowState::InList, ""),
///     (ReflowState::Normal, Action::EndList)
/// );
/// ```
pub fn step(state: ReflowState, line: &str) -> (ReflowState, Action<'_>) {
    if state == ReflowState::InFence {
        return if is_fence_marker(line) {
            (ReflowState::Normal, Action::CloseFence)
        } else {
            (ReflowState::InFence, Action::FenceLine(line))
        };
    }

    if is_fence_marker(line) {
        return (ReflowState::InFence, Action::OpenFence);
    }

    if line.trim().is_empty() {
        let action = match state {
            ReflowState::InList => Action::EndList,
            _ => Action::EndParagraph,
        };
        return (ReflowState::Normal, action);
    }

    if line.starts_with("http://") || line.starts_with("https://") {
        return (state, Action::Verbatim(line));
    }

    if is_heading(line) {
        return (ReflowState::Normal, Action::Heading(line));
    }

    if is_list_item(line) || state == ReflowState::InList {
        return (ReflowState::InList, Action::Verbatim(line));
    }

    (ReflowState::Normal, Action::Words(line))
}

fn is_fence_marker(line: &str) -> bool {
    line.trim_end() == FENCE_MARKER
}

fn is_heading(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| word.chars().all(|c| c == '#'))
}

fn is_list_item(line: &str) -> bool {
    let content = line.trim_start();
    content.starts_with('-') || content.starts_with('*')
}

/// Formats a body for display at the given column.
///
/// A column of zero or less returns the body's lines unchanged. Otherwise prose
/// paragraphs are re-wrapped, and the result never starts or ends with a blank
/// separator line.
///
/// # Examples
///
/// ```
/// use j::journal_core::reflow::format_body;
///
/// let body = "one two\nthree\n\n - keep me\n - as is";
/// assert_eq!(
///     format_body(body, 80),
///     vec!["one two three", "", " - keep me", " - as is"]
/// );
/// assert_eq!(format_body(body, -1).len(), 5);
/// ```
pub fn format_body(body: &str, width: i32) -> Vec<String> {
    if width <= 0 {
        return body.lines().map(str::to_string).collect();
    }

    let mut engine = Reflow::new(width as usize);
    for line in body.lines() {
        engine.feed(line);
    }
    engine.finish()
}

/// Engine-local state for one `format_body` call.
struct Reflow<'a> {
    width: usize,
    state: ReflowState,
    pending_blank: bool,
    paragraph: Vec<&'a str>,
    out: Vec<String>,
}

impl<'a> Reflow<'a> {
    fn new(width: usize) -> Self {
        Reflow {
            width,
            state: ReflowState::Normal,
            pending_blank: false,
            paragraph: Vec::new(),
            out: Vec::new(),
        }
    }

    fn feed(&mut self, line: &'a str) {
        let (next, action) = step(self.state, line);
        self.state = next;

        match action {
            Action::OpenFence => {
                if self.flush() {
                    self.pending_blank = true;
                }
                self.emit(FENCE_OPEN_LINE.to_string());
            }
            Action::CloseFence => {
                self.emit(FENCE_CLOSE_LINE.to_string());
                self.pending_blank = true;
            }
            Action::FenceLine(text) => self.emit(format!("{}{}", FENCE_LINE_PREFIX, text)),
            Action::EndList => self.pending_blank = true,
            Action::EndParagraph => {
                self.flush();
                // Blanks before any content are dropped; runs collapse to one.
                if !self.out.is_empty() {
                    self.pending_blank = true;
                }
            }
            Action::Heading(text) => {
                if self.flush() {
                    self.pending_blank = true;
                }
                self.emit(text.to_string());
                let underline: String = std::iter::repeat(HEADING_UNDERLINE_CHAR)
                    .take(text.chars().count())
                    .collect();
                self.emit(underline);
                self.pending_blank = true;
            }
            Action::Verbatim(text) => {
                self.flush();
                self.emit(text.to_string());
            }
            Action::Words(text) => self.paragraph.extend(text.split_whitespace()),
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }

    /// Emits a line, preceded by a separator if one is owed.
    fn emit(&mut self, line: String) {
        if self.pending_blank {
            self.out.push(String::new());
            self.pending_blank = false;
        }
        self.out.push(line);
    }

    /// Wraps and emits the buffered paragraph. Returns whether anything was emitted.
    fn flush(&mut self) -> bool {
        if self.paragraph.is_empty() {
            return false;
        }
        let words = std::mem::take(&mut self.paragraph);
        for line in wrap_words(&words, self.width) {
            self.emit(line);
        }
        true
    }
}

/// Greedily fills lines of at most `width` characters.
///
/// Words longer than `width` are broken, filling the remainder of the current
/// line first.
pub fn wrap_words(words: &[&str], width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for &word in words {
        let mut word = word;
        loop {
            let word_len = word.chars().count();
            let sep = usize::from(current_len > 0);

            if current_len + sep + word_len <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_len += sep + word_len;
                break;
            }

            if word_len > width {
                let room = width.saturating_sub(current_len + sep);
                if room > 0 {
                    let split = word.char_indices().nth(room).map_or(word.len(), |(i, _)| i);
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.push_str(&word[..split]);
                    word = &word[split..];
                }
            }

            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
