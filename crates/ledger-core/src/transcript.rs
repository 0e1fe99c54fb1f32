//! Transcript: the ordered log of lines shown in the terminal view.
//!
//! Lines are append-only except for the tail (the line currently being
//! typed into), link substitution at a known position, and an explicit
//! [`Transcript::clear`].

/// A single displayed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptLine {
    Text(String),
    /// Label followed by a clickable URL.
    Link { label: String, url: String },
}

impl TranscriptLine {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Plain-text rendering (link elements are joined as `label url`).
    pub fn to_plain(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Link { label, url } if label.is_empty() => url.clone(),
            Self::Link { label, url } => format!("{label} {url}"),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link { url, .. } => Some(url),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(TranscriptLine::text).collect(),
        }
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(TranscriptLine::text(line));
    }

    /// Appends `ch` to the tail line, opening one if the transcript is empty.
    ///
    /// A link element at the tail is demoted to plain text first; typing
    /// never targets a finished link line in practice.
    pub fn push_char(&mut self, ch: char) {
        match self.lines.last_mut() {
            Some(TranscriptLine::Text(tail)) => tail.push(ch),
            Some(link @ TranscriptLine::Link { .. }) => {
                let mut plain = link.to_plain();
                plain.push(ch);
                *link = TranscriptLine::Text(plain);
            }
            None => self.lines.push(TranscriptLine::Text(ch.to_string())),
        }
    }

    /// Closes the tail line and opens a new empty one.
    pub fn break_line(&mut self) {
        self.lines.push(TranscriptLine::Text(String::new()));
    }

    /// Drops every line at or after `index`.
    pub fn truncate(&mut self, index: usize) {
        self.lines.truncate(index);
    }

    /// Replaces the line at `index`. Out-of-range indices are ignored.
    pub fn replace(&mut self, index: usize, line: TranscriptLine) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Most recent link element, searching from the tail.
    pub fn last_link(&self) -> Option<&str> {
        self.lines.iter().rev().find_map(TranscriptLine::url)
    }

    /// Plain-text rendering of every line, in order.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(TranscriptLine::to_plain).collect()
    }
}
