//! Typing animation engine.
//!
//! A [`TypingSession`] is a cooperative generator over the reveal steps of one
//! response. The [`Typewriter`] owns at most one session and applies a single
//! step to the transcript per [`Typewriter::tick`]; the caller decides the
//! pacing and may cancel at any point.
//!
//! ```text
//!   Idle ──start(text)──▶ Typing ──tick()…──▶ (cursor == len) ──▶ Idle
//!                           │                      │
//!                           └──── cancel() ────────┘   link pass runs on finish
//! ```

use tracing::trace;

use crate::transcript::{Transcript, TranscriptLine};

/// Substring that marks a line as carrying a link.
pub const LINK_MARKER: &str = "https://";

/// One unit of reveal work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Char(char),
    LineBreak,
}

/// Incremental reveal state for one response string.
#[derive(Debug, Clone)]
pub struct TypingSession {
    text: String,
    /// Byte offset of the next character to reveal.
    cursor: usize,
    /// Transcript index of the line the first character lands on.
    anchor: usize,
}

impl TypingSession {
    pub fn new(text: impl Into<String>, anchor: usize) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            anchor,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Characters revealed so far.
    pub fn revealed(&self) -> &str {
        &self.text[..self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }
}

impl Iterator for TypingSession {
    type Item = RevealStep;

    fn next(&mut self) -> Option<RevealStep> {
        let ch = self.text[self.cursor..].chars().next()?;
        self.cursor += ch.len_utf8();
        Some(match ch {
            '\n' => RevealStep::LineBreak,
            other => RevealStep::Char(other),
        })
    }
}

/// Applies one reveal step to the transcript.
pub fn apply_step(transcript: &mut Transcript, step: RevealStep) {
    match step {
        RevealStep::Char(ch) => transcript.push_char(ch),
        RevealStep::LineBreak => transcript.break_line(),
    }
}

/// Result of a single [`Typewriter::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to reveal.
    Idle,
    /// One step was applied; more remain.
    Revealed,
    /// The session completed and the link pass ran.
    Finished,
}

#[derive(Debug, Default)]
enum TypewriterState {
    #[default]
    Idle,
    Typing(TypingSession),
}

/// Single-slot animation engine: at most one session is active.
#[derive(Debug, Default)]
pub struct Typewriter {
    state: TypewriterState,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, TypewriterState::Typing(_))
    }

    pub fn session(&self) -> Option<&TypingSession> {
        match &self.state {
            TypewriterState::Typing(session) => Some(session),
            TypewriterState::Idle => None,
        }
    }

    /// Starts revealing `text` into the tail line of `transcript`.
    ///
    /// Returns false (and leaves the running session untouched) if a session
    /// is already active.
    pub fn start(&mut self, transcript: &Transcript, text: impl Into<String>) -> bool {
        if self.is_typing() {
            return false;
        }
        let anchor = transcript.len().saturating_sub(1);
        let session = TypingSession::new(text, anchor);
        trace!(anchor, len = session.full_text().len(), "typing session started");
        self.state = TypewriterState::Typing(session);
        true
    }

    /// Drops the active session without running the link pass.
    pub fn cancel(&mut self) -> Option<TypingSession> {
        match std::mem::take(&mut self.state) {
            TypewriterState::Typing(session) => Some(session),
            TypewriterState::Idle => None,
        }
    }

    /// Applies at most one reveal step.
    pub fn tick(&mut self, transcript: &mut Transcript) -> TickOutcome {
        let TypewriterState::Typing(session) = &mut self.state else {
            return TickOutcome::Idle;
        };

        if let Some(step) = session.next() {
            apply_step(transcript, step);
        }

        if !session.is_finished() {
            return TickOutcome::Revealed;
        }

        if let Some(done) = self.cancel() {
            linkify(transcript, &done);
        }
        TickOutcome::Finished
    }
}

/// Replaces link-bearing lines of a finished session with link elements.
///
/// Only the lines written by `session` are considered; each is looked up at
/// its actual transcript position (`anchor + i`).
pub fn linkify(transcript: &mut Transcript, session: &TypingSession) {
    if !session.full_text().contains(LINK_MARKER) {
        return;
    }

    let line_count = session.full_text().split('\n').count();
    for offset in 0..line_count {
        let index = session.anchor() + offset;
        let Some(TranscriptLine::Text(line)) = transcript.lines().get(index) else {
            continue;
        };
        if !line.contains(LINK_MARKER) {
            continue;
        }
        let (label, url) = split_link(line);
        transcript.replace(index, TranscriptLine::Link { label, url });
    }
}

/// Splits a line into `(label, url)`: the last whitespace-delimited token is
/// the URL, everything before it is the label.
pub fn split_link(line: &str) -> (String, String) {
    let trimmed = line.trim_end();
    match trimmed.rsplit_once(char::is_whitespace) {
        Some((label, url)) => (label.trim_end().to_string(), url.to_string()),
        None => (String::new(), trimmed.to_string()),
    }
}
