//! Single-user terminal session.
//!
//! Owns the transcript, the typewriter, the in-flight job slot and the
//! single-slot request queue. Every transcript write goes through here, which
//! keeps the order fixed: echo line, blank line, placeholder, response.
//!
//! The session never does I/O. [`Session::submit`] hands back a
//! [`JobTicket`] for network work; the driver runs it and feeds the text back
//! through [`Session::complete`]. Reveal pacing is the driver's job too: it
//! calls [`Session::tick`] once per step.

use tracing::{debug, info};

use crate::dispatch::{Dispatch, Dispatcher, Job, is_clear};
use crate::transcript::Transcript;
use crate::typing::{TickOutcome, Typewriter};

/// Lines shown when the session starts.
pub const GREETING: &[&str] = &[
    "🤖 Ledger AI: Ask me anything about XRP Ledger",
    "",
    "ℹ️ Type 'help' to see available commands",
];

/// Monotonically increasing job identifier.
pub type JobId = u64;

/// Network work the driver must run and report back via [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    pub id: JobId,
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Transcript emptied. Carries the job that was abandoned, if any.
    Cleared { abandoned: Option<JobId> },
    /// A static reply started revealing.
    Started,
    /// A placeholder started revealing; run the ticket.
    Spawn(JobTicket),
    /// Busy; the input was stored in the queue slot.
    Queued,
    /// Busy and the queue slot is taken; the input was dropped.
    Busy,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: JobId,
    /// Index of the line the placeholder (and later the response) starts on.
    anchor: usize,
}

#[derive(Debug)]
pub struct Session {
    dispatcher: Dispatcher,
    transcript: Transcript,
    typewriter: Typewriter,
    in_flight: Option<InFlight>,
    queued: Option<String>,
    next_job_id: JobId,
}

impl Session {
    /// Creates a session showing [`GREETING`].
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_transcript(dispatcher, Transcript::with_lines(GREETING.iter().copied()))
    }

    pub fn with_transcript(dispatcher: Dispatcher, transcript: Transcript) -> Self {
        Self {
            dispatcher,
            transcript,
            typewriter: Typewriter::new(),
            in_flight: None,
            queued: None,
            next_job_id: 1,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while a job is in flight or a reveal is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.typewriter.is_typing()
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_typing()
    }

    pub fn in_flight(&self) -> Option<JobId> {
        self.in_flight.as_ref().map(|job| job.id)
    }

    pub fn queued(&self) -> Option<&str> {
        self.queued.as_deref()
    }

    /// Handles one submitted input line.
    ///
    /// `clear`/`cls` is honoured even while busy; anything else is queued (or
    /// rejected) until the session is idle.
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        if raw.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }
        if is_clear(raw) {
            return self.clear();
        }
        if self.is_busy() {
            if self.queued.is_none() {
                debug!("busy, input queued");
                self.queued = Some(raw.to_string());
                return SubmitOutcome::Queued;
            }
            debug!("busy, queue slot taken");
            return SubmitOutcome::Busy;
        }
        self.start(raw)
    }

    fn start(&mut self, raw: &str) -> SubmitOutcome {
        let Some(dispatch) = self.dispatcher.dispatch(raw) else {
            return SubmitOutcome::Ignored;
        };

        match dispatch {
            Dispatch::Clear => self.clear(),
            Dispatch::Reply(text) => {
                self.open_response(raw);
                self.typewriter.start(&self.transcript, text);
                SubmitOutcome::Started
            }
            Dispatch::Pending { job, placeholder } => {
                self.open_response(raw);
                let id = self.next_job_id;
                self.next_job_id += 1;
                self.in_flight = Some(InFlight {
                    id,
                    anchor: self.transcript.len() - 1,
                });
                self.typewriter.start(&self.transcript, placeholder);
                info!(id, job = job.label(), "job dispatched");
                SubmitOutcome::Spawn(JobTicket { id, job })
            }
        }
    }

    /// Echo line plus the blank line the reply is revealed into.
    fn open_response(&mut self, raw: &str) {
        self.transcript.push_line(format!("> {}", raw.trim()));
        self.transcript.push_line("");
    }

    /// Empties the transcript and drops all pending work.
    pub fn clear(&mut self) -> SubmitOutcome {
        self.typewriter.cancel();
        self.transcript.clear();
        self.queued = None;
        let abandoned = self.in_flight.take().map(|job| job.id);
        debug!(?abandoned, "transcript cleared");
        SubmitOutcome::Cleared { abandoned }
    }

    /// Delivers the text of a finished job.
    ///
    /// The placeholder is removed and `text` starts revealing in its place.
    /// Results for unknown or abandoned jobs are discarded; returns whether
    /// `text` was accepted.
    pub fn complete(&mut self, id: JobId, text: String) -> bool {
        let Some(in_flight) = self.in_flight.take_if(|job| job.id == id) else {
            debug!(id, "discarding stale job result");
            return false;
        };

        self.typewriter.cancel();
        self.transcript.truncate(in_flight.anchor);
        self.transcript.push_line("");
        self.typewriter.start(&self.transcript, text);
        true
    }

    /// Applies one reveal step.
    pub fn tick(&mut self) -> TickOutcome {
        self.typewriter.tick(&mut self.transcript)
    }

    /// Starts the queued input once the session is idle.
    pub fn dequeue(&mut self) -> Option<SubmitOutcome> {
        if self.is_busy() {
            return None;
        }
        let raw = self.queued.take()?;
        debug!("starting queued input");
        Some(self.start(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dispatch::help_text;

    fn session() -> Session {
        Session::new(Dispatcher::from_config(&Config::default()))
    }

    fn empty_session() -> Session {
        Session::with_transcript(Dispatcher::from_config(&Config::default()), Transcript::new())
    }

    fn reveal_all(session: &mut Session) -> usize {
        let mut ticks = 0;
        loop {
            ticks += 1;
            match session.tick() {
                TickOutcome::Revealed => {}
                TickOutcome::Finished | TickOutcome::Idle => return ticks,
            }
        }
    }

    #[test]
    fn test_starts_with_greeting() {
        let s = session();
        assert_eq!(s.transcript().plain_lines(), GREETING.to_vec());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_help_is_echoed_then_revealed() {
        let mut s = empty_session();
        assert_eq!(s.submit("help"), SubmitOutcome::Started);
        assert!(s.is_typing());
        assert_eq!(s.transcript().plain_lines(), vec!["> help", ""]);

        s.tick();
        assert_eq!(s.transcript().plain_lines(), vec!["> help", "", ""]);
        s.tick();
        assert_eq!(s.transcript().plain_lines()[2], "📚");

        let ticks = reveal_all(&mut s);
        assert!(ticks > 50);
        assert!(!s.is_busy());

        let mut expected = vec!["> help".to_string()];
        expected.extend(help_text().split('\n').map(ToString::to_string));
        assert_eq!(s.transcript().plain_lines(), expected);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut s = session();
        assert_eq!(s.submit("   "), SubmitOutcome::Ignored);
        assert_eq!(s.transcript().len(), GREETING.len());
    }

    #[test]
    fn test_clear_empties_transcript_without_echo() {
        let mut s = session();
        assert_eq!(s.submit("cls"), SubmitOutcome::Cleared { abandoned: None });
        assert!(s.transcript().is_empty());
        assert!(!s.is_busy());
    }

    #[test]
    fn test_job_lifecycle_replaces_placeholder() {
        let mut s = empty_session();
        let SubmitOutcome::Spawn(ticket) = s.submit("xyz") else {
            panic!("expected a job");
        };
        assert_eq!(ticket.job, Job::Chat("xyz".to_string()));
        reveal_all(&mut s);
        assert_eq!(s.transcript().plain_lines(), vec!["> xyz", "🤔 Thinking..."]);
        assert!(s.is_busy());

        assert!(s.complete(ticket.id, "Hello\nthere".to_string()));
        assert_eq!(s.transcript().plain_lines(), vec!["> xyz", ""]);
        reveal_all(&mut s);
        assert_eq!(s.transcript().plain_lines(), vec!["> xyz", "Hello", "there"]);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_result_during_placeholder_reveal_cancels_it() {
        let mut s = empty_session();
        let SubmitOutcome::Spawn(ticket) = s.submit("xyz") else {
            panic!("expected a job");
        };
        s.tick();
        s.tick();
        assert!(s.complete(ticket.id, "ok".to_string()));
        reveal_all(&mut s);
        assert_eq!(s.transcript().plain_lines(), vec!["> xyz", "ok"]);
    }

    #[test]
    fn test_busy_submissions_queue_one_and_reject_the_rest() {
        let mut s = empty_session();
        assert_eq!(s.submit("help"), SubmitOutcome::Started);
        assert_eq!(s.submit("twitter"), SubmitOutcome::Queued);
        assert_eq!(s.submit("telegram"), SubmitOutcome::Busy);
        assert_eq!(s.queued(), Some("twitter"));

        // Characters of the running reveal are never interleaved.
        s.tick();
        s.tick();
        assert_eq!(s.transcript().plain_lines()[..3], ["> help", "", "📚"]);
        assert_eq!(s.dequeue(), None);

        reveal_all(&mut s);
        let help_end = s.transcript().len();
        assert_eq!(s.dequeue(), Some(SubmitOutcome::Started));
        assert_eq!(s.transcript().plain_lines()[help_end], "> twitter");
        reveal_all(&mut s);
        assert!(s.transcript().plain_lines().iter().any(|l| l.contains("Follow us")));
        assert!(!s.transcript().plain_lines().iter().any(|l| l == "> telegram"));
        assert_eq!(s.dequeue(), None);
    }

    #[test]
    fn test_clear_while_busy_discards_everything() {
        let mut s = empty_session();
        let SubmitOutcome::Spawn(ticket) = s.submit("xyz") else {
            panic!("expected a job");
        };
        assert_eq!(s.submit("help"), SubmitOutcome::Queued);

        assert_eq!(
            s.submit("clear"),
            SubmitOutcome::Cleared {
                abandoned: Some(ticket.id)
            }
        );
        assert!(s.transcript().is_empty());
        assert_eq!(s.queued(), None);
        assert!(!s.is_busy());

        assert!(!s.complete(ticket.id, "late".to_string()));
        assert!(s.transcript().is_empty());
        assert_eq!(s.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_job_ids_increase() {
        let mut s = empty_session();
        let SubmitOutcome::Spawn(first) = s.submit("one") else {
            panic!("expected a job");
        };
        s.complete(first.id, String::new());
        reveal_all(&mut s);
        let SubmitOutcome::Spawn(second) = s.submit("two") else {
            panic!("expected a job");
        };
        assert!(second.id > first.id);
        assert!(!s.complete(first.id, "stale".to_string()));
        assert_eq!(s.in_flight(), Some(second.id));
    }

    #[test]
    fn test_links_survive_the_full_pipeline() {
        let mut s = empty_session();
        s.submit("telegram");
        reveal_all(&mut s);
        assert_eq!(s.transcript().last_link(), Some("https://t.me/LedgerAIXRP"));
    }
}
