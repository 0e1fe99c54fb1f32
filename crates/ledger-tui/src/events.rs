//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, runtime timers and the
//! results of spawned jobs (delivered through the runtime inbox).

use crossterm::event::Event;
use ledger_core::session::JobId;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum UiEvent {
    /// Render cadence tick.
    Tick,
    /// Current terminal size, sent before other events each loop.
    Frame { width: u16, height: u16 },
    /// Raw terminal event.
    Terminal(Event),
    /// One reveal step is due.
    Reveal,
    /// A job task was spawned.
    JobStarted {
        id: JobId,
        cancel: CancellationToken,
    },
    /// A job task produced its display text.
    JobFinished { id: JobId, text: String },
}
