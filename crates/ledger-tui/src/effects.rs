//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer never performs
//! either directly.
//!
//! Cancellation is decided by the reducer via `UiEffect::CancelJob`; the
//! runtime just calls `cancel()` on the token.

use ledger_core::session::JobTicket;
use tokio_util::sync::CancellationToken;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Run a dispatched job and report back with `UiEvent::JobFinished`.
    SpawnJob(JobTicket),

    /// Cancel an abandoned job.
    CancelJob { token: CancellationToken },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
