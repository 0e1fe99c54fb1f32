//! Application state.
//!
//! ```text
//! AppState
//! ├── session: Session      (transcript, typewriter, job slot, queue)
//! ├── input: InputState     (line editor, history)
//! ├── scroll: ScrollState   (transcript viewport)
//! ├── notice: Option<String> (one-shot status line message)
//! └── job: Option<ActiveJob> (cancel handle of the in-flight task)
//! ```
//!
//! Mutated only by the reducer in `update.rs`.

use ledger_core::config::Config;
use ledger_core::dispatch::Dispatcher;
use ledger_core::session::{JobId, Session};
use tokio_util::sync::CancellationToken;

use crate::input::InputState;

/// Lines moved per mouse wheel notch.
pub const WHEEL_STEP: usize = 3;

/// Transcript scroll position, measured in wrapped lines from the bottom.
#[derive(Debug, Default, Clone)]
pub struct ScrollState {
    from_bottom: usize,
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.from_bottom == 0
    }

    pub fn from_bottom(&self) -> usize {
        self.from_bottom
    }

    /// Scrolls towards older lines. The renderer clamps the result.
    pub fn scroll_up(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_sub(lines);
    }

    /// Sticks to the newest line.
    pub fn follow(&mut self) {
        self.from_bottom = 0;
    }
}

/// Spawned job task.
#[derive(Debug, Clone)]
pub struct ActiveJob {
    pub id: JobId,
    pub cancel: CancellationToken,
}

pub struct AppState {
    pub session: Session,
    pub input: InputState,
    pub scroll: ScrollState,
    /// Shown in the status line until the next submission.
    pub notice: Option<String>,
    pub job: Option<ActiveJob>,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub width: u16,
    pub height: u16,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_session(Session::new(Dispatcher::from_config(config)))
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            input: InputState::new(),
            scroll: ScrollState::default(),
            notice: None,
            job: None,
            should_quit: false,
            spinner_frame: 0,
            width: 0,
            height: 0,
        }
    }

    /// Transcript rows visible at once, used for page scrolling.
    pub fn page_size(&self) -> usize {
        usize::from(self.height.saturating_sub(crate::render::CHROME_HEIGHT)).max(1)
    }
}
