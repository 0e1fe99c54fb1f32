//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ledger_core::session::SubmitOutcome;
use ledger_core::typing::TickOutcome;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::input::{self, InputAction};
use crate::state::{ActiveJob, AppState, WHEEL_STEP};

const BUSY_NOTICE: &str = "Busy: a request is already queued, input dropped";
const NO_LINK_NOTICE: &str = "No link to open";

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.width = width;
            app.height = height;
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Reveal => {
            if app.session.tick() == TickOutcome::Finished {
                return dequeue(app);
            }
            vec![]
        }
        UiEvent::JobStarted { id, cancel } => {
            if app.session.in_flight() == Some(id) {
                app.job = Some(ActiveJob { id, cancel });
                vec![]
            } else {
                // Cleared before the task reported in.
                vec![UiEffect::CancelJob { token: cancel }]
            }
        }
        UiEvent::JobFinished { id, text } => {
            if app.job.as_ref().is_some_and(|job| job.id == id) {
                app.job = None;
            }
            app.session.complete(id, text);
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            app.input.insert_str(&text);
            vec![]
        }
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => app.scroll.scroll_up(WHEEL_STEP),
                MouseEventKind::ScrollDown => app.scroll.scroll_down(WHEEL_STEP),
                _ => {}
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return vec![UiEffect::Quit],
        KeyCode::Char('c') if ctrl => return vec![UiEffect::Quit],
        KeyCode::Char('o') if ctrl => {
            return match app.session.transcript().last_link() {
                Some(url) => vec![UiEffect::OpenBrowser {
                    url: url.to_string(),
                }],
                None => {
                    app.notice = Some(NO_LINK_NOTICE.to_string());
                    vec![]
                }
            };
        }
        KeyCode::PageUp => {
            app.scroll.scroll_up(app.page_size());
            return vec![];
        }
        KeyCode::PageDown => {
            app.scroll.scroll_down(app.page_size());
            return vec![];
        }
        _ => {}
    }

    match input::handle_key(&mut app.input, key) {
        Some(InputAction::Submit(line)) => submit(app, &line),
        Some(InputAction::None) | None => vec![],
    }
}

fn submit(app: &mut AppState, line: &str) -> Vec<UiEffect> {
    app.notice = None;
    let outcome = app.session.submit(line);
    debug!(?outcome, "submitted");
    apply_outcome(app, outcome)
}

/// Starts the queued input once the session goes idle.
fn dequeue(app: &mut AppState) -> Vec<UiEffect> {
    match app.session.dequeue() {
        Some(outcome) => apply_outcome(app, outcome),
        None => vec![],
    }
}

fn apply_outcome(app: &mut AppState, outcome: SubmitOutcome) -> Vec<UiEffect> {
    match outcome {
        SubmitOutcome::Ignored | SubmitOutcome::Queued => vec![],
        SubmitOutcome::Busy => {
            app.notice = Some(BUSY_NOTICE.to_string());
            vec![]
        }
        SubmitOutcome::Started => {
            app.scroll.follow();
            vec![]
        }
        SubmitOutcome::Spawn(ticket) => {
            app.scroll.follow();
            vec![UiEffect::SpawnJob(ticket)]
        }
        SubmitOutcome::Cleared { abandoned } => {
            app.scroll.follow();
            match (abandoned, app.job.take()) {
                (Some(id), Some(job)) if job.id == id => {
                    vec![UiEffect::CancelJob { token: job.cancel }]
                }
                (_, job) => {
                    app.job = job;
                    vec![]
                }
            }
        }
    }
}
