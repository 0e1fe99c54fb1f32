//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Spawned jobs send their `UiEvent`s to `inbox_tx`; the runtime drains
//! `inbox_rx` each loop iteration alongside terminal input and timers.

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ledger_core::config::Config;
use ledger_core::services::Services;
use ledger_core::session::JobTicket;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while something is moving (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Upper bound on reveal steps applied in one loop iteration.
const MAX_REVEAL_BURST: u32 = 64;

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    services: Arc<Services>,
    /// Delay between reveal steps.
    char_delay: Duration,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_reveal: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and switches the terminal into TUI mode.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: &Config, services: Services) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(config),
            services: Arc::new(services),
            char_delay: config.char_delay(),
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_reveal: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until quit.
    ///
    /// # Errors
    /// Returns an error on terminal I/O failure.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        self.event_loop()
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout-affecting size goes first.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                let marks_dirty = !matches!(&event, UiEvent::Frame { .. });

                let effects = update::update(&mut self.state, event);
                dirty |= marks_dirty;
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.session.is_busy() || recent_terminal_activity;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.collect_inbox_events(&mut events);
        self.collect_reveal_events(&mut events);

        let mut poll_duration = tick_interval.saturating_sub(self.last_tick.elapsed());
        if self.state.session.is_typing() {
            poll_duration = poll_duration.min(self.char_delay.saturating_sub(self.last_reveal.elapsed()));
        }
        if !events.is_empty() {
            poll_duration = Duration::ZERO;
        }

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    /// Drains all job results from the inbox.
    fn collect_inbox_events(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }
    }

    /// Emits one `Reveal` per elapsed `char_delay` while typing.
    fn collect_reveal_events(&mut self, events: &mut Vec<UiEvent>) {
        if !self.state.session.is_typing() {
            self.last_reveal = Instant::now();
            return;
        }

        let steps = reveal_steps_due(self.last_reveal.elapsed(), self.char_delay);
        if steps > 0 {
            events.extend((0..steps).map(|_| UiEvent::Reveal));
            self.last_reveal = Instant::now();
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(e) = open::that(&url) {
                    warn!(%url, "failed to open browser: {e}");
                }
            }
            UiEffect::SpawnJob(ticket) => self.spawn_job(ticket),
            UiEffect::CancelJob { token } => token.cancel(),
        }
    }

    /// Spawns a job with a `JobStarted`/`JobFinished` lifecycle.
    ///
    /// A cancelled job sends nothing back.
    fn spawn_job(&self, ticket: JobTicket) {
        let tx = self.inbox_tx.clone();
        let services = Arc::clone(&self.services);
        let cancel = CancellationToken::new();
        let _ = tx.send(UiEvent::JobStarted {
            id: ticket.id,
            cancel: cancel.clone(),
        });

        tokio::spawn(async move {
            let JobTicket { id, job } = ticket;
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(id, "job cancelled");
                }
                text = services.run(&job) => {
                    let _ = tx.send(UiEvent::JobFinished { id, text });
                }
            }
        });
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

/// Reveal steps owed after `elapsed`; a zero delay reveals in bursts.
pub fn reveal_steps_due(elapsed: Duration, char_delay: Duration) -> u32 {
    if char_delay.is_zero() {
        return MAX_REVEAL_BURST;
    }
    let due = elapsed.as_nanos() / char_delay.as_nanos();
    u32::try_from(due).unwrap_or(MAX_REVEAL_BURST).min(MAX_REVEAL_BURST)
}
