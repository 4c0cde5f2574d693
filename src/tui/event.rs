//! Event handling for the dashboard.
//!
//! Terminal input is polled on a separate thread; samplers reach the same
//! channel through [`EventWaker`], so the render loop blocks on one receiver.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use tracing::{debug, error};

use crate::cancel::CancellationToken;
use crate::queue::Wake;

/// Render loop events.
#[derive(Debug)]
pub enum Event {
    /// Redraw cadence elapsed without input.
    Tick,
    /// The update queue has pending readings.
    Updated,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize.
    Resize,
    /// The cancellation token fired outside the render loop.
    Shutdown,
}

/// Single receiver for everything the render loop reacts to.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
}

impl EventHandler {
    /// Creates a handler fed by a terminal input thread.
    ///
    /// The thread sends [`Event::Tick`] every `tick_rate` without input and
    /// [`Event::Shutdown`] once `token` is cancelled, then exits.
    pub fn new(tick_rate: Duration, token: CancellationToken) -> io::Result<Self> {
        let handler = Self::manual();
        let event_tx = handler.tx.clone();

        thread::Builder::new()
            .name("input".into())
            .spawn(move || run_input(tick_rate, &token, &event_tx, read_terminal))?;

        Ok(handler)
    }

    /// Creates a handler with no input thread; events arrive only through
    /// [`EventHandler::sender`] and the waker.
    pub fn manual() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// A waker for the update queue that posts [`Event::Updated`].
    pub fn waker(&self) -> EventWaker {
        EventWaker {
            tx: self.tx.clone(),
        }
    }

    /// Receives the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }
}

/// Waits up to `tick_rate` for terminal input.
///
/// `Ok(None)` means input arrived that the dashboard ignores.
fn read_terminal(tick_rate: Duration) -> io::Result<Option<Event>> {
    if !event::poll(tick_rate)? {
        return Ok(Some(Event::Tick));
    }
    Ok(match event::read()? {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
        CrosstermEvent::Resize(_, _) => Some(Event::Resize),
        _ => None,
    })
}

/// Forwards input until `token` is cancelled, the receiver is gone, or the
/// terminal fails. Cancellation and terminal failure both end with
/// [`Event::Shutdown`].
fn run_input<R>(tick_rate: Duration, token: &CancellationToken, tx: &Sender<Event>, mut read: R)
where
    R: FnMut(Duration) -> io::Result<Option<Event>>,
{
    loop {
        if token.is_cancelled() {
            let _ = tx.send(Event::Shutdown);
            break;
        }

        let event = match read(tick_rate) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "terminal input failed, shutting down");
                let _ = tx.send(Event::Shutdown);
                break;
            }
        };

        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("input thread stopped");
}

/// Wakes the render loop when readings are queued.
#[derive(Clone)]
pub struct EventWaker {
    tx: Sender<Event>,
}

impl Wake for EventWaker {
    fn wake(&self) {
        // The render loop may already be gone during shutdown.
        let _ = self.tx.send(Event::Updated);
    }
}

/// Keys that end the session: `q`, `Esc` and `Ctrl-C` (raw mode swallows
/// SIGINT, so it arrives as a key).
pub fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
