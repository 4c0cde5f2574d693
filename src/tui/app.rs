//! The dashboard render loop.

use std::io;
use std::time::{Duration, Instant};

use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::queue::UpdateQueue;

use super::event::{Event, EventHandler, is_quit_key};
use super::render::render;
use super::state::DashboardState;

/// Owns the display slots and is their only writer.
///
/// The dashboard never spawns work and never talks to a metric source; it
/// only drains the update queue and repaints.
pub struct Dashboard {
    state: DashboardState,
}

impl Dashboard {
    /// Creates a dashboard that marks readings older than `stale_after` as
    /// stale.
    pub fn new(stale_after: Duration) -> Self {
        Self {
            state: DashboardState::new(stale_after),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Applies every pending reading, then repaints the whole surface.
    ///
    /// Returns how many readings were applied.
    pub fn render_tick<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        queue: &UpdateQueue,
    ) -> io::Result<usize> {
        let state = &mut self.state;
        let applied = queue.drain_and_apply(|reading| state.apply(reading));

        let now = Instant::now();
        terminal.draw(|frame| render(frame, &self.state, now))?;
        Ok(applied)
    }

    /// Runs until a quit key is pressed, the event source closes, or `token`
    /// is cancelled.
    ///
    /// Cancellation is checked before every drain, so once it is observed no
    /// slot changes again. A quit key cancels `token` itself so the samplers
    /// follow.
    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        queue: &UpdateQueue,
        events: &EventHandler,
        token: &CancellationToken,
    ) -> io::Result<()> {
        if token.is_cancelled() {
            return Ok(());
        }
        self.render_tick(terminal, queue)?;

        while !token.is_cancelled() {
            match events.next() {
                Ok(Event::Key(key)) if is_quit_key(&key) => {
                    info!("quit requested");
                    token.cancel();
                    break;
                }
                Ok(Event::Key(_)) => continue,
                Ok(Event::Shutdown) => break,
                Ok(Event::Tick | Event::Updated | Event::Resize) => {}
                Err(_) => {
                    debug!("event channel closed");
                    token.cancel();
                    break;
                }
            }

            if token.is_cancelled() {
                break;
            }
            self.render_tick(terminal, queue)?;
        }

        Ok(())
    }
}
