//! Ownership of the real terminal.

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// The terminal in raw mode on the alternate screen.
///
/// Restored by [`Surface::release`], or on drop if an error unwinds past it.
pub struct Surface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    released: bool,
}

impl Surface {
    /// Switches the terminal into raw mode and the alternate screen.
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(e);
            }
        };

        // From here on, dropping the surface restores the terminal.
        let mut surface = Self {
            terminal,
            released: false,
        };
        surface.terminal.hide_cursor()?;

        Ok(surface)
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Leaves the alternate screen and restores the cursor.
    pub fn release(mut self) -> io::Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
