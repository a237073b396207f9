//! Raw-mode terminal ownership.
//!
//! [`Tui::start`] takes over the terminal; dropping the handle, or a panic
//! anywhere in the app, gives it back.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Switch to raw mode on the alternate screen with the cursor hidden.
    pub fn start() -> Result<Self> {
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        out.execute(EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        restore();
    }
}

/// Best effort: every step runs even if an earlier one failed.
fn restore() {
    let mut out = stdout();
    let _ = out.execute(cursor::Show);
    let _ = out.execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Route panics and eyre reports through [`restore`] first so they print on
/// a sane terminal. Call before [`Tui::start`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        panic_hook(info);
    }));
    Ok(())
}
