//! Terminal trait and lifecycle helpers.

use std::io;

/// Blocking terminal interface used by the line editor.
pub trait Terminal {
    /// Enter raw mode.
    fn start(&mut self) -> io::Result<()>;

    /// Leave raw mode and restore the saved state.
    fn stop(&mut self) -> io::Result<()>;

    /// Block until input arrives. `Ok(None)` means the input stream closed.
    fn read_input(&mut self) -> io::Result<Option<String>>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str) -> io::Result<()>;

    /// Terminal width in columns.
    fn columns(&self) -> u16;
}

/// RAII guard that stops the terminal on drop.
pub struct TerminalGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
}

impl<'a, T: Terminal + ?Sized> TerminalGuard<'a, T> {
    /// Starts `terminal`; it is stopped again when the guard drops.
    pub fn start(terminal: &'a mut T) -> io::Result<Self> {
        terminal.start()?;
        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for TerminalGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.terminal.stop();
    }
}
