//! Process-based terminal implementation.

use std::io;

use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};

const READ_CHUNK: usize = 4096;
const DEFAULT_COLUMNS: u16 = 80;

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }
        return Err(io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => written += count.min(bytes.len() - written),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_columns(fd: c_int) -> Option<u16> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    (result == 0 && size.ws_col > 0).then_some(size.ws_col)
}

#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        // POLLHUP without POLLIN still means a read will return 0 (EOF).
        return Ok(result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0);
    }
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// True when both stdin and stdout are attached to a terminal.
#[cfg(unix)]
pub fn stdio_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 && libc::isatty(libc::STDOUT_FILENO) == 1 }
}

/// Splits `bytes` into the longest valid UTF-8 prefix and an incomplete tail.
/// Invalid sequences are replaced; only a truncated final character is held back.
fn decode_utf8_prefix(bytes: &[u8]) -> (String, Vec<u8>) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), Vec::new()),
        Err(err) if err.error_len().is_none() => {
            let valid = err.valid_up_to();
            (
                String::from_utf8_lossy(&bytes[..valid]).into_owned(),
                bytes[valid..].to_vec(),
            )
        }
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), Vec::new()),
    }
}

/// Raw-mode terminal on the process's stdin/stdout.
#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    raw: bool,
    pending: Vec<u8>,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO)
    }

    /// Terminal over explicit descriptors. The descriptors stay owned by the caller.
    pub fn with_fds(stdin_fd: c_int, stdout_fd: c_int) -> Self {
        Self {
            stdin_fd,
            stdout_fd,
            original_termios: None,
            raw: false,
            pending: Vec::new(),
        }
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        // Keep output post-processing so "\n" still returns the carriage.
        raw.c_oflag |= libc::OPOST;
        set_termios(self.stdin_fd, &raw)
    }

    fn restore_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.as_ref() {
            set_termios(self.stdin_fd, original)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self) -> io::Result<()> {
        if self.raw {
            return Ok(());
        }
        self.enable_raw_mode()?;
        self.raw = true;
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        if !self.raw {
            return Ok(());
        }
        self.raw = false;
        self.pending.clear();
        self.restore_raw_mode()
    }

    fn read_input(&mut self) -> io::Result<Option<String>> {
        let mut buffer = [0u8; READ_CHUNK];
        loop {
            if !poll_readable(self.stdin_fd, -1)? {
                continue;
            }
            let read_len =
                unsafe { libc::read(self.stdin_fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
            if read_len < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if read_len == 0 {
                return Ok(None);
            }

            self.pending.extend_from_slice(&buffer[..read_len as usize]);
            let (text, rest) = decode_utf8_prefix(&self.pending);
            self.pending = rest;
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        write_fd(self.stdout_fd, data)
    }

    fn columns(&self) -> u16 {
        read_columns(self.stdout_fd).unwrap_or(DEFAULT_COLUMNS)
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
