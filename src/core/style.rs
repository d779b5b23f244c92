//! ANSI SGR styling with a global on/off switch.

const RESET: &str = "\x1b[0m";

/// Wraps text in SGR codes when enabled, passes it through otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Palette {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn plain() -> Self {
        Self::new(false)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, sgr: &str, text: &str) -> String {
        if !self.enabled || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{sgr}m{text}{RESET}")
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    pub fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    pub fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    pub fn blue(&self, text: &str) -> String {
        self.paint("34", text)
    }

    pub fn magenta(&self, text: &str) -> String {
        self.paint("35", text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }
}
