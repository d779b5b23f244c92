//! Line editor keybindings.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::core::input::matches_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineAction {
    CursorLeft,
    CursorRight,
    CursorWordLeft,
    CursorWordRight,
    CursorLineStart,
    CursorLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    DeleteToLineEnd,
    HistoryPrev,
    HistoryNext,
    Submit,
    Interrupt,
    EndOfInput,
    ToggleMode,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineKeybindingsConfig {
    entries: HashMap<LineAction, KeyBinding>,
}

impl LineKeybindingsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: LineAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

fn keys(ids: &[&str]) -> Vec<KeyId> {
    ids.iter().map(|id| id.to_string()).collect()
}

pub static DEFAULT_LINE_KEYBINDINGS: Lazy<HashMap<LineAction, Vec<KeyId>>> = Lazy::new(|| {
    use LineAction::*;

    let mut map = HashMap::new();
    map.insert(CursorLeft, keys(&["left", "ctrl+b"]));
    map.insert(CursorRight, keys(&["right", "ctrl+f"]));
    map.insert(CursorWordLeft, keys(&["alt+left", "ctrl+left", "alt+b"]));
    map.insert(CursorWordRight, keys(&["alt+right", "ctrl+right", "alt+f"]));
    map.insert(CursorLineStart, keys(&["home", "ctrl+a"]));
    map.insert(CursorLineEnd, keys(&["end", "ctrl+e"]));
    map.insert(DeleteCharBackward, keys(&["backspace"]));
    map.insert(DeleteCharForward, keys(&["delete"]));
    map.insert(DeleteWordBackward, keys(&["ctrl+w", "alt+backspace"]));
    map.insert(DeleteToLineStart, keys(&["ctrl+u"]));
    map.insert(DeleteToLineEnd, keys(&["ctrl+k"]));
    map.insert(HistoryPrev, keys(&["up", "ctrl+p"]));
    map.insert(HistoryNext, keys(&["down", "ctrl+n"]));
    map.insert(Submit, keys(&["enter"]));
    map.insert(Interrupt, keys(&["ctrl+c"]));
    map.insert(EndOfInput, keys(&["ctrl+d"]));
    map.insert(ToggleMode, keys(&["ctrl+space"]));

    map
});

/// Maps raw key sequences to [`LineAction`]s, defaults first, overrides on top.
#[derive(Debug, Clone)]
pub struct LineKeybindingsManager {
    action_to_keys: HashMap<LineAction, Vec<KeyId>>,
}

impl Default for LineKeybindingsManager {
    fn default() -> Self {
        Self::new(LineKeybindingsConfig::default())
    }
}

impl LineKeybindingsManager {
    pub fn new(config: LineKeybindingsConfig) -> Self {
        let mut manager = Self {
            action_to_keys: HashMap::new(),
        };
        manager.build_maps(&config);
        manager
    }

    /// Defaults with the mode toggle rebound to `toggle_key`.
    pub fn with_toggle_key(toggle_key: &str) -> Self {
        let mut config = LineKeybindingsConfig::new();
        config.set(LineAction::ToggleMode, toggle_key);
        Self::new(config)
    }

    fn build_maps(&mut self, config: &LineKeybindingsConfig) {
        self.action_to_keys.clear();

        for (action, keys) in DEFAULT_LINE_KEYBINDINGS.iter() {
            self.action_to_keys.insert(*action, keys.clone());
        }

        for (action, binding) in config.entries.iter() {
            let key_list = match binding {
                KeyBinding::Single(key) => vec![key.clone()],
                KeyBinding::Multiple(keys) => keys.clone(),
            };
            self.action_to_keys.insert(*action, key_list);
        }
    }

    pub fn matches(&self, data: &str, action: LineAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| matches_key(data, key)))
    }

    /// First action bound to `data`. The mode toggle is checked before
    /// editing actions so it wins when a user rebinds it onto an editing key.
    pub fn action_for(&self, data: &str) -> Option<LineAction> {
        use LineAction::*;

        const ORDER: [LineAction; 17] = [
            ToggleMode,
            Submit,
            Interrupt,
            EndOfInput,
            HistoryPrev,
            HistoryNext,
            CursorWordLeft,
            CursorWordRight,
            CursorLeft,
            CursorRight,
            CursorLineStart,
            CursorLineEnd,
            DeleteWordBackward,
            DeleteCharBackward,
            DeleteCharForward,
            DeleteToLineStart,
            DeleteToLineEnd,
        ];
        ORDER.into_iter().find(|action| self.matches(data, *action))
    }

    pub fn get_keys(&self, action: LineAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }

    pub fn set_config(&mut self, config: LineKeybindingsConfig) {
        self.build_maps(&config);
    }
}
