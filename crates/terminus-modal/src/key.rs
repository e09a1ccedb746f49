//! Raw key events and platform-aware key labels.

use strum::{Display, EnumString};

/// Prefix marking a Ctrl-modified key in the keybinding table.
pub const CTRL_PREFIX: &str = "C-";

/// A key event as sent by the presentation layer.
///
/// `key` uses DOM-style names: single printable characters (`"j"`, `"G"`,
/// `"/"`), and named keys such as `"Enter"`, `"Esc"`, `"Space"`,
/// `"ArrowDown"`, `"F2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    /// A key pressed without Ctrl.
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
        }
    }

    /// A key pressed with Ctrl.
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
        }
    }

    /// The form used to look this key up in the table: `"C-x"` for Ctrl
    /// chords, the raw key otherwise. Ctrl letters match regardless of
    /// Shift.
    pub fn match_key(&self) -> String {
        if !self.ctrl {
            return self.key.clone();
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => format!("{CTRL_PREFIX}{}", c.to_ascii_lowercase()),
            _ => format!("{CTRL_PREFIX}{}", self.key),
        }
    }

    /// The character this key types into a text buffer, if any.
    pub fn printable(&self) -> Option<char> {
        if self.ctrl {
            return None;
        }
        if self.key == "Space" {
            return Some(' ');
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Platform family, for rendering the Ctrl modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    #[strum(to_string = "macos", serialize = "mac", serialize = "darwin")]
    Mac,
    #[strum(serialize = "linux")]
    Linux,
    #[strum(serialize = "windows")]
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Whether Ctrl chords render with the command glyph.
    pub fn is_mac(self) -> bool {
        self == Self::Mac
    }
}

/// Render a table key for display: `"C-x"` becomes `"⌘+X"` on macOS and
/// `"Ctrl+X"` elsewhere. Other keys are returned unchanged.
pub fn normalize_key_label(key: &str, platform: Platform) -> String {
    match key.strip_prefix(CTRL_PREFIX) {
        Some(base) if !base.is_empty() => {
            let base = base.to_uppercase();
            if platform.is_mac() {
                format!("⌘+{base}")
            } else {
                format!("Ctrl+{base}")
            }
        }
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_key() {
        assert_eq!(KeyInput::plain("G").match_key(), "G");
        assert_eq!(KeyInput::ctrl("c").match_key(), "C-c");
        assert_eq!(KeyInput::ctrl("C").match_key(), "C-c");
        assert_eq!(KeyInput::ctrl("ArrowDown").match_key(), "C-ArrowDown");
    }

    #[test]
    fn test_printable() {
        assert_eq!(KeyInput::plain("a").printable(), Some('a'));
        assert_eq!(KeyInput::plain("Space").printable(), Some(' '));
        assert_eq!(KeyInput::plain("Enter").printable(), None);
        assert_eq!(KeyInput::ctrl("a").printable(), None);
    }

    #[test]
    fn test_normalize_key_label() {
        assert_eq!(normalize_key_label("C-x", Platform::Mac), "⌘+X");
        assert_eq!(normalize_key_label("C-x", Platform::Linux), "Ctrl+X");
        assert_eq!(normalize_key_label("C-x", Platform::Windows), "Ctrl+X");
        assert_eq!(normalize_key_label("Esc", Platform::Mac), "Esc");
        assert_eq!(normalize_key_label("C-", Platform::Linux), "C-");
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("darwin".parse::<Platform>(), Ok(Platform::Mac));
        assert_eq!("Linux".parse::<Platform>(), Ok(Platform::Linux));
        assert!("beos".parse::<Platform>().is_err());
    }
}
