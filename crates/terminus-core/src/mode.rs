//! Input modes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Interpretation context for keyboard input. Exactly one is active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Browsing. Initial mode and the target of every cancellation.
    #[default]
    Normal,
    /// Renaming the focused entry.
    Insert,
    /// Multi-selecting entries.
    Visual,
    /// Live-filtering the current listing.
    Filter,
    /// Recursive search below the current directory.
    Search,
}

impl Mode {
    /// Whether unbound printable keys edit a text buffer in this mode.
    pub fn accepts_text(self) -> bool {
        matches!(self, Self::Insert | Self::Filter | Self::Search)
    }

    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NOR",
            Self::Insert => "INS",
            Self::Visual => "VIS",
            Self::Filter => "FLT",
            Self::Search => "SRC",
        }
    }
}

/// Mode tag in the keybinding table: a single mode or every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeScope {
    All,
    Only(Mode),
}

impl ModeScope {
    /// Check whether a binding with this scope is live in `mode`.
    pub fn includes(self, mode: Mode) -> bool {
        match self {
            Self::All => true,
            Self::Only(m) => m == mode,
        }
    }
}

impl std::fmt::Display for ModeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Only(mode) => write!(f, "{mode}"),
        }
    }
}

/// A mode tag that is neither a known mode nor `ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown mode tag: '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for ModeScope {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ALL" {
            return Ok(Self::All);
        }
        Mode::from_str(s)
            .map(Self::Only)
            .map_err(|_| UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!("ALL".parse::<ModeScope>(), Ok(ModeScope::All));
        assert_eq!(
            "VISUAL".parse::<ModeScope>(),
            Ok(ModeScope::Only(Mode::Visual))
        );
        assert!("visual".parse::<ModeScope>().is_err());
        assert!("REPLACE".parse::<ModeScope>().is_err());
    }

    #[test]
    fn test_scope_includes() {
        assert!(ModeScope::All.includes(Mode::Search));
        assert!(ModeScope::Only(Mode::Insert).includes(Mode::Insert));
        assert!(!ModeScope::Only(Mode::Insert).includes(Mode::Normal));
    }
}
