//! Keybinding table and resolver.
//!
//! The table is a TOML document of `[[keybind]]` records. It is parsed and
//! validated once, up front: unknown mode tags, unknown action ids, empty
//! key lists and undeclared categories are errors rather than silent
//! fallthroughs. Resolution is then a pure `(key, mode)` lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use terminus_core::{Mode, ModeScope};
use thiserror::Error;
use tracing::debug;

use crate::key::{normalize_key_label, KeyInput, Platform};

/// The built-in table, compiled into the binary.
pub const BUILTIN_KEYBINDS: &str = include_str!("../keybinds.toml");

/// Actions a key can be bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ActionId {
    // Navigation
    MoveDown,
    MoveUp,
    Open,
    Parent,
    Top,
    Bottom,
    Home,

    // File operations
    Copy,
    Cut,
    Paste,
    Delete,

    // Modes
    Rename,
    RenameCommit,
    RenameCancel,
    CutCancel,
    Visual,
    VisualCancel,
    ToggleSelect,

    // Filter & search
    Filter,
    FilterExit,
    Search,
    SearchCancel,
    SearchNext,
    SearchPrev,
    Reveal,

    // Misc
    Help,
    Quit,
}

/// Errors raised while loading a keybinding table.
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("Failed to parse keybinding table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read keybinding table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keybinding '{id}' has unknown mode tag '{tag}'")]
    UnknownMode { id: String, tag: String },

    #[error("Unknown action id '{id}'")]
    UnknownAction { id: String },

    #[error("Keybinding '{id}' has no keys")]
    EmptyKeys { id: String },

    #[error("Keybinding '{id}' uses undeclared category '{category}'")]
    UnknownCategory { id: String, category: String },
}

#[derive(Debug, Deserialize)]
struct RawTable {
    categories: Vec<String>,
    #[serde(rename = "keybind", default)]
    keybinds: Vec<RawBinding>,
}

#[derive(Debug, Deserialize)]
struct RawBinding {
    id: String,
    keys: Vec<String>,
    #[serde(default)]
    desc: String,
    category: String,
    mode: String,
    #[serde(default = "default_implemented")]
    implemented: bool,
}

fn default_implemented() -> bool {
    true
}

/// One validated table record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// The id as written in the table.
    pub id: String,
    /// The bound action. `None` only for entries marked not implemented.
    #[serde(skip)]
    pub action: Option<ActionId>,
    pub keys: Vec<String>,
    pub desc: String,
    pub category: String,
    #[serde(serialize_with = "serialize_scope")]
    pub mode: ModeScope,
    pub implemented: bool,
}

fn serialize_scope<S: serde::Serializer>(scope: &ModeScope, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(scope)
}

impl Binding {
    /// Keys rendered for `platform`, joined for display.
    pub fn key_labels(&self, platform: Platform) -> String {
        self.keys
            .iter()
            .map(|k| normalize_key_label(k, platform))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Outcome of resolving one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched {
        action: ActionId,
        /// The pressed key rendered for the platform.
        label: String,
        desc: String,
    },
    Unrecognized,
}

/// Bindings of one help category, in table order.
#[derive(Debug, Clone)]
pub struct HelpGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a Binding>,
}

/// A validated keybinding table with a key index.
#[derive(Debug, Clone)]
pub struct KeyTable {
    categories: Vec<String>,
    bindings: Vec<Binding>,
    /// Key to binding indices, in table order.
    index: HashMap<String, Vec<usize>>,
}

impl KeyTable {
    /// Load the built-in table.
    pub fn builtin() -> Result<Self, KeymapError> {
        Self::from_toml(BUILTIN_KEYBINDS)
    }

    /// Load a table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, KeymapError> {
        let text = std::fs::read_to_string(path).map_err(|source| KeymapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a table.
    pub fn from_toml(text: &str) -> Result<Self, KeymapError> {
        let raw: RawTable = toml::from_str(text)?;

        let mut bindings = Vec::with_capacity(raw.keybinds.len());
        for entry in raw.keybinds {
            let mode = ModeScope::from_str(&entry.mode).map_err(|_| KeymapError::UnknownMode {
                id: entry.id.clone(),
                tag: entry.mode.clone(),
            })?;
            if entry.keys.is_empty() || entry.keys.iter().any(String::is_empty) {
                return Err(KeymapError::EmptyKeys { id: entry.id });
            }
            if !raw.categories.contains(&entry.category) {
                return Err(KeymapError::UnknownCategory {
                    id: entry.id,
                    category: entry.category,
                });
            }
            // Entries that are listed but not wired may name future actions.
            let action = match ActionId::from_str(&entry.id) {
                Ok(action) => Some(action),
                Err(_) if !entry.implemented => None,
                Err(_) => return Err(KeymapError::UnknownAction { id: entry.id }),
            };

            bindings.push(Binding {
                id: entry.id,
                action,
                keys: entry.keys,
                desc: entry.desc,
                category: entry.category,
                mode,
                implemented: entry.implemented,
            });
        }

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, binding) in bindings.iter().enumerate() {
            for key in &binding.keys {
                index.entry(key.clone()).or_default().push(i);
            }
        }

        debug!(
            bindings = bindings.len(),
            keys = index.len(),
            "loaded keybinding table"
        );
        Ok(Self {
            categories: raw.categories,
            bindings,
            index,
        })
    }

    /// First implemented binding for `key` that is live in `mode`.
    pub fn lookup(&self, key: &str, mode: Mode) -> Option<&Binding> {
        self.index
            .get(key)?
            .iter()
            .map(|&i| &self.bindings[i])
            .find(|b| b.implemented && b.mode.includes(mode))
    }

    /// Resolve a raw key event.
    pub fn lookup_input(&self, input: &KeyInput, mode: Mode) -> Option<&Binding> {
        self.lookup(&input.match_key(), mode)
    }

    /// Resolve `key` in `mode`, with a label for `platform`.
    pub fn resolve(&self, key: &str, mode: Mode, platform: Platform) -> Resolution {
        match self.lookup(key, mode) {
            Some(Binding {
                action: Some(action),
                desc,
                ..
            }) => Resolution::Matched {
                action: *action,
                label: normalize_key_label(key, platform),
                desc: desc.clone(),
            },
            _ => Resolution::Unrecognized,
        }
    }

    /// Bindings grouped by category, in the table's category order.
    pub fn help_groups(&self) -> Vec<HelpGroup<'_>> {
        self.categories
            .iter()
            .map(|category| HelpGroup {
                category,
                items: self
                    .bindings
                    .iter()
                    .filter(|b| &b.category == category)
                    .collect(),
            })
            .collect()
    }

    /// Every binding in table order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Declared categories in order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
categories = ["Nav"]

[[keybind]]
id = "move-down"
keys = ["j"]
desc = "down"
category = "Nav"
mode = "NORMAL"
"#;

    #[test]
    fn test_builtin_table_loads() {
        let table = KeyTable::builtin().unwrap();
        assert!(!table.bindings().is_empty());
        assert_eq!(table.categories()[0], "Navigation");
    }

    #[test]
    fn test_minimal_table() {
        let table = KeyTable::from_toml(MINIMAL).unwrap();
        assert_eq!(
            table.lookup("j", Mode::Normal).and_then(|b| b.action),
            Some(ActionId::MoveDown)
        );
        assert!(table.lookup("j", Mode::Insert).is_none());
    }

    #[test]
    fn test_rejects_unknown_mode_tag() {
        let text = MINIMAL.replace("mode = \"NORMAL\"", "mode = \"REPLACE\"");
        assert!(matches!(
            KeyTable::from_toml(&text),
            Err(KeymapError::UnknownMode { ref tag, .. }) if tag == "REPLACE"
        ));
    }

    #[test]
    fn test_rejects_unknown_action_and_empty_keys() {
        let text = MINIMAL.replace("move-down", "teleport");
        assert!(matches!(
            KeyTable::from_toml(&text),
            Err(KeymapError::UnknownAction { .. })
        ));

        let text = MINIMAL.replace("keys = [\"j\"]", "keys = []");
        assert!(matches!(
            KeyTable::from_toml(&text),
            Err(KeymapError::EmptyKeys { .. })
        ));
    }

    #[test]
    fn test_rejects_undeclared_category() {
        let text = MINIMAL.replace("category = \"Nav\"", "category = \"Other\"");
        assert!(matches!(
            KeyTable::from_toml(&text),
            Err(KeymapError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_unimplemented_entries_never_resolve() {
        let text = format!(
            "{MINIMAL}\n[[keybind]]\nid = \"trash\"\nkeys = [\"D\"]\ncategory = \"Nav\"\nmode = \"NORMAL\"\nimplemented = false\n"
        );
        let table = KeyTable::from_toml(&text).unwrap();
        assert!(table.lookup("D", Mode::Normal).is_none());
        assert_eq!(table.help_groups()[0].items.len(), 2);
    }
}
