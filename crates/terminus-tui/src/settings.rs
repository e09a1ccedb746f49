//! Persistent user settings.

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use terminus_core::ListingConfig;
use terminus_modal::{CaretPolicy, KeyTable, KeymapError};
use terminus_ops::PastePolicy;
use terminus_scan::SearchConfig;
use tracing::{debug, warn};

use crate::theme::ThemeVariant;

/// Settings read from `settings.toml` in the user's config directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Directory listing options.
    pub listing: ListingConfig,
    /// Limits for SEARCH mode.
    pub search: SearchConfig,
    /// What a paste does when a destination name is taken.
    pub paste_conflict: PastePolicy,
    /// Where the caret starts when renaming.
    pub rename_caret: CaretPolicy,
    /// A keybinding table that replaces the built-in one.
    pub keybinds: Option<PathBuf>,
    /// Color theme.
    pub theme: ThemeVariant,
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("terminus").join("settings.toml"))
    }

    /// Load settings from the config file, falling back to defaults when it
    /// is missing or malformed.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).wrap_err_with(|| format!("Invalid settings in {}", path.display()))
    }

    /// Save settings to disk.
    pub fn save(&self) -> color_eyre::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("No config directory on this system"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).wrap_err("Failed to encode settings")?;
        std::fs::write(&path, content)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// The keybinding table these settings select.
    pub fn key_table(&self) -> Result<KeyTable, KeymapError> {
        match &self.keybinds {
            Some(path) => KeyTable::from_file(path),
            None => KeyTable::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let settings: UserSettings = toml::from_str("").unwrap();
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.paste_conflict, PastePolicy::Fail);
        assert_eq!(settings.rename_caret, CaretPolicy::Stem);
        assert!(settings.listing.dirs_first);
    }

    #[test]
    fn test_partial_settings() {
        let settings: UserSettings = toml::from_str(
            r#"
            paste_conflict = "rename"
            rename_caret = "end"
            theme = "light"

            [listing]
            show_hidden = true

            [search]
            max_results = 50
            "#,
        )
        .unwrap();

        assert_eq!(settings.paste_conflict, PastePolicy::AutoRename);
        assert_eq!(settings.rename_caret, CaretPolicy::End);
        assert_eq!(settings.theme, ThemeVariant::Light);
        assert!(settings.listing.show_hidden);
        assert!(settings.listing.dirs_first);
        assert_eq!(settings.search.max_results, 50);
        assert_eq!(settings.search.batch_size, 64);
    }

    #[test]
    fn test_load_from_file_and_custom_keybinds() {
        let dir = tempfile::tempdir().unwrap();
        let table_path = dir.path().join("keys.toml");
        std::fs::write(
            &table_path,
            r#"
            categories = ["Misc"]

            [[keybind]]
            id = "quit"
            keys = ["Q"]
            desc = "quit"
            category = "Misc"
            mode = "ALL"
            "#,
        )
        .unwrap();

        let settings_path = dir.path().join("settings.toml");
        std::fs::write(
            &settings_path,
            format!("keybinds = {:?}\n", table_path.display().to_string()),
        )
        .unwrap();

        let settings = UserSettings::load_from(&settings_path).unwrap();
        let table = settings.key_table().unwrap();
        assert_eq!(table.bindings().len(), 1);
        assert!(table.lookup("Q", terminus_core::Mode::Search).is_some());
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "paste_conflict = \"sometimes\"").unwrap();
        assert!(UserSettings::load_from(&path).is_err());
    }
}
