//! Listing configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct ListingConfig {
    /// Include hidden files (starting with .).
    #[builder(default = "false")]
    pub show_hidden: bool,

    /// List directories before files.
    #[builder(default = "true")]
    pub dirs_first: bool,

    /// Threads used to stat entries (0 = rayon default).
    #[builder(default = "0")]
    pub stat_concurrency: usize,
}

impl ListingConfig {
    /// Create a new listing config builder.
    pub fn builder() -> ListingConfigBuilder {
        ListingConfigBuilder::default()
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.show_hidden && name.starts_with('.')
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            dirs_first: true,
            stat_concurrency: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ListingConfig::builder()
            .show_hidden(true)
            .build()
            .unwrap();

        assert!(config.show_hidden);
        assert!(config.dirs_first);
    }

    #[test]
    fn test_should_skip_hidden() {
        let mut config = ListingConfig::default();

        // By default, hidden files are skipped
        assert!(config.should_skip_hidden(".git"));
        assert!(!config.should_skip_hidden("src"));

        config.show_hidden = true;
        assert!(!config.should_skip_hidden(".git"));
    }
}
