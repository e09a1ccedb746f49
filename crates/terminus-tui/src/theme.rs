//! Color theme for the TUI.
//!
//! Dark and light variants over a slate palette with Tailwind CSS accents.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use terminus_core::Mode;

/// Theme variant (dark or light).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

/// Color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    pub variant: ThemeVariant,

    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Listing
    pub cursor: Style,
    pub directory: Style,
    pub file: Style,
    pub unreadable: Style,
    /// Entries in the VISUAL selection.
    pub selected: Style,
    /// Entries staged for a cut.
    pub cut: Style,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Chrome
    pub border: Style,
    pub title: Style,
    pub help_key: Style,
    pub help_desc: Style,
    pub header: Style,
    pub footer: Style,
    pub prompt: Style,
    pub input: Style,
    pub caret: Style,
}

impl Theme {
    /// Dark theme using a slate-based palette.
    pub fn dark() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_300 = Color::Rgb(203, 213, 225);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        let blue_400 = Color::Rgb(96, 165, 250);
        let blue_500 = Color::Rgb(59, 130, 246);
        let green_500 = Color::Rgb(34, 197, 94);
        let yellow_500 = Color::Rgb(234, 179, 8);
        let red_500 = Color::Rgb(239, 68, 68);
        let amber_500 = Color::Rgb(245, 158, 11);

        Self {
            variant: ThemeVariant::Dark,
            background: slate_900,
            foreground: slate_100,
            muted: slate_500,

            cursor: Style::new().bg(slate_700).fg(slate_50).add_modifier(Modifier::BOLD),
            directory: Style::new().fg(blue_500).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_300),
            unreadable: Style::new().fg(red_500).add_modifier(Modifier::ITALIC),
            selected: Style::new().fg(amber_500).add_modifier(Modifier::BOLD),
            cut: Style::new().fg(slate_500).add_modifier(Modifier::CROSSED_OUT),

            success: green_500,
            warning: yellow_500,
            error: red_500,
            info: blue_400,

            border: Style::new().fg(slate_600),
            title: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_400),
            header: Style::new().bg(slate_800).fg(slate_100),
            footer: Style::new().bg(slate_800).fg(slate_400),
            prompt: Style::new().fg(blue_400).add_modifier(Modifier::BOLD),
            input: Style::new().fg(slate_100),
            caret: Style::new().add_modifier(Modifier::REVERSED),
        }
    }

    /// Light theme using a slate-based palette.
    pub fn light() -> Self {
        let slate_50 = Color::Rgb(248, 250, 252);
        let slate_100 = Color::Rgb(241, 245, 249);
        let slate_200 = Color::Rgb(226, 232, 240);
        let slate_400 = Color::Rgb(148, 163, 184);
        let slate_500 = Color::Rgb(100, 116, 139);
        let slate_600 = Color::Rgb(71, 85, 105);
        let slate_700 = Color::Rgb(51, 65, 85);
        let slate_800 = Color::Rgb(30, 41, 59);
        let slate_900 = Color::Rgb(15, 23, 42);

        let blue_600 = Color::Rgb(37, 99, 235);
        let blue_700 = Color::Rgb(29, 78, 216);
        let green_600 = Color::Rgb(22, 163, 74);
        let yellow_600 = Color::Rgb(202, 138, 4);
        let red_600 = Color::Rgb(220, 38, 38);
        let amber_600 = Color::Rgb(217, 119, 6);

        Self {
            variant: ThemeVariant::Light,
            background: slate_50,
            foreground: slate_900,
            muted: slate_500,

            cursor: Style::new().bg(slate_200).fg(slate_900).add_modifier(Modifier::BOLD),
            directory: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            file: Style::new().fg(slate_700),
            unreadable: Style::new().fg(red_600).add_modifier(Modifier::ITALIC),
            selected: Style::new().fg(amber_600).add_modifier(Modifier::BOLD),
            cut: Style::new().fg(slate_400).add_modifier(Modifier::CROSSED_OUT),

            success: green_600,
            warning: yellow_600,
            error: red_600,
            info: blue_600,

            border: Style::new().fg(slate_400),
            title: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(slate_600),
            header: Style::new().bg(slate_100).fg(slate_800),
            footer: Style::new().bg(slate_100).fg(slate_600),
            prompt: Style::new().fg(blue_700).add_modifier(Modifier::BOLD),
            input: Style::new().fg(slate_900),
            caret: Style::new().add_modifier(Modifier::REVERSED),
        }
    }

    /// Create theme from variant.
    pub fn from_variant(variant: ThemeVariant) -> Self {
        match variant {
            ThemeVariant::Dark => Self::dark(),
            ThemeVariant::Light => Self::light(),
        }
    }

    /// Badge style for the mode indicator.
    pub fn mode_badge(&self, mode: Mode) -> Style {
        let bg = match mode {
            Mode::Normal => self.info,
            Mode::Insert => self.success,
            Mode::Visual => self.warning,
            Mode::Filter | Mode::Search => self.error,
        };
        Style::new()
            .bg(bg)
            .fg(self.background)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
