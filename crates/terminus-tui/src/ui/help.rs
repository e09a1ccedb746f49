//! Help overlay widget.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Widget};
use terminus_core::ModeScope;
use terminus_modal::{HelpGroup, KeyTable, Platform};

use crate::theme::Theme;

/// Width of the key column.
const KEY_WIDTH: usize = 16;

/// Help overlay listing the keybinding table by category.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
    table: &'a KeyTable,
    platform: Platform,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme, table: &'a KeyTable, platform: Platform) -> Self {
        Self {
            theme,
            table,
            platform,
        }
    }

    fn render_column(&self, groups: &[&HelpGroup], area: Rect, buf: &mut Buffer) {
        let bottom = area.y + area.height;
        let mut y = area.y;

        for group in groups {
            if y >= bottom {
                break;
            }
            let title = Line::from(Span::styled(
                group.category,
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::BOLD),
            ));
            buf.set_line(area.x, y, &title, area.width);
            y += 1;

            for binding in &group.items {
                if y >= bottom {
                    break;
                }
                let keys = binding.key_labels(self.platform);
                let scope = match binding.mode {
                    ModeScope::All => String::new(),
                    ModeScope::Only(mode) => format!(" [{}]", mode.label()),
                };
                let desc_style = if binding.implemented {
                    self.theme.help_desc
                } else {
                    self.theme.help_desc.add_modifier(Modifier::CROSSED_OUT)
                };

                let line = Line::from(vec![
                    Span::styled(format!("{keys:>KEY_WIDTH$}"), self.theme.help_key),
                    Span::styled(format!(" {}", binding.desc), desc_style),
                    Span::styled(scope, Style::new().fg(self.theme.muted)),
                ]);
                buf.set_line(area.x, y, &line, area.width);
                y += 1;
            }

            y += 1;
        }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_width = 100.min(area.width.saturating_sub(4));
        let popup_height = 40.min(area.height.saturating_sub(2));

        let popup_x = (area.width.saturating_sub(popup_width)) / 2 + area.x;
        let popup_y = (area.height.saturating_sub(popup_height)) / 2 + area.y;
        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(" Help - any key to close ")
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let [left_col, right_col] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(inner);

        // Categories alternate between columns, keeping table order.
        let groups = self.table.help_groups();
        let (left, right): (Vec<_>, Vec<_>) = groups
            .iter()
            .enumerate()
            .partition(|(i, _)| i % 2 == 0);
        let left: Vec<_> = left.into_iter().map(|(_, g)| g).collect();
        let right: Vec<_> = right.into_iter().map(|(_, g)| g).collect();

        self.render_column(&left, left_col, buf);
        self.render_column(&right, right_col, buf);
    }
}
