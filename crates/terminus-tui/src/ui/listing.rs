//! The directory listing.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use terminus_core::{Entry, Mode};
use terminus_modal::ModalState;
use terminus_ops::ClipboardMode;

use crate::theme::Theme;
use crate::ui::{format_size, format_time};

/// Width of the size column.
const SIZE_WIDTH: usize = 10;
/// Width of the modified-time column.
const TIME_WIDTH: usize = 16;

/// The visible entries of the current directory with the cursor.
pub struct ListingView<'a> {
    theme: &'a Theme,
    state: &'a ModalState,
}

impl<'a> ListingView<'a> {
    pub fn new(theme: &'a Theme, state: &'a ModalState) -> Self {
        Self { theme, state }
    }

    fn entry_line(&self, entry: &Entry, focused: bool, width: usize) -> Line<'a> {
        let state = self.state;
        let selected = state.is_selected(&entry.path);
        let cut = state.clipboard().mode() == ClipboardMode::Cut
            && state.clipboard().contains(&entry.path);

        let marker = if selected {
            "+ "
        } else if state.clipboard().contains(&entry.path) {
            "> "
        } else {
            "  "
        };

        let mut name = entry.name.to_string();
        if entry.is_directory {
            name.push('/');
        }

        let name_style = if entry.has_error() {
            self.theme.unreadable
        } else if cut {
            self.theme.cut
        } else if selected {
            self.theme.selected
        } else if entry.is_directory {
            self.theme.directory
        } else {
            self.theme.file
        };

        let size = if entry.is_file {
            format_size(entry.size)
        } else {
            String::new()
        };
        let time = entry
            .timestamps
            .modified
            .map(format_time)
            .unwrap_or_default();
        let columns = format!(" {size:>SIZE_WIDTH$} {time:>TIME_WIDTH$}");

        let name_width = width
            .saturating_sub(marker.len())
            .saturating_sub(columns.chars().count());
        let name = truncate(&name, name_width);
        let padding = name_width.saturating_sub(name.chars().count());

        let line = Line::from(vec![
            Span::styled(marker, self.theme.selected),
            Span::styled(name, name_style),
            Span::raw(" ".repeat(padding)),
            Span::styled(columns, Style::new().fg(self.theme.muted)),
        ]);

        if focused {
            line.style(self.theme.cursor)
        } else {
            line
        }
    }
}

impl Widget for ListingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let title = match state.mode() {
            Mode::Filter => format!(" {} of {} ", state.visible_len(), state.entries().len()),
            _ => format!(" {} ", state.entries().len()),
        };
        let block = Block::default()
            .title(title)
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        let inner = block.inner(area);
        block.render(area, buf);

        if state.visible_len() == 0 {
            let message = if state.entries().is_empty() {
                "Empty directory"
            } else {
                "No matches"
            };
            Paragraph::new(Line::styled(message, Style::new().fg(self.theme.muted)))
                .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(state.cursor(), height);
        let lines: Vec<Line> = state
            .visible()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, entry)| self.entry_line(entry, i == state.cursor(), inner.width as usize))
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

/// First visible row so that `cursor` stays on screen.
pub(crate) fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor.saturating_sub(height - 1)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('~');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(5, 0), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("report.txt", 20), "report.txt");
        assert_eq!(truncate("report.txt", 5), "repo~");
        assert_eq!(truncate("report.txt", 0), "");
    }
}
