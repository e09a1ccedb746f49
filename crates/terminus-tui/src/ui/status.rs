//! Header, footer and the text input line.

use itertools::Itertools;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use terminus_core::Mode;
use terminus_modal::{ModalState, TextBuffer};
use terminus_ops::ClipboardMode;

use crate::theme::Theme;

/// Names of clipboard items shown before eliding the rest.
const CLIPBOARD_NAMES: usize = 3;

/// Mode badge, current directory and clipboard summary.
pub struct Header<'a> {
    theme: &'a Theme,
    state: &'a ModalState,
}

impl<'a> Header<'a> {
    pub fn new(theme: &'a Theme, state: &'a ModalState) -> Self {
        Self { theme, state }
    }

    fn clipboard_summary(&self) -> Option<String> {
        let clipboard = self.state.clipboard();
        let verb = match clipboard.mode() {
            ClipboardMode::Empty => return None,
            ClipboardMode::Copy => "copy",
            ClipboardMode::Cut => "cut",
        };
        let names = clipboard
            .items()
            .take(CLIPBOARD_NAMES)
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy())
            .join(", ");
        let more = clipboard.len().saturating_sub(CLIPBOARD_NAMES);
        Some(if more > 0 {
            format!("{verb}: {names} +{more} ")
        } else {
            format!("{verb}: {names} ")
        })
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.header);

        let mode = self.state.mode();
        let left = Line::from(vec![
            Span::styled(format!(" {} ", mode.label()), self.theme.mode_badge(mode)),
            Span::raw(" "),
            Span::styled(self.state.cwd().display().to_string(), self.theme.header),
        ]);
        Paragraph::new(left).render(area, buf);

        if let Some(summary) = self.clipboard_summary() {
            let right = Line::from(Span::styled(summary, Style::new().fg(self.theme.warning)))
                .right_aligned();
            Paragraph::new(right).render(area, buf);
        }
    }
}

/// The buffer of the active text mode with its caret.
pub struct InputLine<'a> {
    theme: &'a Theme,
    state: &'a ModalState,
}

impl<'a> InputLine<'a> {
    pub fn new(theme: &'a Theme, state: &'a ModalState) -> Self {
        Self { theme, state }
    }

    fn prompt_and_buffer(&self) -> Option<(&'static str, &'a TextBuffer)> {
        let state = self.state;
        match state.mode() {
            Mode::Insert => state
                .rename_session()
                .map(|session| ("rename: ", &session.buffer)),
            Mode::Filter => Some(("filter: ", state.filter_buffer())),
            Mode::Search => Some(("find: ", &state.search().query)),
            Mode::Normal | Mode::Visual => None,
        }
    }
}

impl Widget for InputLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((prompt, buffer)) = self.prompt_and_buffer() else {
            return;
        };
        Paragraph::new(caret_line(prompt, buffer, self.theme)).render(area, buf);
    }
}

/// Split a buffer at its caret, highlighting the character under it.
fn caret_line<'a>(prompt: &'static str, buffer: &'a TextBuffer, theme: &Theme) -> Line<'a> {
    let text = buffer.text();
    let (before, rest) = text.split_at(buffer.caret());
    let mut rest_chars = rest.chars();
    let (under, after) = match rest_chars.next() {
        Some(c) => (c.to_string(), rest_chars.as_str()),
        None => (" ".to_string(), ""),
    };

    Line::from(vec![
        Span::styled(prompt, theme.prompt),
        Span::styled(before, theme.input),
        Span::styled(under, theme.caret),
        Span::styled(after, theme.input),
    ])
}

/// Error, progress, status or a hint, in that order of priority.
pub struct Footer<'a> {
    theme: &'a Theme,
    state: &'a ModalState,
}

impl<'a> Footer<'a> {
    pub fn new(theme: &'a Theme, state: &'a ModalState) -> Self {
        Self { theme, state }
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.footer);
        let state = self.state;

        let line = if let Some(error) = state.last_error() {
            Line::from(Span::styled(
                format!(" {error}"),
                Style::new().fg(self.theme.error),
            ))
        } else if let Some(progress) = state.progress() {
            let current = progress
                .current
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let others = state.running_jobs().saturating_sub(1);
            let others = if others > 0 {
                format!(" (+{others} running)")
            } else {
                String::new()
            };
            Line::from(Span::styled(
                format!(
                    " {} {}/{} ({:.0}%) {current}{others}",
                    progress.operation,
                    progress.processed(),
                    progress.total,
                    progress.percentage()
                ),
                Style::new().fg(self.theme.info),
            ))
        } else if let Some(status) = state.status() {
            Line::from(Span::styled(
                format!(" {status}"),
                Style::new().fg(self.theme.success),
            ))
        } else {
            Line::from(Span::styled(
                " ? help  q quit",
                Style::new().fg(self.theme.muted),
            ))
        };

        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_caret_inside_text() {
        let theme = Theme::dark();
        let mut buffer = TextBuffer::with_text("draft.md");
        buffer.move_home();
        buffer.move_right();

        let line = caret_line("rename: ", &buffer, &theme);
        assert_eq!(spans(&line), vec!["rename: ", "d", "r", "aft.md"]);
    }

    #[test]
    fn test_caret_at_end_shows_blank_cell() {
        let theme = Theme::dark();
        let buffer = TextBuffer::with_text("rep");

        let line = caret_line("filter: ", &buffer, &theme);
        assert_eq!(spans(&line), vec!["filter: ", "rep", " ", ""]);
    }
}
