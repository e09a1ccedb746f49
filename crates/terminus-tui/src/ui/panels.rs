//! Side panels: search results and file preview.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use terminus_modal::SearchSession;

use crate::app::Preview;
use crate::theme::Theme;
use crate::ui::listing::scroll_offset;

/// Matches of the running or finished search.
pub struct SearchPanel<'a> {
    theme: &'a Theme,
    search: &'a SearchSession,
}

impl<'a> SearchPanel<'a> {
    pub fn new(theme: &'a Theme, search: &'a SearchSession) -> Self {
        Self { theme, search }
    }

    fn title(&self) -> String {
        let count = self.search.results.len();
        if self.search.running {
            format!(" {count} matches, searching... ")
        } else if self.search.truncated {
            format!(" first {count} matches ")
        } else {
            format!(" {count} matches ")
        }
    }
}

impl Widget for SearchPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        let inner = block.inner(area);
        block.render(area, buf);

        let search = self.search;
        if search.results.is_empty() {
            let hint = if search.query.is_empty() {
                "Type to search below this directory"
            } else if search.running {
                ""
            } else {
                "No matches"
            };
            Paragraph::new(Line::styled(hint, Style::new().fg(self.theme.muted)))
                .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(search.cursor, height);
        let lines: Vec<Line> = search
            .results
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, hit)| {
                let shown = match &search.root {
                    Some(root) => hit.relative_to(root).display().to_string(),
                    None => hit.path.display().to_string(),
                };
                let style = if hit.is_dir {
                    self.theme.directory
                } else {
                    self.theme.file
                };
                let line = Line::from(Span::styled(shown, style));
                if i == search.cursor {
                    line.style(self.theme.cursor)
                } else {
                    line
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

/// The head of an opened file.
pub struct PreviewPanel<'a> {
    theme: &'a Theme,
    preview: &'a Preview,
}

impl<'a> PreviewPanel<'a> {
    pub fn new(theme: &'a Theme, preview: &'a Preview) -> Self {
        Self { theme, preview }
    }
}

impl Widget for PreviewPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let name = self
            .preview
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let block = Block::default()
            .title(format!(" {name} "))
            .title_style(self.theme.title)
            .borders(Borders::ALL)
            .border_style(self.theme.border);

        let paragraph = match &self.preview.text {
            Ok(text) => Paragraph::new(text.as_str()).style(Style::new().fg(self.theme.foreground)),
            Err(e) => Paragraph::new(e.as_str()).style(Style::new().fg(self.theme.error)),
        };
        paragraph
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
