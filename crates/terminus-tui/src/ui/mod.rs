//! UI components and widgets.

mod help;
mod listing;
mod panels;
mod status;

pub use help::HelpOverlay;
pub use listing::ListingView;
pub use panels::{PreviewPanel, SearchPanel};
pub use status::{Footer, Header, InputLine};

use std::time::SystemTime;

use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Widget;
use terminus_core::Mode;
use terminus_modal::{KeyTable, ModalState, Platform};

use crate::app::Preview;
use crate::theme::Theme;

/// Everything a frame is drawn from.
pub struct RenderContext<'a> {
    pub state: &'a ModalState,
    pub table: &'a KeyTable,
    pub theme: &'a Theme,
    pub platform: Platform,
    pub preview: Option<&'a Preview>,
}

/// Layout areas for the application.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub side: Option<Rect>,
    pub input: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    /// Compute layout from terminal area.
    pub fn new(area: Rect, show_side: bool, show_input: bool) -> Self {
        let min_main_width = 40;
        let min_side_width = 30;

        let [header, content, input, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(u16::from(show_input)),
            Constraint::Length(1),
        ])
        .areas(area);

        let (main, side) = if show_side && area.width >= min_main_width + min_side_width {
            let [main, side] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(content);
            (main, Some(side))
        } else {
            (content, None)
        };

        Self {
            header,
            main,
            side,
            input: show_input.then_some(input),
            footer,
        }
    }
}

/// Main render function for the application.
pub fn render_app(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let base_style = Style::default()
        .bg(ctx.theme.background)
        .fg(ctx.theme.foreground);
    buf.set_style(area, base_style);

    let state = ctx.state;
    let searching = state.mode() == Mode::Search;
    let layout = AppLayout::new(
        area,
        searching || ctx.preview.is_some(),
        state.mode().accepts_text(),
    );

    Header::new(ctx.theme, state).render(layout.header, buf);
    ListingView::new(ctx.theme, state).render(layout.main, buf);

    if let Some(side) = layout.side {
        if searching {
            SearchPanel::new(ctx.theme, state.search()).render(side, buf);
        } else if let Some(preview) = ctx.preview {
            PreviewPanel::new(ctx.theme, preview).render(side, buf);
        }
    }

    if let Some(input) = layout.input {
        InputLine::new(ctx.theme, state).render(input, buf);
    }
    Footer::new(ctx.theme, state).render(layout.footer, buf);

    if state.help_visible() {
        HelpOverlay::new(ctx.theme, ctx.table, ctx.platform).render(area, buf);
    }
}

/// Format a byte size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format a modification time in local time.
pub fn format_time(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}
