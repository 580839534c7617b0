//! Help screen and state

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
};

use super::popup::{centered, popup_block};

const KEY_COLUMN: usize = 14;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    ("Navigation", &[
        ("j / Down", "Move down"),
        ("k / Up", "Move up"),
        ("gg", "Go to top"),
        ("G", "Go to bottom"),
        ("Ctrl-d", "Half page down"),
        ("Ctrl-u", "Half page up"),
        ("l / Enter", "View details"),
        ("h / Esc", "Back, clear search"),
    ]),
    ("Credentials", &[
        ("n / a", "New credential"),
        ("e", "Edit credential"),
        ("r", "Rename credential"),
        ("dd / x", "Delete credential"),
        ("c", "Connect"),
    ]),
    ("Clipboard", &[
        ("yy", "Copy password"),
        ("Y", "Copy ssh command"),
    ]),
    ("View", &[
        ("s", "Toggle password"),
        ("/", "Search names"),
        ("Ctrl-r", "Reload from disk"),
    ]),
    ("Commands", &[
        (":q", "Quit"),
        (":new", "New credential"),
        (":edit", "Edit credential"),
        (":rename NAME", "Rename credential"),
        (":delete", "Delete credential"),
        (":connect", "Connect"),
        (":refresh", "Reload from disk"),
        (":help", "Show this help"),
    ]),
    ("Other", &[
        ("?", "Show this help"),
        ("q", "Quit"),
    ]),
];

/// Scroll offset into the help text, in lines
#[derive(Debug, Default)]
pub struct HelpState {
    pub scroll: usize,
}

impl HelpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move by `delta` lines, staying within `0..=max`
    pub fn scroll_by(&mut self, delta: isize, max: usize) {
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn home(&mut self) {
        self.scroll = 0;
    }
}

fn help_text() -> Vec<Line<'static>> {
    let header = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (header_text, bindings) in SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::styled(*header_text, header));
        lines.extend(bindings.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {key:<KEY_COLUMN$}"), Style::default().fg(Color::Cyan)),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ])
        }));
    }
    lines
}

pub struct HelpScreen<'a> {
    state: &'a HelpState,
}

impl<'a> HelpScreen<'a> {
    pub fn new(state: &'a HelpState) -> Self {
        Self { state }
    }

    fn popup_area(area: Rect) -> Rect {
        centered(area, Constraint::Percentage(65), Constraint::Percentage(75))
    }

    /// Furthest the help text can scroll in the given terminal area
    pub fn max_scroll(area: Rect) -> usize {
        // two border rows and the footer
        let visible = Self::popup_area(area).height.saturating_sub(3) as usize;
        help_text().len().saturating_sub(visible)
    }
}

impl Widget for HelpScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = Self::popup_area(area);
        Clear.render(popup, buf);

        let block = popup_block(" Help ", Color::Magenta);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let [body, footer] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        let offset = u16::try_from(self.state.scroll).unwrap_or(u16::MAX);
        Paragraph::new(help_text()).scroll((offset, 0)).render(body, buf);
        Line::styled(" j/k scroll - gg/G top/bottom - q close ", Style::default().fg(Color::DarkGray))
            .render(footer, buf);
    }
}
