//! Status Line Component
//!
//! Displays mode indicator, messages, and list position.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::input::InputMode;

/// Message type for status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageType {
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::White,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Status line widget
pub struct StatusLine<'a> {
    mode: InputMode,
    command_buffer: Option<&'a str>,
    message: Option<(&'a str, MessageType)>,
    filter: Option<&'a str>,
    item_count: Option<(usize, usize)>,
}

impl<'a> StatusLine<'a> {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            command_buffer: None,
            message: None,
            filter: None,
            item_count: None,
        }
    }

    pub fn command_buffer(mut self, buffer: &'a str) -> Self {
        self.command_buffer = Some(buffer);
        self
    }

    pub fn message(mut self, msg: &'a str, msg_type: MessageType) -> Self {
        self.message = Some((msg, msg_type));
        self
    }

    /// Active search query, shown on the right
    pub fn filter(mut self, query: &'a str) -> Self {
        self.filter = Some(query);
        self
    }

    pub fn item_count(mut self, selected: usize, total: usize) -> Self {
        self.item_count = Some((selected, total));
        self
    }
}

fn mode_color(mode: InputMode) -> Color {
    match mode {
        InputMode::Normal => Color::Blue,
        InputMode::Command | InputMode::Confirm => Color::Red,
        InputMode::Search => Color::Magenta,
        InputMode::Rename => Color::Green,
        InputMode::Help => Color::Yellow,
    }
}

impl StatusLine<'_> {
    /// Filter and list position, right-aligned
    fn position_text(&self) -> String {
        let filter = self.filter.map(|q| format!("[/{q}]"));
        let count = self.item_count.map(|(selected, total)| format!("{}/{total}", selected + 1));
        [filter, count].into_iter().flatten().collect::<Vec<_>>().join(" ")
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(Color::DarkGray));

        let right = self.position_text();
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(right.len() as u16 + 1)]).areas(area);

        let badge = Style::default()
            .fg(Color::Black)
            .bg(mode_color(self.mode))
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled(format!(" {} ", self.mode.indicator()), badge), Span::raw(" ")];
        // Typing takes priority over transient messages
        match (self.command_buffer, self.message) {
            (Some(line), _) => spans.push(Span::styled(
                format!("{}{line}", self.mode.prompt()),
                Style::default().fg(Color::White),
            )),
            (None, Some((msg, kind))) => spans.push(Span::styled(msg, Style::default().fg(kind.color()))),
            (None, None) => {}
        }

        Line::from(spans).render(left_area, buf);
        Line::styled(right, Style::default().fg(Color::Gray)).render(right_area, buf);
    }
}

/// Key hints for the bottom row
pub struct HelpBar {
    hints: &'static [(&'static str, &'static str)],
}

impl HelpBar {
    pub fn for_mode(mode: InputMode) -> Self {
        let hints: &'static [(&str, &str)] = match mode {
            InputMode::Normal => &[
                ("j/k", "navigate"),
                ("Enter", "details"),
                ("c", "connect"),
                ("n", "new"),
                ("e", "edit"),
                ("dd", "delete"),
                ("yy", "copy pw"),
                ("/", "search"),
                ("?", "help"),
            ],
            InputMode::Rename => &[("Esc", "cancel"), ("Enter", "rename"), ("C-u", "clear")],
            InputMode::Command | InputMode::Search => &[("Esc", "cancel"), ("Enter", "run")],
            InputMode::Confirm => &[("y", "yes"), ("n", "no")],
            InputMode::Help => &[("q", "close"), ("j/k", "scroll"), ("gg/G", "top/bottom")],
        };
        Self { hints }
    }
}

impl Widget for HelpBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(Color::Gray);

        let spans = self.hints.iter().enumerate().flat_map(|(i, (key, desc))| {
            let sep = (i > 0).then(|| Span::styled(" | ", Style::default().fg(Color::DarkGray)));
            sep.into_iter()
                .chain([Span::styled(*key, key_style), Span::styled(format!(" {desc}"), desc_style)])
        });
        Line::from_iter(spans).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn test_status_line_shows_prompt_and_position() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusLine::new(InputMode::Search)
            .command_buffer("web")
            .item_count(1, 4)
            .render(area, &mut buf);

        let text = row_text(&buf, 0);
        assert!(text.starts_with(" SEARCH  /web"));
        assert!(text.trim_end().ends_with("2/4"));
    }

    #[test]
    fn test_filter_and_help_bar() {
        let area = Rect::new(0, 0, 60, 2);
        let mut buf = Buffer::empty(area);
        StatusLine::new(InputMode::Normal)
            .filter("web")
            .item_count(0, 1)
            .message("1 match(es) for 'web'", MessageType::Info)
            .render(Rect::new(0, 0, 60, 1), &mut buf);
        HelpBar::for_mode(InputMode::Confirm).render(Rect::new(0, 1, 60, 1), &mut buf);

        let status = row_text(&buf, 0);
        assert!(status.contains("1 match(es) for 'web'"));
        assert!(status.trim_end().ends_with("[/web] 1/1"));
        assert!(row_text(&buf, 1).starts_with("y yes | n no"));
    }

    #[test]
    fn test_message_hidden_while_typing() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusLine::new(InputMode::Rename)
            .command_buffer("db2")
            .message("Saved", MessageType::Success)
            .render(area, &mut buf);

        let text = row_text(&buf, 0);
        assert!(text.contains("rename: db2"));
        assert!(!text.contains("Saved"));
    }
}
