//! Overlay helpers and the yes/no dialog.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Box of the given size in the middle of `area`, clamped to it
pub fn centered(area: Rect, width: Constraint, height: Constraint) -> Rect {
    let [row] = Layout::vertical([height]).flex(Flex::Center).areas(area);
    let [cell] = Layout::horizontal([width]).flex(Flex::Center).areas(row);
    cell
}

/// Rounded popup frame on a black background
pub fn popup_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black))
}

pub struct ConfirmDialog<'a> {
    title: &'a str,
    message: &'a str,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(title: &'a str, message: &'a str) -> Self {
        Self { title, message }
    }
}

impl Widget for ConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog = centered(area, Constraint::Length(50), Constraint::Length(7));
        Clear.render(dialog, buf);

        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let lines = vec![
            Line::styled(self.message, Style::default().fg(Color::White)),
            Line::default(),
            Line::from(vec![key("[y]", Color::Green), Span::raw(" Yes  "), key("[n]", Color::Red), Span::raw(" No")]),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(popup_block(self.title, Color::Yellow))
            .render(dialog, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(area, Constraint::Length(20), Constraint::Length(4)), Rect::new(10, 3, 20, 4));
        assert_eq!(centered(area, Constraint::Length(80), Constraint::Length(20)), area);
    }

    #[test]
    fn test_confirm_dialog_shows_message() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        ConfirmDialog::new(" Confirm ", "Delete credential 'web'?").render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Delete credential 'web'?"));
        assert!(text.contains("[y] Yes  [n] No"));
    }
}
