//! Credential list
//!
//! One row per saved connection: auth badge, name and `user@host:port`.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::store::{AuthType, Credential};
use crate::ui::renderer::Renderer;

/// One row of the credential list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialItem {
    pub name: String,
    pub target: String,
    pub auth_type: AuthType,
}

impl From<&Credential> for CredentialItem {
    fn from(cred: &Credential) -> Self {
        Self {
            name: cred.name.clone(),
            target: cred.address(),
            auth_type: cred.auth_type,
        }
    }
}

/// Cursor over the visible rows. The ratatui `ListState` is the single
/// source of truth for the selected index; `len` bounds it.
#[derive(Debug, Clone, Default)]
pub struct ListViewState {
    inner: ListState,
    len: usize,
}

impl ListViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn selected(&self) -> Option<usize> {
        self.inner.selected()
    }

    /// Select `index`, clamped to the last row. Ignored on an empty list.
    pub fn select(&mut self, index: Option<usize>) {
        let clamped = match (index, self.len) {
            (_, 0) | (None, _) => None,
            (Some(i), len) => Some(i.min(len - 1)),
        };
        self.inner.select(clamped);
    }

    /// New row count after the list was rebuilt. The cursor stays put where
    /// possible and lands on the first row when there was none.
    pub fn set_total(&mut self, len: usize) {
        self.len = len;
        self.select(Some(self.selected().unwrap_or(0)));
    }

    fn step(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let current = self.selected().unwrap_or(0);
        self.select(Some(current.saturating_add_signed(delta)));
    }

    pub fn move_up(&mut self) {
        self.step(-1);
    }

    pub fn move_down(&mut self) {
        self.step(1);
    }

    pub fn page_up(&mut self, rows: usize) {
        self.step(-(rows as isize));
    }

    pub fn page_down(&mut self, rows: usize) {
        self.step(rows as isize);
    }

    pub fn move_to_top(&mut self) {
        self.select(Some(0));
    }

    pub fn move_to_bottom(&mut self) {
        self.select(Some(usize::MAX));
    }
}

pub fn auth_color(auth_type: AuthType) -> Color {
    match auth_type {
        AuthType::Password => Color::Green,
        AuthType::KeyFile => Color::Cyan,
    }
}

fn auth_badge(auth_type: AuthType) -> &'static str {
    match auth_type {
        AuthType::Password => "pw ",
        AuthType::KeyFile => "key",
    }
}

pub struct CredentialList<'a> {
    items: &'a [CredentialItem],
    block: Option<Block<'a>>,
    show_target: bool,
}

impl<'a> CredentialList<'a> {
    pub fn new(items: &'a [CredentialItem]) -> Self {
        Self { items, block: None, show_target: true }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Narrow panes show names only
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    fn row(&self, item: &'a CredentialItem, name_width: usize) -> ListItem<'a> {
        let mut spans = vec![
            Span::styled(auth_badge(item.auth_type), Style::default().fg(auth_color(item.auth_type))),
            Span::raw(" "),
        ];
        if self.show_target {
            spans.push(Span::styled(format!("{:<name_width$}", item.name), Style::default().fg(Color::White)));
            spans.push(Span::styled(
                format!("  {}", item.target),
                Style::default().fg(Renderer::hex_color(0x4C566A)),
            ));
        } else {
            spans.push(Span::styled(item.name.as_str(), Style::default().fg(Color::White)));
        }
        ListItem::new(Line::from(spans))
    }
}

impl StatefulWidget for CredentialList<'_> {
    type State = ListViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let name_width = self.items.iter().map(|i| i.name.chars().count()).max().unwrap_or(0);
        let rows: Vec<ListItem> = self.items.iter().map(|item| self.row(item, name_width)).collect();

        let mut list = List::new(rows)
            .highlight_symbol("> ")
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
        if let Some(block) = self.block {
            list = list.block(block);
        }

        StatefulWidget::render(list, area, buf, &mut state.inner);
    }
}

/// Placeholder shown where a list or detail pane has nothing to show
pub struct EmptyState<'a> {
    message: &'a str,
    hint: Option<&'a str>,
}

impl<'a> EmptyState<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message, hint: None }
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = Some(hint);
        self
    }
}

impl Widget for EmptyState<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![Line::styled(self.message, Style::default().fg(Color::DarkGray))];
        if let Some(hint) = self.hint {
            lines.push(Line::styled(
                hint,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ));
        }

        let height = (lines.len() as u16).min(area.height);
        let top = area.y + (area.height - height) / 2;
        let band = Rect::new(area.x, top, area.width, height);
        Paragraph::new(lines).alignment(Alignment::Center).render(band, buf);
    }
}
