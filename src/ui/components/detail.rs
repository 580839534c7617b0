//! Detail View Component
//!
//! Displays credential details in a panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::list::auth_color;
use crate::store::{AuthType, Credential};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Credential detail data
#[derive(Debug, Clone)]
pub struct CredentialDetail {
    pub name: String,
    pub host: String,
    pub port: u32,
    pub username: String,
    pub auth_type: AuthType,
    pub secret: Option<String>,
    pub secret_visible: bool,
    pub command: String,
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CredentialDetail {
    pub fn new(cred: &Credential, command: String, secret_visible: bool) -> Self {
        Self {
            name: cred.name.clone(),
            host: cred.host.clone(),
            port: cred.port,
            username: cred.username.clone(),
            auth_type: cred.auth_type,
            secret: cred.active_secret().map(str::to_string),
            secret_visible,
            command,
            id: cred.id.clone(),
            created_at: cred.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: cred.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Text shown for the secret row; key paths are never masked
    pub fn secret_display(&self) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let shown = match self.auth_type {
            AuthType::Password if !self.secret_visible => "*".repeat(secret.chars().count().min(20)),
            _ => secret.clone(),
        };
        Some(shown)
    }
}

/// Detail view widget
pub struct DetailView<'a> {
    detail: &'a CredentialDetail,
}

impl<'a> DetailView<'a> {
    pub fn new(detail: &'a CredentialDetail) -> Self {
        Self { detail }
    }
}

impl<'a> Widget for DetailView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.detail.name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        let value_style = Style::default().fg(Color::White);
        let bottom = inner.y + inner.height;

        let port = self.detail.port.to_string();
        let fields: [(&str, Span); 4] = [
            ("Host", Span::styled(self.detail.host.as_str(), value_style)),
            ("Port", Span::styled(port.as_str(), value_style)),
            ("Username", Span::styled(self.detail.username.as_str(), value_style)),
            (
                "Auth",
                Span::styled(
                    self.detail.auth_type.display_name(),
                    Style::default().fg(auth_color(self.detail.auth_type)),
                ),
            ),
        ];
        for (label, value) in fields {
            if y >= bottom {
                return;
            }
            render_field(buf, inner.x, &mut y, inner.width, label, &[value]);
        }

        if let Some(secret) = self.detail.secret_display() {
            let label = match self.detail.auth_type {
                AuthType::Password => "Password",
                AuthType::KeyFile => "Key Path",
            };
            if y < bottom {
                render_field(buf, inner.x, &mut y, inner.width, label, &[
                    Span::styled(secret, Style::default().fg(Color::Yellow)),
                ]);
            }
        }

        y += 1;
        if y < bottom {
            render_field(buf, inner.x, &mut y, inner.width, "Command", &[
                Span::styled(self.detail.command.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            ]);
        }

        // Timestamps at bottom
        let footer_y = inner.y + inner.height.saturating_sub(3);
        if footer_y > y {
            let dim = Style::default().fg(Color::DarkGray);
            buf.set_string(inner.x, footer_y, format!("ID:      {}", self.detail.id), dim);
            buf.set_string(inner.x, footer_y + 1, format!("Created: {}", self.detail.created_at), dim);
            buf.set_string(inner.x, footer_y + 2, format!("Updated: {}", self.detail.updated_at), dim);
        }
    }
}

fn render_field(buf: &mut Buffer, x: u16, y: &mut u16, width: u16, label: &str, value: &[Span]) {
    let label_style = Style::default().fg(Color::DarkGray);

    buf.set_string(x, *y, format!("{}:", label), label_style);

    let value_x = x + 12;
    let line = Line::from(value.to_vec());
    buf.set_line(value_x, *y, &line, width.saturating_sub(12));

    *y += 1;
}
