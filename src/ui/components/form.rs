//! Credential Form Component
//!
//! Add/edit form. Only the secret field matching the chosen auth type is
//! shown or validated.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Widget},
};

use super::popup::{centered, popup_block};
use crate::input::modes::{edit_line, LineEdit};
use crate::store::{AuthType, Credential};
use crate::ui::renderer::View;

const NAME: usize = 0;
const HOST: usize = 1;
const PORT: usize = 2;
const USERNAME: usize = 3;
const AUTH: usize = 4;
const PASSWORD: usize = 5;
const KEY_PATH: usize = 6;

const FIELDS: [(&str, FieldType); 7] = [
    ("Name", FieldType::Text),
    ("Host", FieldType::Text),
    ("Port", FieldType::Text),
    ("Username", FieldType::Text),
    ("Auth", FieldType::Select),
    ("Password", FieldType::Secret),
    ("Key Path", FieldType::Text),
];

const LABEL_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Secret,
    /// Cycled with Space, not typed into
    Select,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone)]
pub struct CredentialForm {
    pub fields: Vec<FormField>,
    pub active_field: usize,
    pub cursor: usize,
    pub auth_type: AuthType,
    /// Name of the credential being edited
    pub editing_name: Option<String>,
    pub show_password: bool,
    pub previous_view: View,
}

impl CredentialForm {
    /// Blank form for a new key credential on port 22
    pub fn new(default_key: impl Into<String>) -> Self {
        let fields = FIELDS
            .iter()
            .map(|&(label, field_type)| FormField { label, value: String::new(), field_type })
            .collect();

        let mut form = Self {
            fields,
            active_field: NAME,
            cursor: 0,
            auth_type: AuthType::KeyFile,
            editing_name: None,
            show_password: false,
            previous_view: View::List,
        };
        form.fields[PORT].value = "22".to_string();
        form.fields[KEY_PATH].value = default_key.into();
        form.set_auth_type(AuthType::KeyFile);
        form
    }

    /// Form prefilled from an existing credential
    pub fn for_edit(cred: &Credential, default_key: impl Into<String>, previous_view: View) -> Self {
        let mut form = Self::new(default_key);
        form.editing_name = Some(cred.name.clone());
        form.previous_view = previous_view;
        form.set_auth_type(cred.auth_type);

        form.fields[NAME].value = cred.name.clone();
        form.fields[HOST].value = cred.host.clone();
        form.fields[PORT].value = cred.port.to_string();
        form.fields[USERNAME].value = cred.username.clone();
        if let Some(password) = &cred.password {
            form.fields[PASSWORD].value = password.clone();
        }
        if let Some(key_path) = &cred.key_path {
            form.fields[KEY_PATH].value = key_path.clone();
        }
        form.focus(NAME);
        form
    }

    pub fn is_editing(&self) -> bool {
        self.editing_name.is_some()
    }

    pub fn active_field(&self) -> &FormField {
        &self.fields[self.active_field]
    }

    /// Indices of the fields shown for the current auth type
    pub fn visible_fields(&self) -> Vec<usize> {
        let hidden = match self.auth_type {
            AuthType::Password => KEY_PATH,
            AuthType::KeyFile => PASSWORD,
        };
        (0..self.fields.len()).filter(|&i| i != hidden).collect()
    }

    fn focus(&mut self, index: usize) {
        self.active_field = index;
        self.cursor = self.fields[index].value.chars().count();
    }

    fn step(&mut self, forward: bool) {
        let visible = self.visible_fields();
        let pos = visible.iter().position(|&i| i == self.active_field).unwrap_or(0);
        let next = if forward { pos + 1 } else { pos + visible.len() - 1 };
        self.focus(visible[next % visible.len()]);
    }

    pub fn next_field(&mut self) {
        self.step(true);
    }

    pub fn prev_field(&mut self) {
        self.step(false);
    }

    /// Edit the active field; the auth selector ignores typing
    pub fn apply(&mut self, edit: LineEdit) {
        let field = &mut self.fields[self.active_field];
        if field.field_type != FieldType::Select {
            edit_line(&mut field.value, &mut self.cursor, edit);
        }
    }

    /// Flip between password and key auth when the select field is active
    pub fn cycle_auth(&mut self) {
        if self.active_field().field_type == FieldType::Select {
            self.set_auth_type(self.auth_type.toggle());
        }
    }

    fn set_auth_type(&mut self, auth_type: AuthType) {
        self.auth_type = auth_type;
        self.fields[AUTH].value = auth_type.display_name().to_string();
    }

    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Check the shown fields are filled and build the credential. Store
    /// validation runs later, on save.
    pub fn to_credential(&self) -> Result<Credential, String> {
        if let Some(empty) = self
            .visible_fields()
            .into_iter()
            .map(|i| &self.fields[i])
            .find(|f| f.value.trim().is_empty())
        {
            return Err(format!("{} is required", empty.label));
        }

        let port_text = self.fields[PORT].value.trim();
        let port: u32 = port_text
            .parse()
            .map_err(|_| format!("Port must be a number, got '{port_text}'"))?;

        let [name, host, username] = [NAME, HOST, USERNAME].map(|i| self.fields[i].value.as_str());
        Ok(match self.auth_type {
            AuthType::Password => {
                Credential::with_password(name, host, port, username, self.fields[PASSWORD].value.as_str())
            }
            AuthType::KeyFile => Credential::with_key(name, host, port, username, self.fields[KEY_PATH].value.as_str()),
        })
    }
}

pub struct CredentialFormWidget<'a> {
    form: &'a CredentialForm,
}

impl<'a> CredentialFormWidget<'a> {
    pub fn new(form: &'a CredentialForm) -> Self {
        Self { form }
    }

    fn render_field(&self, index: usize, area: Rect, buf: &mut Buffer) {
        let field = &self.form.fields[index];
        let active = index == self.form.active_field;
        let [label_area, value_area] =
            Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(0)]).areas(area);

        let label_style = if active {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::styled(format!("{}*:", field.label), label_style).render(label_area, buf);

        let (text, fg) = match field.field_type {
            FieldType::Select => (format!("{} [Space]", field.value), Color::Yellow),
            FieldType::Secret if !self.form.show_password => ("*".repeat(field.value.chars().count()), Color::Green),
            FieldType::Secret => (field.value.clone(), Color::Green),
            FieldType::Text => (field.value.clone(), Color::White),
        };
        let bg = if active { Color::DarkGray } else { Color::Black };
        buf.set_style(value_area, Style::default().bg(bg));
        Line::styled(text, Style::default().fg(fg)).render(value_area, buf);

        if active && field.field_type != FieldType::Select {
            let x = value_area.x.saturating_add(self.form.cursor as u16);
            if x < value_area.right() {
                if let Some(cell) = buf.cell_mut((x, value_area.y)) {
                    cell.set_style(Style::default().bg(Color::White).fg(Color::Black));
                }
            }
        }
    }
}

impl Widget for CredentialFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 70u16.min(area.width.saturating_sub(4));
        let height = 18u16.min(area.height.saturating_sub(2));
        let form_area = centered(area, Constraint::Length(width), Constraint::Length(height));
        Clear.render(form_area, buf);

        let title = if self.form.is_editing() { " Edit Credential " } else { " New Credential " };
        let block = popup_block(title, Color::Magenta);
        let inner = block.inner(form_area);
        block.render(form_area, buf);
        if inner.height < 2 || inner.width == 0 {
            return;
        }

        let [fields_area, hint_area] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        // One row per field plus a spacer; scroll so the active field stays visible
        let rows = usize::from(fields_area.height / 2).max(1);
        let visible = self.form.visible_fields();
        let active_pos = visible.iter().position(|&i| i == self.form.active_field).unwrap_or(0);
        let offset = (active_pos + 1).saturating_sub(rows);

        for (row, &index) in visible.iter().skip(offset).take(rows).enumerate() {
            let y = fields_area.y + row as u16 * 2;
            self.render_field(index, Rect::new(fields_area.x, y, fields_area.width, 1), buf);
        }

        let key_style = Style::default().fg(Color::Magenta);
        let hints = [("Tab", "next"), ("S-Tab", "prev"), ("Enter", "save"), ("Esc", "cancel"), ("C-s", "show pwd")];
        Line::from_iter(
            hints
                .iter()
                .flat_map(|(key, desc)| [Span::styled(*key, key_style), Span::raw(format!(" {desc}  "))]),
        )
        .render(hint_area, buf);
    }
}
