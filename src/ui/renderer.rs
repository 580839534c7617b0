//! Renderer
//!
//! Lays out the content pane, status line and key hints, then draws the
//! form, help and confirm overlays on top.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders},
    Frame,
};

use super::components::{
    ConfirmDialog, CredentialDetail, CredentialForm, CredentialFormWidget, CredentialItem,
    CredentialList, DetailView, EmptyState, HelpBar, HelpScreen, HelpState, ListViewState,
    MessageType, StatusLine,
};
use crate::input::InputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    /// List on the left, selected credential on the right
    Detail,
    /// Add/edit form over the list
    Form,
}

/// Borrowed snapshot of everything one frame needs
pub struct UiState<'a> {
    pub view: View,
    pub mode: InputMode,
    pub credentials: &'a [CredentialItem],
    pub list_state: &'a mut ListViewState,
    pub selected_detail: Option<&'a CredentialDetail>,
    pub command_buffer: Option<&'a str>,
    pub message: Option<(&'a str, MessageType)>,
    pub filter: Option<&'a str>,
    pub confirm_message: Option<&'a str>,
    pub credential_form: Option<&'a CredentialForm>,
    pub help_state: &'a HelpState,
}

pub struct Renderer;

impl Renderer {
    pub fn hex_color(rgb: u32) -> Color {
        let [_, r, g, b] = rgb.to_be_bytes();
        Color::Rgb(r, g, b)
    }

    pub fn render(frame: &mut Frame, state: &mut UiState) {
        let area = frame.area();
        let [content, status, hints] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)]).areas(area);

        match state.view {
            View::Detail => {
                let [list, detail] =
                    Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(content);
                render_list(frame, list, state, false);
                match state.selected_detail {
                    Some(d) => frame.render_widget(DetailView::new(d), detail),
                    None => frame.render_widget(EmptyState::new("Select a credential"), detail),
                }
            }
            View::List | View::Form => render_list(frame, content, state, true),
        }

        frame.render_widget(status_line(state), status);
        frame.render_widget(HelpBar::for_mode(state.mode), hints);

        if let (View::Form, Some(form)) = (state.view, state.credential_form) {
            frame.render_widget(CredentialFormWidget::new(form), area);
        }
        match (state.mode, state.confirm_message) {
            (InputMode::Help, _) => frame.render_widget(HelpScreen::new(state.help_state), area),
            (InputMode::Confirm, Some(msg)) => frame.render_widget(ConfirmDialog::new(" Confirm ", msg), area),
            _ => {}
        }
    }
}

fn status_line<'a>(state: &UiState<'a>) -> StatusLine<'a> {
    let mut status = StatusLine::new(state.mode);
    if let Some(buffer) = state.command_buffer {
        status = status.command_buffer(buffer);
    }
    if let Some((msg, kind)) = state.message {
        status = status.message(msg, kind);
    }
    if let Some(query) = state.filter {
        status = status.filter(query);
    }
    if let Some(selected) = state.list_state.selected() {
        status = status.item_count(selected, state.list_state.len());
    }
    status
}

/// The list pane; narrow panes drop the `user@host:port` column
fn render_list(frame: &mut Frame, area: Rect, state: &mut UiState, wide: bool) {
    if state.credentials.is_empty() {
        let empty = match state.filter {
            Some(_) => EmptyState::new("No matches").hint("Press Esc to clear the search"),
            None => EmptyState::new("No credentials").hint("Press 'n' to add one"),
        };
        frame.render_widget(empty, area);
        return;
    }

    let border = if wide { Color::Magenta } else { Color::DarkGray };
    let block = Block::default()
        .title(" SSH Credentials ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    let list = CredentialList::new(state.credentials).show_target(wide).block(block);
    frame.render_stateful_widget(list, area, state.list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::store::Credential;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(items: &[CredentialItem], mode: InputMode, confirm: Option<&str>, filter: Option<&str>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut list_state = ListViewState::new();
        list_state.set_total(items.len());
        let help_state = HelpState::new();
        terminal
            .draw(|frame| {
                let mut state = UiState {
                    view: View::List,
                    mode,
                    credentials: items,
                    list_state: &mut list_state,
                    selected_detail: None,
                    command_buffer: None,
                    message: None,
                    filter,
                    confirm_message: confirm,
                    credential_form: None,
                    help_state: &help_state,
                };
                Renderer::render(frame, &mut state);
            })
            .unwrap();
        screen_text(&terminal)
    }

    #[test]
    fn test_list_rows() {
        let cred = Credential::with_key("web", "10.0.0.1", 22, "deploy", "/k");
        let items = vec![CredentialItem::from(&cred)];
        let text = draw(&items, InputMode::Normal, None, None);
        assert!(text.contains("> key web  deploy@10.0.0.1:22"));
        assert!(text.contains("NORMAL"));
        assert!(text.contains("1/1"));
    }

    #[test]
    fn test_empty_list_hints() {
        assert!(draw(&[], InputMode::Normal, None, None).contains("No credentials"));
        assert!(draw(&[], InputMode::Normal, None, Some("zz")).contains("No matches"));
    }

    #[test]
    fn test_confirm_overlay() {
        let text = draw(&[], InputMode::Confirm, Some("Delete credential 'web'?"), None);
        assert!(text.contains("Delete credential 'web'?"));
    }
}
